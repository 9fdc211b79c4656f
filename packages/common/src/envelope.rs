use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

const DEFAULT_SUCCESS_MESSAGE: &str = "Success";

/// Uniform result of every customer/image operation.
///
/// On the wire this is always the flat `{success, message, data, errors}`
/// object described by [`Envelope`]; in code the two outcomes are distinct
/// variants so a success can never carry errors and a failure never carries data.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse<T> {
    Success { message: String, data: T },
    Failure { message: String, errors: Vec<String> },
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self::with_message(data, DEFAULT_SUCCESS_MESSAGE)
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self::Success {
            message: message.into(),
            data,
        }
    }

    pub fn failure(message: impl Into<String>, errors: Vec<String>) -> Self {
        Self::Failure {
            message: message.into(),
            errors,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Success { message, .. } | Self::Failure { message, .. } => message,
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success { data, .. } => Some(data),
            Self::Failure { .. } => None,
        }
    }

    pub fn errors(&self) -> &[String] {
        match self {
            Self::Success { .. } => &[],
            Self::Failure { errors, .. } => errors,
        }
    }
}

impl<T: Serialize> Serialize for ApiResponse<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ApiResponse", 4)?;
        state.serialize_field("success", &self.is_success())?;
        state.serialize_field("message", self.message())?;
        state.serialize_field("data", &self.data())?;
        state.serialize_field("errors", self.errors())?;
        state.end()
    }
}

/// Wire shape of an [`ApiResponse`].
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Envelope<T> {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Human-readable summary.
    #[schema(example = "Success")]
    pub message: String,
    /// Payload, present only on success.
    pub data: Option<T>,
    /// Per-item failure reasons, empty on success.
    #[serde(default)]
    pub errors: Vec<String>,
}
