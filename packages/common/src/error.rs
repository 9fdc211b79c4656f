use crate::envelope::ApiResponse;
use crate::quota::QuotaExceeded;

const UNEXPECTED_MESSAGE: &str = "An unexpected error occurred.";

/// Failure kinds surfaced by the customer and image services.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// Customer or image absent, or an image owned by someone else.
    #[error("{0}")]
    NotFound(String),
    /// One or more inputs rejected; `errors` carries one reason per item.
    #[error("{message}")]
    ValidationFailed { message: String, errors: Vec<String> },
    /// The write would exceed the per-customer image ceiling.
    #[error("{0}")]
    QuotaExceeded(String),
    /// A payload could not be decoded on the create/update paths.
    #[error("{message}: {detail}")]
    MalformedInput { message: String, detail: String },
    /// Storage failure.
    #[error("{message}: {detail}")]
    Unexpected { message: String, detail: String },
}

impl ServiceError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn validation(message: impl Into<String>, errors: Vec<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
            errors,
        }
    }

    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::MalformedInput {
            message: UNEXPECTED_MESSAGE.into(),
            detail: detail.into(),
        }
    }

    pub fn unexpected(detail: impl Into<String>) -> Self {
        Self::Unexpected {
            message: UNEXPECTED_MESSAGE.into(),
            detail: detail.into(),
        }
    }

    /// Attach the operation to a malformed-input or storage failure, producing
    /// "An error occurred while {operation}." as the summary.
    pub fn during(self, operation: &str) -> Self {
        let message = format!("An error occurred while {operation}.");
        match self {
            Self::MalformedInput { detail, .. } => Self::MalformedInput { message, detail },
            Self::Unexpected { detail, .. } => Self::Unexpected { message, detail },
            other => other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Summary line shown to clients.
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound(message) | Self::QuotaExceeded(message) => message,
            Self::ValidationFailed { message, .. }
            | Self::MalformedInput { message, .. }
            | Self::Unexpected { message, .. } => message,
        }
    }

    /// Detail lines shown to clients.
    pub fn errors(&self) -> Vec<String> {
        match self {
            Self::NotFound(_) | Self::QuotaExceeded(_) => Vec::new(),
            Self::ValidationFailed { errors, .. } => errors.clone(),
            Self::MalformedInput { detail, .. } | Self::Unexpected { detail, .. } => {
                vec![detail.clone()]
            }
        }
    }

    pub fn into_response<T>(self) -> ApiResponse<T> {
        ApiResponse::failure(self.message(), self.errors())
    }
}

impl From<QuotaExceeded> for ServiceError {
    fn from(err: QuotaExceeded) -> Self {
        Self::QuotaExceeded(err.to_string())
    }
}

#[cfg(feature = "sea-orm")]
impl From<sea_orm::DbErr> for ServiceError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::unexpected(err.to_string())
    }
}
