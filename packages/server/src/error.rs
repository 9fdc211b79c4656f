use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::ServiceError;
use serde::Serialize;

/// OpenAPI shape of the failed envelope returned by every endpoint on error.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    #[schema(example = false)]
    pub success: bool,
    /// Summary of what went wrong.
    #[schema(example = "Customer not found.")]
    pub message: String,
    /// Always null on failure.
    #[schema(value_type = Option<Object>)]
    pub data: Option<()>,
    /// One entry per rejected field or file.
    #[schema(example = json!(["File 'logo.png': Invalid base64 format."]))]
    pub errors: Vec<String>,
}

/// Error returned by every handler, rendered as a failed envelope.
#[derive(Debug)]
pub struct AppError(pub ServiceError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::ValidationFailed { .. }
            | ServiceError::QuotaExceeded(_)
            | ServiceError::MalformedInput { .. } => StatusCode::BAD_REQUEST,
            ServiceError::Unexpected { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(self.0.into_response::<()>())).into_response()
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        AppError(err)
    }
}
