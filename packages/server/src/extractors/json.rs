use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use common::ServiceError;
use serde::de::DeserializeOwned;

use crate::error::AppError;
use crate::models::shared::VALIDATION_FAILED;

/// A `Json<T>` wrapper that turns body rejections into a failed
/// "Validation failed." envelope carrying the parser's explanation.
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            tracing::debug!(error = %e, "Rejected request body");
            AppError(ServiceError::validation(
                VALIDATION_FAILED,
                vec![e.body_text()],
            ))
        })?;
        Ok(AppJson(value))
    }
}
