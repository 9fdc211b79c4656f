use axum::{
    extract::{FromRequestParts, Path, rejection::PathRejection},
    http::request::Parts,
};
use common::ServiceError;
use serde::de::DeserializeOwned;

use crate::error::AppError;
use crate::models::shared::VALIDATION_FAILED;

/// A `Path<T>` wrapper whose rejections keep the envelope shape.
pub struct AppPath<T>(pub T);

impl<S, T> FromRequestParts<S> for AppPath<T>
where
    Path<T>: FromRequestParts<S, Rejection = PathRejection>,
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected path parameters");
                AppError(ServiceError::validation(
                    VALIDATION_FAILED,
                    vec![e.body_text()],
                ))
            })?;
        Ok(AppPath(value))
    }
}
