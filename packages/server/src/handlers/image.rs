use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::Response;
use common::validation::decode_payload;
use common::{ApiResponse, Envelope, ServiceError};
use tracing::{instrument, warn};

use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::extractors::path::AppPath;
use crate::models::image::{CustomerImageResponse, ImageUploadRequest, check_batch};
use crate::models::shared::FieldErrors;
use crate::services::NewImage;
use crate::state::AppState;

pub const IMAGE_NOT_FOR_CUSTOMER: &str = "Image not found for this customer.";
pub const INVALID_IMAGE_DATA: &str = "Invalid image data";

#[utoipa::path(
    post,
    path = "/customers/{customer_id}/images",
    tag = "Customer Images",
    operation_id = "uploadImages",
    summary = "Upload a batch of images",
    description = "Validates every image (content type, base64 payload, 100 B to 5 MiB) and \
        stores the batch only if all pass and the customer stays within 10 images.",
    params(("customer_id" = i32, Path, description = "Customer ID")),
    request_body = Vec<ImageUploadRequest>,
    responses(
        (status = 200, description = "Images stored", body = Envelope<Vec<CustomerImageResponse>>),
        (status = 400, description = "Customer not found, validation failure or quota exceeded", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(customer_id))]
pub async fn upload_images(
    State(state): State<AppState>,
    AppPath(customer_id): AppPath<i32>,
    AppJson(payload): AppJson<Vec<ImageUploadRequest>>,
) -> Result<Json<ApiResponse<Vec<CustomerImageResponse>>>, AppError> {
    let mut errors = FieldErrors::new();
    check_batch(&payload, &mut errors, true);
    errors.into_result()?;

    let images = payload.into_iter().map(NewImage::from).collect();
    let saved = state
        .images()
        .upload_images(customer_id, images)
        .await
        .map_err(upload_error)?;

    let message = format!("Successfully uploaded {} image(s).", saved.len());
    Ok(Json(ApiResponse::with_message(
        saved.into_iter().map(Into::into).collect(),
        message,
    )))
}

/// Every failed upload is a bad request, including an unknown customer
/// and a storage failure.
fn upload_error(err: ServiceError) -> AppError {
    match err {
        ServiceError::NotFound(message) => {
            AppError(ServiceError::validation(message, Vec::new()))
        }
        ServiceError::Unexpected { message, detail } => {
            AppError(ServiceError::validation(message, vec![detail]))
        }
        other => AppError(other),
    }
}

#[utoipa::path(
    get,
    path = "/customers/{customer_id}/images",
    tag = "Customer Images",
    operation_id = "listImages",
    summary = "List a customer's images",
    description = "Oldest upload first.",
    params(("customer_id" = i32, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Images of the customer", body = Envelope<Vec<CustomerImageResponse>>),
        (status = 404, description = "Customer not found", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(customer_id))]
pub async fn list_images(
    State(state): State<AppState>,
    AppPath(customer_id): AppPath<i32>,
) -> Result<Json<ApiResponse<Vec<CustomerImageResponse>>>, AppError> {
    let images = state.images().list_images(customer_id).await?;

    Ok(Json(ApiResponse::success(
        images.into_iter().map(Into::into).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/customers/{customer_id}/images/{image_id}",
    tag = "Customer Images",
    operation_id = "getImage",
    summary = "Get one of a customer's images",
    params(
        ("customer_id" = i32, Path, description = "Customer ID"),
        ("image_id" = i32, Path, description = "Image ID"),
    ),
    responses(
        (status = 200, description = "The image", body = Envelope<CustomerImageResponse>),
        (status = 404, description = "Image missing or owned by another customer", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(customer_id, image_id))]
pub async fn get_image(
    State(state): State<AppState>,
    AppPath((customer_id, image_id)): AppPath<(i32, i32)>,
) -> Result<Json<ApiResponse<CustomerImageResponse>>, AppError> {
    let image = state.images().get_image(image_id).await?;
    if image.customer_id != customer_id {
        return Err(AppError(ServiceError::not_found(IMAGE_NOT_FOR_CUSTOMER)));
    }

    Ok(Json(ApiResponse::success(image.into())))
}

#[utoipa::path(
    delete,
    path = "/customers/{customer_id}/images/{image_id}",
    tag = "Customer Images",
    operation_id = "deleteImage",
    summary = "Delete one of a customer's images",
    params(
        ("customer_id" = i32, Path, description = "Customer ID"),
        ("image_id" = i32, Path, description = "Image ID"),
    ),
    responses(
        (status = 200, description = "Image deleted", body = Envelope<bool>),
        (status = 404, description = "Image missing or owned by another customer", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(customer_id, image_id))]
pub async fn delete_image(
    State(state): State<AppState>,
    AppPath((customer_id, image_id)): AppPath<(i32, i32)>,
) -> Result<Json<ApiResponse<bool>>, AppError> {
    state.images().delete_image(image_id, customer_id).await?;

    Ok(Json(ApiResponse::with_message(
        true,
        "Image deleted successfully.",
    )))
}

#[utoipa::path(
    get,
    path = "/images/{image_id}/data",
    tag = "Images",
    operation_id = "downloadImage",
    summary = "Download the raw image bytes",
    description = "Decodes the stored payload and returns it with the stored content type \
        as an attachment.",
    params(("image_id" = i32, Path, description = "Image ID")),
    responses(
        (status = 200, description = "Image content"),
        (status = 400, description = "Stored payload is not valid base64", body = ErrorBody),
        (status = 404, description = "Image not found", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(image_id))]
pub async fn download_image(
    State(state): State<AppState>,
    AppPath(image_id): AppPath<i32>,
) -> Result<Response, AppError> {
    let image = state.images().get_image(image_id).await?;

    let bytes = decode_payload(&image.image_data).map_err(|e| {
        warn!(image_id, error = %e, "Stored image payload is not decodable");
        AppError(ServiceError::validation(INVALID_IMAGE_DATA, Vec::new()))
    })?;

    let content_type = HeaderValue::from_str(&image.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        attachment_name(&image.file_name)
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_DISPOSITION, disposition)
        .header(header::CONTENT_LENGTH, bytes.len())
        .body(Body::from(bytes))
        .map_err(|e| AppError(ServiceError::unexpected(e.to_string())))
}

/// File name safe to place inside a quoted header parameter.
fn attachment_name(file_name: &str) -> String {
    file_name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_control() || !c.is_ascii() => '_',
            c => c,
        })
        .collect()
}
