use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::FieldErrors;
use crate::entity::customer_image;
use crate::services::NewImage;

pub const MAX_FILE_NAME_LEN: usize = 100;
pub const MAX_CONTENT_TYPE_LEN: usize = 50;
pub const MAX_DESCRIPTION_LEN: usize = 200;

/// An image submitted inside an upload batch or a customer create/update.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct ImageUploadRequest {
    /// Base64 payload, optionally in `data:<mime>;base64,<data>` form.
    #[serde(default)]
    #[schema(example = "data:image/png;base64,iVBORw0KGgo...")]
    pub image_data: String,
    #[serde(default)]
    #[schema(example = "logo.png")]
    pub file_name: String,
    #[serde(default)]
    #[schema(example = "image/png")]
    pub content_type: String,
    #[schema(example = "Company logo")]
    pub description: Option<String>,
}

impl ImageUploadRequest {
    /// Field checks ahead of the image rules; `require_data` is set on the
    /// upload path only, create skips blank payloads instead.
    pub fn check(&self, errors: &mut FieldErrors, require_data: bool) {
        if require_data && self.image_data.trim().is_empty() {
            errors.push("Image data is required.");
        }
        errors.required("File name", &self.file_name, MAX_FILE_NAME_LEN);
        errors.required("Content type", &self.content_type, MAX_CONTENT_TYPE_LEN);
        if let Some(description) = &self.description {
            errors.max_len("Description", description, MAX_DESCRIPTION_LEN);
        }
    }
}

impl From<ImageUploadRequest> for NewImage {
    fn from(req: ImageUploadRequest) -> Self {
        Self {
            image_data: req.image_data,
            file_name: req.file_name,
            content_type: req.content_type,
            description: req.description,
        }
    }
}

/// Run field checks over a batch, prefixing each problem with its position.
pub fn check_batch(images: &[ImageUploadRequest], errors: &mut FieldErrors, require_data: bool) {
    for (i, image) in images.iter().enumerate() {
        errors.scoped(&format!("Image {}", i + 1), |e| image.check(e, require_data));
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CustomerImageResponse {
    #[schema(example = 7)]
    pub id: i32,
    #[schema(example = 1)]
    pub customer_id: i32,
    pub image_data: String,
    #[schema(example = "logo.png")]
    pub file_name: String,
    #[schema(example = "image/png")]
    pub content_type: String,
    /// Decoded payload size.
    #[schema(example = 48213)]
    pub file_size_bytes: i64,
    pub uploaded_at: DateTime<Utc>,
    pub description: String,
}

impl From<customer_image::Model> for CustomerImageResponse {
    fn from(model: customer_image::Model) -> Self {
        Self {
            id: model.id,
            customer_id: model.customer_id,
            image_data: model.image_data,
            file_name: model.file_name,
            content_type: model.content_type,
            file_size_bytes: model.file_size_bytes,
            uploaded_at: model.uploaded_at,
            description: model.description,
        }
    }
}
