use chrono::{DateTime, Utc};
use common::{ServiceError, quota};
use serde::{Deserialize, Serialize};

use super::image::{CustomerImageResponse, ImageUploadRequest, check_batch};
use super::shared::{FieldErrors, is_email};
use crate::services::{CustomerDetails, CustomerFields, NewImage};

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_EMAIL_LEN: usize = 200;
pub const MAX_PHONE_LEN: usize = 20;
pub const MAX_COMPANY_LEN: usize = 200;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateCustomerRequest {
    #[serde(default)]
    #[schema(example = "John")]
    pub first_name: String,
    #[serde(default)]
    #[schema(example = "Doe")]
    pub last_name: String,
    #[serde(default)]
    #[schema(example = "john.doe@example.com")]
    pub email: String,
    #[serde(default)]
    #[schema(example = "555-0123")]
    pub phone: String,
    #[serde(default)]
    #[schema(example = "Tech Corp")]
    pub company: String,
    /// Images stored with the new customer. Blank payloads are skipped.
    pub images: Option<Vec<ImageUploadRequest>>,
}

/// Full replacement of a customer's fields. A non-empty `images` list
/// replaces every stored image; omitted or empty keeps them.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateCustomerRequest {
    #[serde(default)]
    #[schema(example = "John")]
    pub first_name: String,
    #[serde(default)]
    #[schema(example = "Doe")]
    pub last_name: String,
    #[serde(default)]
    #[schema(example = "john.doe@example.com")]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub company: String,
    pub images: Option<Vec<ImageUploadRequest>>,
}

fn check_fields(errors: &mut FieldErrors, fields: &CustomerFields) {
    errors.required("First name", &fields.first_name, MAX_NAME_LEN);
    errors.required("Last name", &fields.last_name, MAX_NAME_LEN);
    if fields.email.trim().is_empty() {
        errors.push("Email is required.");
    } else {
        errors.max_len("Email", &fields.email, MAX_EMAIL_LEN);
        if !is_email(&fields.email) {
            errors.push("Email is not a valid email address.");
        }
    }
    errors.max_len("Phone", &fields.phone, MAX_PHONE_LEN);
    errors.max_len("Company", &fields.company, MAX_COMPANY_LEN);
}

/// Check the shared customer fields and any embedded images, then convert
/// into service input.
fn validated_parts(
    fields: CustomerFields,
    images: Option<Vec<ImageUploadRequest>>,
) -> Result<(CustomerFields, Option<Vec<NewImage>>), ServiceError> {
    let mut errors = FieldErrors::new();
    check_fields(&mut errors, &fields);
    if let Some(images) = &images {
        check_batch(images, &mut errors, false);
    }
    errors.into_result()?;

    Ok((
        fields,
        images.map(|list| list.into_iter().map(NewImage::from).collect()),
    ))
}

impl CreateCustomerRequest {
    /// Validate and convert into service input.
    pub fn into_parts(self) -> Result<(CustomerFields, Option<Vec<NewImage>>), ServiceError> {
        let fields = CustomerFields {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            company: self.company,
        };
        validated_parts(fields, self.images)
    }
}

impl UpdateCustomerRequest {
    pub fn into_parts(self) -> Result<(CustomerFields, Option<Vec<NewImage>>), ServiceError> {
        let fields = CustomerFields {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            company: self.company,
        };
        validated_parts(fields, self.images)
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CustomerResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "John")]
    pub first_name: String,
    #[schema(example = "Doe")]
    pub last_name: String,
    #[schema(example = "John Doe")]
    pub full_name: String,
    #[schema(example = "john.doe@example.com")]
    pub email: String,
    #[schema(example = "555-0123")]
    pub phone: String,
    #[schema(example = "Tech Corp")]
    pub company: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[schema(example = 3)]
    pub image_count: usize,
    /// Whether the customer is still below the image ceiling.
    pub can_add_more_images: bool,
    /// Oldest upload first.
    pub images: Vec<CustomerImageResponse>,
}

impl From<CustomerDetails> for CustomerResponse {
    fn from(details: CustomerDetails) -> Self {
        let CustomerDetails {
            customer,
            mut images,
        } = details;
        images.sort_by_key(|i| (i.uploaded_at, i.id));
        let image_count = images.len();

        Self {
            id: customer.id,
            full_name: format!("{} {}", customer.first_name, customer.last_name),
            first_name: customer.first_name,
            last_name: customer.last_name,
            email: customer.email,
            phone: customer.phone,
            company: customer.company,
            created_at: customer.created_at,
            updated_at: customer.updated_at,
            image_count,
            can_add_more_images: quota::can_add_more_images(image_count as u64),
            images: images.into_iter().map(Into::into).collect(),
        }
    }
}
