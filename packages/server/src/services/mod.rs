pub mod customer;
pub mod image;

use common::ServiceError;
use common::validation::ImageCandidate;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};

use crate::entity::{customer as customer_entity, customer_image};

pub use customer::CustomerService;
pub use image::ImageService;

pub const CUSTOMER_NOT_FOUND: &str = "Customer not found.";

/// An image submitted for persistence, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewImage {
    pub image_data: String,
    pub file_name: String,
    pub content_type: String,
    pub description: Option<String>,
}

impl NewImage {
    pub fn candidate(&self) -> ImageCandidate<'_> {
        ImageCandidate {
            content_type: &self.content_type,
            image_data: &self.image_data,
            file_name: &self.file_name,
        }
    }
}

/// Scalar customer attributes written by create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerFields {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
}

/// A customer together with every image it owns, oldest upload first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerDetails {
    pub customer: customer_entity::Model,
    pub images: Vec<customer_image::Model>,
}

/// All images of one customer ordered by upload time, ties by id.
pub(crate) async fn images_of<C: ConnectionTrait>(
    conn: &C,
    customer_id: i32,
) -> Result<Vec<customer_image::Model>, DbErr> {
    customer_image::Entity::find()
        .filter(customer_image::Column::CustomerId.eq(customer_id))
        .order_by_asc(customer_image::Column::UploadedAt)
        .order_by_asc(customer_image::Column::Id)
        .all(conn)
        .await
}

/// Maps an error leaving a service operation: storage failures are logged
/// with the operation and id, then summarised for the client.
pub(crate) fn at_boundary(
    operation: &'static str,
    id: i32,
) -> impl FnOnce(ServiceError) -> ServiceError {
    move |err| {
        match &err {
            ServiceError::Unexpected { detail, .. } => {
                tracing::error!(operation, id, %detail, "Storage failure");
            }
            ServiceError::MalformedInput { detail, .. } => {
                tracing::warn!(operation, id, %detail, "Malformed image payload");
            }
            _ => {}
        }
        err.during(operation)
    }
}
