use common::validation::validate_image;
use common::{Clock, ServiceError, quota};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    Set, TransactionSession, TransactionTrait,
};
use tracing::{info, warn};

use super::{CUSTOMER_NOT_FOUND, NewImage, at_boundary, images_of};
use crate::entity::{customer, customer_image};

pub const IMAGE_NOT_FOUND: &str = "Image not found.";
pub const IMAGE_NOT_OWNED: &str = "Image not found or doesn't belong to this customer.";

/// Quota-checked, all-or-nothing mutations of a customer's images.
pub struct ImageService<'a, C> {
    conn: &'a C,
    clock: &'a dyn Clock,
}

impl<'a, C> ImageService<'a, C>
where
    C: ConnectionTrait + TransactionTrait,
{
    pub fn new(conn: &'a C, clock: &'a dyn Clock) -> Self {
        Self { conn, clock }
    }

    /// Validate and store a batch of images for a customer.
    ///
    /// The batch lands whole or not at all: a missing customer, a batch that
    /// would exceed the ceiling, or any single image failing validation leaves
    /// the store untouched.
    pub async fn upload_images(
        &self,
        customer_id: i32,
        images: Vec<NewImage>,
    ) -> Result<Vec<customer_image::Model>, ServiceError> {
        self.try_upload_images(customer_id, images)
            .await
            .map_err(at_boundary("uploading images", customer_id))
    }

    async fn try_upload_images(
        &self,
        customer_id: i32,
        images: Vec<NewImage>,
    ) -> Result<Vec<customer_image::Model>, ServiceError> {
        let txn = self.conn.begin().await?;

        let customer = customer::Entity::find_by_id(customer_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found(CUSTOMER_NOT_FOUND))?;

        // Writing the customer row first makes concurrent batches for the same
        // customer queue behind this transaction before they count images.
        let now = self.clock.now();
        let mut active: customer::ActiveModel = customer.into();
        active.updated_at = Set(now);
        active.update(&txn).await?;

        let current = customer_image::Entity::find()
            .filter(customer_image::Column::CustomerId.eq(customer_id))
            .count(&txn)
            .await?;
        if let Err(exceeded) = quota::check_capacity(current, images.len() as u64) {
            warn!(customer_id, current, requested = images.len(), "Upload over quota");
            return Err(exceeded.into());
        }

        let mut sizes = Vec::with_capacity(images.len());
        let mut errors = Vec::new();
        for image in &images {
            let candidate = image.candidate();
            match validate_image(&candidate) {
                Ok(validated) => sizes.push(validated.file_size_bytes),
                Err(reason) => errors.push(format!("File '{}': {reason}", candidate.file_name)),
            }
        }
        if !errors.is_empty() {
            warn!(customer_id, rejected = errors.len(), "Image batch failed validation");
            return Err(ServiceError::validation("Image validation failed.", errors));
        }

        let mut saved = Vec::with_capacity(images.len());
        for (image, size) in images.into_iter().zip(sizes) {
            let model = customer_image::ActiveModel {
                customer_id: Set(customer_id),
                image_data: Set(image.image_data),
                file_name: Set(image.file_name),
                content_type: Set(image.content_type),
                file_size_bytes: Set(size),
                uploaded_at: Set(now),
                description: Set(image.description.unwrap_or_default()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            saved.push(model);
        }

        txn.commit().await?;
        info!(customer_id, count = saved.len(), "Uploaded images");

        Ok(saved)
    }

    /// Every image of a customer, oldest upload first.
    pub async fn list_images(
        &self,
        customer_id: i32,
    ) -> Result<Vec<customer_image::Model>, ServiceError> {
        self.try_list_images(customer_id)
            .await
            .map_err(at_boundary("retrieving images", customer_id))
    }

    async fn try_list_images(
        &self,
        customer_id: i32,
    ) -> Result<Vec<customer_image::Model>, ServiceError> {
        customer::Entity::find_by_id(customer_id)
            .one(self.conn)
            .await?
            .ok_or_else(|| ServiceError::not_found(CUSTOMER_NOT_FOUND))?;

        Ok(images_of(self.conn, customer_id).await?)
    }

    /// Remove one image, provided it belongs to `customer_id`.
    pub async fn delete_image(&self, image_id: i32, customer_id: i32) -> Result<(), ServiceError> {
        self.try_delete_image(image_id, customer_id)
            .await
            .map_err(at_boundary("deleting the image", image_id))
    }

    async fn try_delete_image(&self, image_id: i32, customer_id: i32) -> Result<(), ServiceError> {
        let txn = self.conn.begin().await?;

        let image = customer_image::Entity::find()
            .filter(customer_image::Column::Id.eq(image_id))
            .filter(customer_image::Column::CustomerId.eq(customer_id))
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found(IMAGE_NOT_OWNED))?;

        customer_image::Entity::delete_by_id(image.id)
            .exec(&txn)
            .await?;

        if let Some(customer) = customer::Entity::find_by_id(customer_id).one(&txn).await? {
            let mut active: customer::ActiveModel = customer.into();
            active.updated_at = Set(self.clock.now());
            active.update(&txn).await?;
        }

        txn.commit().await?;
        info!(customer_id, image_id, "Deleted image");

        Ok(())
    }

    /// Fetch one image by id. Ownership is not checked here.
    pub async fn get_image(&self, image_id: i32) -> Result<customer_image::Model, ServiceError> {
        self.try_get_image(image_id)
            .await
            .map_err(at_boundary("retrieving the image", image_id))
    }

    async fn try_get_image(&self, image_id: i32) -> Result<customer_image::Model, ServiceError> {
        customer_image::Entity::find_by_id(image_id)
            .one(self.conn)
            .await?
            .ok_or_else(|| ServiceError::not_found(IMAGE_NOT_FOUND))
    }
}
