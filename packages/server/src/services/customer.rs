use std::collections::HashMap;

use chrono::{DateTime, Utc};
use common::validation::decode_payload;
use common::{Clock, ServiceError, quota};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionSession, TransactionTrait,
};
use tracing::info;

use super::{CUSTOMER_NOT_FOUND, CustomerDetails, CustomerFields, NewImage, at_boundary, images_of};
use crate::entity::{customer, customer_image};

/// Create, read, update and delete customers together with the images they own.
pub struct CustomerService<'a, C> {
    conn: &'a C,
    clock: &'a dyn Clock,
}

impl<'a, C> CustomerService<'a, C>
where
    C: ConnectionTrait + TransactionTrait,
{
    pub fn new(conn: &'a C, clock: &'a dyn Clock) -> Self {
        Self { conn, clock }
    }

    /// Every customer with their images, sorted by last then first name.
    pub async fn list_customers(&self) -> Result<Vec<CustomerDetails>, ServiceError> {
        self.try_list_customers()
            .await
            .map_err(at_boundary("retrieving customers", 0))
    }

    async fn try_list_customers(&self) -> Result<Vec<CustomerDetails>, ServiceError> {
        let customers = customer::Entity::find()
            .order_by_asc(customer::Column::LastName)
            .order_by_asc(customer::Column::FirstName)
            .order_by_asc(customer::Column::Id)
            .all(self.conn)
            .await?;

        if customers.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = customers.iter().map(|c| c.id).collect();
        let images = customer_image::Entity::find()
            .filter(customer_image::Column::CustomerId.is_in(ids))
            .order_by_asc(customer_image::Column::UploadedAt)
            .order_by_asc(customer_image::Column::Id)
            .all(self.conn)
            .await?;

        let mut by_owner: HashMap<i32, Vec<customer_image::Model>> = HashMap::new();
        for image in images {
            by_owner.entry(image.customer_id).or_default().push(image);
        }

        Ok(customers
            .into_iter()
            .map(|customer| CustomerDetails {
                images: by_owner.remove(&customer.id).unwrap_or_default(),
                customer,
            })
            .collect())
    }

    pub async fn get_customer(&self, id: i32) -> Result<CustomerDetails, ServiceError> {
        self.try_get_customer(id)
            .await
            .map_err(at_boundary("retrieving the customer", id))
    }

    async fn try_get_customer(&self, id: i32) -> Result<CustomerDetails, ServiceError> {
        let customer = customer::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or_else(|| ServiceError::not_found(CUSTOMER_NOT_FOUND))?;
        let images = images_of(self.conn, id).await?;

        Ok(CustomerDetails { customer, images })
    }

    /// Create a customer, optionally with embedded images.
    ///
    /// Embedded images only get a base64 decode check: blank payloads are
    /// skipped and the first undecodable one aborts the whole creation.
    pub async fn create_customer(
        &self,
        fields: CustomerFields,
        images: Option<Vec<NewImage>>,
    ) -> Result<CustomerDetails, ServiceError> {
        self.try_create_customer(fields, images)
            .await
            .map_err(at_boundary("creating the customer", 0))
    }

    async fn try_create_customer(
        &self,
        fields: CustomerFields,
        images: Option<Vec<NewImage>>,
    ) -> Result<CustomerDetails, ServiceError> {
        let mut decoded = Vec::new();
        for image in images.into_iter().flatten() {
            if image.image_data.trim().is_empty() {
                continue;
            }
            let bytes = decode_payload(&image.image_data).map_err(|_| {
                ServiceError::malformed(format!(
                    "Invalid Base64 string in image: {}",
                    image.file_name
                ))
            })?;
            decoded.push((image, bytes.len() as i64));
        }
        quota::check_capacity(0, decoded.len() as u64)?;

        let now = self.clock.now();
        let txn = self.conn.begin().await?;

        let customer = customer::ActiveModel {
            first_name: Set(fields.first_name),
            last_name: Set(fields.last_name),
            email: Set(fields.email),
            phone: Set(fields.phone),
            company: Set(fields.company),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut saved = Vec::with_capacity(decoded.len());
        for (image, size) in decoded {
            saved.push(insert_image(&txn, customer.id, image, size, now).await?);
        }

        txn.commit().await?;
        info!(customer_id = customer.id, images = saved.len(), "Created customer");

        Ok(CustomerDetails {
            customer,
            images: saved,
        })
    }

    /// Overwrite a customer's scalar fields.
    ///
    /// A non-empty `images` list replaces every existing image of the
    /// customer; `None` or an empty list leaves them untouched.
    pub async fn update_customer(
        &self,
        id: i32,
        fields: CustomerFields,
        images: Option<Vec<NewImage>>,
    ) -> Result<CustomerDetails, ServiceError> {
        self.try_update_customer(id, fields, images)
            .await
            .map_err(at_boundary("updating the customer", id))
    }

    async fn try_update_customer(
        &self,
        id: i32,
        fields: CustomerFields,
        images: Option<Vec<NewImage>>,
    ) -> Result<CustomerDetails, ServiceError> {
        let txn = self.conn.begin().await?;

        let existing = customer::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found(CUSTOMER_NOT_FOUND))?;

        // Replacement payloads are decoded without a blank-skip and the raw
        // decoder error is reported as-is.
        let replacement = match images {
            Some(list) if !list.is_empty() => {
                let mut decoded = Vec::with_capacity(list.len());
                for image in list {
                    let bytes = decode_payload(&image.image_data)
                        .map_err(|e| ServiceError::malformed(e.to_string()))?;
                    decoded.push((image, bytes.len() as i64));
                }
                quota::check_capacity(0, decoded.len() as u64)?;
                Some(decoded)
            }
            _ => None,
        };

        let now = self.clock.now();
        let mut active: customer::ActiveModel = existing.into();
        active.first_name = Set(fields.first_name);
        active.last_name = Set(fields.last_name);
        active.email = Set(fields.email);
        active.phone = Set(fields.phone);
        active.company = Set(fields.company);
        active.updated_at = Set(now);
        let customer = active.update(&txn).await?;

        if let Some(decoded) = replacement {
            let removed = customer_image::Entity::delete_many()
                .filter(customer_image::Column::CustomerId.eq(id))
                .exec(&txn)
                .await?
                .rows_affected;
            for (image, size) in decoded {
                insert_image(&txn, id, image, size, now).await?;
            }
            info!(customer_id = id, removed, "Replaced customer images");
        }

        let images = images_of(&txn, id).await?;
        txn.commit().await?;
        info!(customer_id = id, "Updated customer");

        Ok(CustomerDetails { customer, images })
    }

    /// Delete a customer and every image it owns.
    pub async fn delete_customer(&self, id: i32) -> Result<(), ServiceError> {
        self.try_delete_customer(id)
            .await
            .map_err(at_boundary("deleting the customer", id))
    }

    async fn try_delete_customer(&self, id: i32) -> Result<(), ServiceError> {
        let txn = self.conn.begin().await?;

        customer::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found(CUSTOMER_NOT_FOUND))?;

        // The foreign key cascades as well; deleting explicitly keeps the
        // behaviour identical on backends with foreign keys disabled.
        let removed = customer_image::Entity::delete_many()
            .filter(customer_image::Column::CustomerId.eq(id))
            .exec(&txn)
            .await?
            .rows_affected;
        customer::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        info!(customer_id = id, images_removed = removed, "Deleted customer");

        Ok(())
    }
}

async fn insert_image<C: ConnectionTrait>(
    conn: &C,
    customer_id: i32,
    image: NewImage,
    file_size_bytes: i64,
    uploaded_at: DateTime<Utc>,
) -> Result<customer_image::Model, ServiceError> {
    let model = customer_image::ActiveModel {
        customer_id: Set(customer_id),
        image_data: Set(image.image_data),
        file_name: Set(image.file_name),
        content_type: Set(image.content_type),
        file_size_bytes: Set(file_size_bytes),
        uploaded_at: Set(uploaded_at),
        description: Set(image.description.unwrap_or_default()),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    Ok(model)
}
