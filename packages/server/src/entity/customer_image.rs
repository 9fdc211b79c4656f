use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customer_image")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub customer_id: i32,
    #[sea_orm(belongs_to, from = "customer_id", to = "id", on_delete = "Cascade")]
    pub customer: HasOne<super::customer::Entity>,

    /// Base64 payload exactly as submitted, data-URI prefix included.
    #[sea_orm(column_type = "Text")]
    pub image_data: String,

    #[sea_orm(column_type = "String(StringLen::N(100))")]
    pub file_name: String,
    #[sea_orm(column_type = "String(StringLen::N(50))")]
    pub content_type: String,

    /// Decoded size. Always computed server-side.
    pub file_size_bytes: i64,

    pub uploaded_at: DateTimeUtc,

    #[sea_orm(column_type = "String(StringLen::N(200))")]
    pub description: String,
}

impl ActiveModelBehavior for ActiveModel {}
