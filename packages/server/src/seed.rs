use chrono::{TimeZone, Utc};
use sea_orm::sea_query::{
    Index, IndexCreateStatement, MysqlQueryBuilder, PostgresQueryBuilder, SqliteQueryBuilder,
};
use sea_orm::*;
use tracing::info;

use crate::entity::{customer, customer_image};

struct SeedCustomer {
    first_name: &'static str,
    last_name: &'static str,
    email: &'static str,
    phone: &'static str,
    company: &'static str,
    created_hour: u32,
}

const DEFAULT_CUSTOMERS: &[SeedCustomer] = &[
    SeedCustomer {
        first_name: "John",
        last_name: "Doe",
        email: "john.doe@example.com",
        phone: "555-0123",
        company: "Tech Corp",
        created_hour: 10,
    },
    SeedCustomer {
        first_name: "Jane",
        last_name: "Smith",
        email: "jane.smith@example.com",
        phone: "555-0124",
        company: "Design Studio",
        created_hour: 11,
    },
];

/// Insert the sample customers when the customer table is empty.
pub async fn seed_customers(db: &DatabaseConnection) -> Result<(), DbErr> {
    if customer::Entity::find().count(db).await? > 0 {
        return Ok(());
    }

    let txn = db.begin().await?;
    for seed in DEFAULT_CUSTOMERS {
        let at = Utc
            .with_ymd_and_hms(2024, 1, 1, seed.created_hour, 0, 0)
            .single()
            .ok_or_else(|| DbErr::Custom("invalid seed timestamp".into()))?;
        customer::ActiveModel {
            first_name: Set(seed.first_name.to_string()),
            last_name: Set(seed.last_name.to_string()),
            email: Set(seed.email.to_string()),
            phone: Set(seed.phone.to_string()),
            company: Set(seed.company.to_string()),
            created_at: Set(at),
            updated_at: Set(at),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }
    txn.commit().await?;

    info!("Seeded {} customers", DEFAULT_CUSTOMERS.len());
    Ok(())
}

/// Ensure the lookup indexes exist.
///
/// Schema sync only creates tables and foreign keys, so the non-unique
/// indexes used by image listing and customer ordering are created here.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    let indexes = [
        // Image listing: WHERE customer_id = ? ORDER BY uploaded_at, id
        (
            "idx_customer_image_customer_uploaded",
            Index::create()
                .if_not_exists()
                .name("idx_customer_image_customer_uploaded")
                .table(customer_image::Entity)
                .col(customer_image::Column::CustomerId)
                .col(customer_image::Column::UploadedAt)
                .to_owned(),
        ),
        // Customer listing order
        (
            "idx_customer_last_first",
            Index::create()
                .if_not_exists()
                .name("idx_customer_last_first")
                .table(customer::Entity)
                .col(customer::Column::LastName)
                .col(customer::Column::FirstName)
                .to_owned(),
        ),
        (
            "idx_customer_email",
            Index::create()
                .if_not_exists()
                .name("idx_customer_email")
                .table(customer::Entity)
                .col(customer::Column::Email)
                .to_owned(),
        ),
    ];

    let backend = db.get_database_backend();
    for (name, stmt) in &indexes {
        match db.execute_unprepared(&index_sql(backend, stmt)).await {
            Ok(_) => info!("Ensured index {} exists", name),
            Err(e) => tracing::warn!("Failed to create index {}: {}", name, e),
        }
    }

    Ok(())
}

fn index_sql(backend: DbBackend, stmt: &IndexCreateStatement) -> String {
    match backend {
        DbBackend::Sqlite => stmt.to_string(SqliteQueryBuilder),
        DbBackend::MySql => stmt.to_string(MysqlQueryBuilder),
        _ => stmt.to_string(PostgresQueryBuilder),
    }
}
