//! Database operations for the `customers` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `customers` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CustomerRow {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CustomerRow {
    #[must_use]
    pub fn into_customer(self) -> tillpoint_core::Customer {
        tillpoint_core::Customer {
            id: self.id,
            name: self.name,
            phone: self.phone,
            email: self.email,
        }
    }
}

/// Returns all customers ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_customers(pool: &PgPool) -> Result<Vec<CustomerRow>, DbError> {
    let rows = sqlx::query_as::<_, CustomerRow>(
        "SELECT id, name, phone, email, created_at, updated_at \
         FROM customers \
         ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Inserts a customer and returns the stored row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_customer(
    pool: &PgPool,
    name: &str,
    phone: Option<&str>,
    email: Option<&str>,
) -> Result<CustomerRow, DbError> {
    let row = sqlx::query_as::<_, CustomerRow>(
        "INSERT INTO customers (name, phone, email) \
         VALUES ($1, $2, $3) \
         RETURNING id, name, phone, email, created_at, updated_at",
    )
    .bind(name)
    .bind(phone)
    .bind(email)
    .fetch_one(pool)
    .await?;

    Ok(row)
}
