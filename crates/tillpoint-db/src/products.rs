//! Database operations for the `products` table.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub currency_code: String,
    pub stock_quantity: i32,
    pub stock_unit: Option<String>,
    pub category: Option<String>,
    pub rating: Option<f32>,
    pub image_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductRow {
    /// Converts the row into the wire-level domain type.
    #[must_use]
    pub fn into_product(self) -> tillpoint_core::Product {
        tillpoint_core::Product {
            id: self.id,
            name: self.name,
            price: self.price,
            currency_code: Some(self.currency_code),
            stock_quantity: self.stock_quantity,
            stock_unit: self.stock_unit,
            category: self.category,
            rating: self.rating,
            image_path: self.image_path,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const PRODUCT_COLUMNS: &str = "id, name, price, currency_code, stock_quantity, stock_unit, \
                               category, rating, image_path, created_at, updated_at";

// ---------------------------------------------------------------------------
// Sparse update input
// ---------------------------------------------------------------------------

/// Partial update for a product; `None` preserves the existing value.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductChanges<'a> {
    pub name: Option<&'a str>,
    pub price: Option<Decimal>,
    pub currency_code: Option<&'a str>,
    pub stock_quantity: Option<i32>,
    pub stock_unit: Option<&'a str>,
    pub category: Option<&'a str>,
    pub rating: Option<f32>,
    pub image_path: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns all products, optionally filtered by a case-insensitive name
/// substring, ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_products(pool: &PgPool, search: Option<&str>) -> Result<Vec<ProductRow>, DbError> {
    let rows = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} \
         FROM products \
         WHERE ($1::TEXT IS NULL OR name ILIKE '%' || $1 || '%') \
         ORDER BY name"
    ))
    .bind(search)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns a single product by id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_product(pool: &PgPool, id: Uuid) -> Result<Option<ProductRow>, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Inserts a new product and returns the stored row.
///
/// `currency_code` falls back to the column default (`'USD'`) when absent.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails (including check-constraint
/// violations on negative price or stock).
pub async fn insert_product(
    pool: &PgPool,
    new: &tillpoint_core::NewProduct,
    image_path: Option<&str>,
) -> Result<ProductRow, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(&format!(
        "INSERT INTO products \
             (name, price, currency_code, stock_quantity, stock_unit, category, rating, image_path) \
         VALUES ($1, $2, COALESCE($3, 'USD'), $4, $5, $6, $7, $8) \
         RETURNING {PRODUCT_COLUMNS}"
    ))
    .bind(&new.name)
    .bind(new.price)
    .bind(new.currency_code.as_deref())
    .bind(new.stock_quantity)
    .bind(new.stock_unit.as_deref())
    .bind(new.category.as_deref())
    .bind(new.rating)
    .bind(image_path)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Applies a sparse update to a product and returns the updated row, or
/// `None` if the id does not exist.
///
/// Uses `COALESCE` in a single `UPDATE … RETURNING` so unset fields keep
/// their current value.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn update_product(
    pool: &PgPool,
    id: Uuid,
    changes: ProductChanges<'_>,
) -> Result<Option<ProductRow>, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(&format!(
        "UPDATE products \
         SET name           = COALESCE($2, name), \
             price          = COALESCE($3, price), \
             currency_code  = COALESCE($4, currency_code), \
             stock_quantity = COALESCE($5, stock_quantity), \
             stock_unit     = COALESCE($6, stock_unit), \
             category       = COALESCE($7, category), \
             rating         = COALESCE($8, rating), \
             image_path     = COALESCE($9, image_path), \
             updated_at     = NOW() \
         WHERE id = $1 \
         RETURNING {PRODUCT_COLUMNS}"
    ))
    .bind(id)
    .bind(changes.name)
    .bind(changes.price)
    .bind(changes.currency_code)
    .bind(changes.stock_quantity)
    .bind(changes.stock_unit)
    .bind(changes.category)
    .bind(changes.rating)
    .bind(changes.image_path)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
