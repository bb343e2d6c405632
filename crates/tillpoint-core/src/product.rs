use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::units;

/// A catalog product as it travels over the wire and through the POS
/// workflows.
///
/// `currency_code` and `stock_unit` may be absent on older rows; display
/// helpers apply the documented defaults instead of mutating the record.
/// Field names serialize in camelCase to match the public API surface
/// (`stockQuantity`, `imagePath`, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub currency_code: Option<String>,
    pub stock_quantity: i32,
    #[serde(default)]
    pub stock_unit: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub image_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Currency code to display: the stored code, or `"USD"` when absent.
    #[must_use]
    pub fn display_currency(&self) -> &str {
        self.currency_code.as_deref().unwrap_or("USD")
    }

    /// Stock unit to display: the stored unit, else the category default,
    /// else the global fallback.
    #[must_use]
    pub fn display_unit(&self) -> &str {
        if let Some(unit) = self.stock_unit.as_deref() {
            return unit;
        }
        self.category
            .as_deref()
            .and_then(units::default_stock_unit)
            .unwrap_or(units::FALLBACK_STOCK_UNIT)
    }

    #[must_use]
    pub fn in_stock(&self) -> bool {
        self.stock_quantity > 0
    }
}

/// Fields required to create a product.
///
/// Mirrors the multipart form of `POST /products`: `name`, `price`, and
/// `stockQuantity` are mandatory, everything else optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub price: Decimal,
    pub stock_quantity: i32,
    #[serde(default)]
    pub currency_code: Option<String>,
    #[serde(default)]
    pub stock_unit: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub rating: Option<f32>,
}

/// Sparse update body for `PATCH /products/{productId}`.
///
/// Absent fields keep their current value; there is no way to clear a field
/// back to `NULL` through this surface.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_quantity: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
}

impl ProductPatch {
    /// `true` when no field is set; such a patch is a no-op.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.currency_code.is_none()
            && self.stock_quantity.is_none()
            && self.stock_unit.is_none()
            && self.category.is_none()
            && self.rating.is_none()
            && self.image_path.is_none()
    }

    /// Patch that only bumps the stock quantity, as used by the restock
    /// workflow.
    #[must_use]
    pub fn stock_only(new_quantity: i32) -> Self {
        Self {
            stock_quantity: Some(new_quantity),
            ..Self::default()
        }
    }
}
