//! Sale arithmetic shared by the cart session and the checkout
//! confirmation step.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fixed tax rate applied after the discount: 10%.
#[must_use]
pub fn tax_rate() -> Decimal {
    Decimal::new(10, 2)
}

/// How the customer settles a sale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    Mobile,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Cash => write!(f, "cash"),
            PaymentMethod::Card => write!(f, "card"),
            PaymentMethod::Mobile => write!(f, "mobile"),
        }
    }
}

/// Computed money breakdown of a sale.
///
/// `discount = subtotal * d / 100`, `tax = (subtotal - discount) * 10%`,
/// `total = subtotal - discount + tax`. All arithmetic is exact
/// [`Decimal`]; nothing is rounded here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleTotals {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl SaleTotals {
    /// Computes totals for a subtotal and a discount percentage.
    ///
    /// The percentage is clamped into `[0, 100]` before use, so a caller
    /// can feed raw user input directly.
    #[must_use]
    pub fn compute(subtotal: Decimal, discount_percent: Decimal) -> Self {
        let percent = discount_percent
            .clamp(Decimal::ZERO, Decimal::from(100));
        let discount = subtotal * percent / Decimal::from(100);
        let tax = (subtotal - discount) * tax_rate();
        let total = subtotal - discount + tax;
        Self {
            subtotal,
            discount,
            tax,
            total,
        }
    }

    /// Totals of an empty cart.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            subtotal: Decimal::ZERO,
            discount: Decimal::ZERO,
            tax: Decimal::ZERO,
            total: Decimal::ZERO,
        }
    }
}
