//! Stock-unit defaults derived from a product's category.
//!
//! The tables here are the built-in baseline; the POS profile store layers
//! user-defined categories, units, and per-product overrides on top.

/// Unit used when neither the product nor its category provides one.
pub const FALLBACK_STOCK_UNIT: &str = "pcs";

/// Categories offered out of the box.
pub const BUILTIN_CATEGORIES: &[&str] = &[
    "Beverages",
    "Bakery",
    "Dairy",
    "Produce",
    "Snacks",
    "Electronics",
    "Clothing",
    "Household",
];

/// Stock units offered out of the box.
pub const BUILTIN_STOCK_UNITS: &[&str] = &[
    "pcs", "bottle", "can", "pack", "box", "kg", "g", "litre", "loaf", "carton",
];

/// Returns the default stock unit for a category, matched
/// case-insensitively.
#[must_use]
pub fn default_stock_unit(category: &str) -> Option<&'static str> {
    match category.to_ascii_lowercase().as_str() {
        "beverages" => Some("bottle"),
        "bakery" => Some("loaf"),
        "dairy" => Some("carton"),
        "produce" => Some("kg"),
        "snacks" => Some("pack"),
        "electronics" | "clothing" => Some("pcs"),
        "household" => Some("box"),
        _ => None,
    }
}
