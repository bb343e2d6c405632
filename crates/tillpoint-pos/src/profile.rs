//! Typed accessors over the key-value store: archived/featured id sets,
//! custom category and unit lists, per-product unit overrides, and the
//! pending-sale draft.
//!
//! Every read is an isolated get with JSON decode and a defensive fallback
//! to the type's default on parse failure; corrupt state is logged and
//! discarded, never surfaced.

use std::collections::{HashMap, HashSet};

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use tillpoint_core::{units, Product};

use crate::cart::PendingSale;
use crate::store::{KvStore, StoreError};

pub const ARCHIVED_KEY: &str = "tillpoint.archived";
pub const FEATURED_KEY: &str = "tillpoint.featured";
pub const CATEGORIES_KEY: &str = "tillpoint.categories";
pub const UNITS_KEY: &str = "tillpoint.units";
pub const UNIT_OVERRIDES_KEY: &str = "tillpoint.unit_overrides";
pub const PENDING_SALE_KEY: &str = "tillpoint.pending_sale";

/// Per-profile POS state persisted through a [`KvStore`].
#[derive(Debug)]
pub struct ProfileStore<S> {
    store: S,
}

impl<S: KvStore> ProfileStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    // -----------------------------------------------------------------------
    // Generic get/put
    // -----------------------------------------------------------------------

    fn get_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.store.get_raw(key) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(key, error = %e, "discarding malformed profile value");
                T::default()
            }),
            Ok(None) => T::default(),
            Err(e) => {
                tracing::warn!(key, error = %e, "profile read failed; using default");
                T::default()
            }
        }
    }

    fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value).map_err(|source| StoreError::Serialize {
            key: key.to_owned(),
            source,
        })?;
        self.store.set_raw(key, &raw)
    }

    // -----------------------------------------------------------------------
    // Archived / featured id sets
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn archived_ids(&self) -> HashSet<Uuid> {
        self.get_or_default(ARCHIVED_KEY)
    }

    /// Flips the archived flag for a product; returns the new state.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the updated set cannot be persisted.
    pub fn toggle_archived(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut ids = self.archived_ids();
        let now_archived = ids.insert(id);
        if !now_archived {
            ids.remove(&id);
        }
        self.put(ARCHIVED_KEY, &ids)?;
        Ok(now_archived)
    }

    #[must_use]
    pub fn featured_ids(&self) -> HashSet<Uuid> {
        self.get_or_default(FEATURED_KEY)
    }

    /// Flips the featured flag for a product; returns the new state.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the updated set cannot be persisted.
    pub fn toggle_featured(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut ids = self.featured_ids();
        let now_featured = ids.insert(id);
        if !now_featured {
            ids.remove(&id);
        }
        self.put(FEATURED_KEY, &ids)?;
        Ok(now_featured)
    }

    // -----------------------------------------------------------------------
    // Custom categories and stock units
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn custom_categories(&self) -> Vec<String> {
        self.get_or_default(CATEGORIES_KEY)
    }

    /// All categories: built-ins followed by custom additions.
    #[must_use]
    pub fn all_categories(&self) -> Vec<String> {
        let mut all: Vec<String> = units::BUILTIN_CATEGORIES
            .iter()
            .map(|s| (*s).to_owned())
            .collect();
        all.extend(self.custom_categories());
        all
    }

    /// Adds a custom category unless it duplicates an existing one
    /// (case-insensitive). Returns whether the list changed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the updated list cannot be persisted.
    pub fn add_custom_category(&self, name: &str) -> Result<bool, StoreError> {
        self.add_to_list(CATEGORIES_KEY, name, units::BUILTIN_CATEGORIES)
    }

    #[must_use]
    pub fn custom_units(&self) -> Vec<String> {
        self.get_or_default(UNITS_KEY)
    }

    /// All stock units: built-ins followed by custom additions.
    #[must_use]
    pub fn all_units(&self) -> Vec<String> {
        let mut all: Vec<String> = units::BUILTIN_STOCK_UNITS
            .iter()
            .map(|s| (*s).to_owned())
            .collect();
        all.extend(self.custom_units());
        all
    }

    /// Adds a custom stock unit unless it duplicates an existing one
    /// (case-insensitive). Returns whether the list changed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the updated list cannot be persisted.
    pub fn add_custom_unit(&self, name: &str) -> Result<bool, StoreError> {
        self.add_to_list(UNITS_KEY, name, units::BUILTIN_STOCK_UNITS)
    }

    fn add_to_list(
        &self,
        key: &str,
        name: &str,
        builtins: &[&str],
    ) -> Result<bool, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(false);
        }
        let mut list: Vec<String> = self.get_or_default(key);
        let duplicate = builtins
            .iter()
            .copied()
            .chain(list.iter().map(String::as_str))
            .any(|existing| existing.eq_ignore_ascii_case(name));
        if duplicate {
            return Ok(false);
        }
        list.push(name.to_owned());
        self.put(key, &list)?;
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Per-product unit overrides
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn unit_overrides(&self) -> HashMap<Uuid, String> {
        self.get_or_default(UNIT_OVERRIDES_KEY)
    }

    /// Pins a display unit for one product.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the updated map cannot be persisted.
    pub fn set_unit_override(&self, id: Uuid, unit: &str) -> Result<(), StoreError> {
        let mut overrides = self.unit_overrides();
        overrides.insert(id, unit.to_owned());
        self.put(UNIT_OVERRIDES_KEY, &overrides)
    }

    /// Display unit for a product: the profile override wins over the
    /// product's own unit and category default.
    #[must_use]
    pub fn unit_for(&self, product: &Product) -> String {
        self.unit_overrides()
            .get(&product.id)
            .cloned()
            .unwrap_or_else(|| product.display_unit().to_owned())
    }

    // -----------------------------------------------------------------------
    // Pending sale draft
    // -----------------------------------------------------------------------

    /// The saved in-progress sale, if any. Malformed drafts are discarded.
    #[must_use]
    pub fn pending_sale(&self) -> Option<PendingSale> {
        self.get_or_default(PENDING_SALE_KEY)
    }

    /// Overwrites the whole pending-sale draft.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the draft cannot be persisted.
    pub fn save_pending_sale(&self, sale: &PendingSale) -> Result<(), StoreError> {
        self.put(PENDING_SALE_KEY, sale)
    }

    /// Drops the pending-sale draft.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the underlying storage fails.
    pub fn clear_pending_sale(&self) -> Result<(), StoreError> {
        self.store.remove(PENDING_SALE_KEY)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use crate::store::MemoryKvStore;

    use super::*;

    fn profile() -> ProfileStore<MemoryKvStore> {
        ProfileStore::new(MemoryKvStore::new())
    }

    fn make_product(id: Uuid, unit: Option<&str>, category: Option<&str>) -> Product {
        Product {
            id,
            name: "Cold Brew".to_string(),
            price: Decimal::new(450, 2),
            currency_code: None,
            stock_quantity: 10,
            stock_unit: unit.map(str::to_owned),
            category: category.map(str::to_owned),
            rating: None,
            image_path: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn toggle_archived_flips_membership() {
        let profile = profile();
        let id = Uuid::new_v4();

        assert!(profile.toggle_archived(id).expect("first toggle"));
        assert!(profile.archived_ids().contains(&id));

        assert!(!profile.toggle_archived(id).expect("second toggle"));
        assert!(!profile.archived_ids().contains(&id));
    }

    #[test]
    fn malformed_stored_value_falls_back_to_default() {
        let store = MemoryKvStore::new();
        store.set_raw(ARCHIVED_KEY, "definitely not json").expect("set");
        store.set_raw(PENDING_SALE_KEY, "[1,2,3]").expect("set");

        let profile = ProfileStore::new(store);
        assert!(profile.archived_ids().is_empty());
        assert!(profile.pending_sale().is_none());
    }

    #[test]
    fn custom_category_rejects_duplicates_of_builtins() {
        let profile = profile();

        assert!(!profile.add_custom_category("beverages").expect("add"));
        assert!(profile.add_custom_category("Pet Supplies").expect("add"));
        assert!(!profile.add_custom_category("pet supplies").expect("re-add"));
        assert!(!profile.add_custom_category("   ").expect("blank"));

        assert_eq!(profile.custom_categories(), vec!["Pet Supplies".to_string()]);
        assert!(profile
            .all_categories()
            .iter()
            .any(|c| c == "Pet Supplies"));
    }

    #[test]
    fn custom_unit_trims_and_dedups() {
        let profile = profile();

        assert!(profile.add_custom_unit("  crate ").expect("add"));
        assert!(!profile.add_custom_unit("CRATE").expect("re-add"));
        assert_eq!(profile.custom_units(), vec!["crate".to_string()]);
    }

    #[test]
    fn unit_override_wins_over_product_unit() {
        let profile = profile();
        let id = Uuid::new_v4();
        let product = make_product(id, Some("bottle"), Some("Beverages"));

        assert_eq!(profile.unit_for(&product), "bottle");

        profile.set_unit_override(id, "case").expect("override");
        assert_eq!(profile.unit_for(&product), "case");

        // Other products are untouched.
        let other = make_product(Uuid::new_v4(), None, Some("Produce"));
        assert_eq!(profile.unit_for(&other), "kg");
    }
}
