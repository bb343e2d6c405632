//! Cart session and pending-sale hand-off.
//!
//! The cart is plain in-memory state; every mutation that changes the draft
//! re-serializes the whole pending-sale aggregate to the profile store so a
//! reload reconstructs the session exactly. Persistence failures are logged
//! and swallowed — the cart itself never errors on user input.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tillpoint_core::{Customer, PaymentMethod, Product, SaleTotals};

use crate::profile::ProfileStore;
use crate::store::KvStore;

/// Delay standing in for a real order commit during checkout confirmation.
pub const SIMULATED_COMMIT_DELAY: Duration = Duration::from_millis(800);

/// One product in the cart. Invariant: `1 <= quantity <= product.stock_quantity`,
/// and no two line items reference the same product id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product: Product,
    pub quantity: i32,
}

impl LineItem {
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// The client-local draft of an in-progress checkout, not yet committed to
/// any backend order record. Unit of hand-off between the cart and the
/// confirmation step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingSale {
    pub customer: Option<Customer>,
    pub items: Vec<LineItem>,
    pub discount_percent: Decimal,
    pub payment_method: PaymentMethod,
    pub note: String,
    pub totals: SaleTotals,
}

/// Receipt produced once the confirmation step finishes its (simulated)
/// commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleReceipt {
    pub sale_id: Uuid,
    pub totals: SaleTotals,
    pub payment_method: PaymentMethod,
    pub completed_at: DateTime<Utc>,
}

/// An editable, locally-computed order draft.
pub struct CartSession<S> {
    profile: ProfileStore<S>,
    customer: Option<Customer>,
    items: Vec<LineItem>,
    discount_percent: Decimal,
    payment_method: PaymentMethod,
    note: String,
}

impl<S: KvStore> CartSession<S> {
    /// Opens a session, restoring any saved draft. Malformed persisted data
    /// has already been discarded by the profile layer, so this never fails.
    #[must_use]
    pub fn open(profile: ProfileStore<S>) -> Self {
        let draft = profile.pending_sale();
        match draft {
            Some(sale) => Self {
                profile,
                customer: sale.customer,
                items: sale.items,
                discount_percent: sale.discount_percent,
                payment_method: sale.payment_method,
                note: sale.note,
            },
            None => Self {
                profile,
                customer: None,
                items: Vec::new(),
                discount_percent: Decimal::ZERO,
                payment_method: PaymentMethod::default(),
                note: String::new(),
            },
        }
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Adds one of `product` to the cart.
    ///
    /// An existing line grows by 1 unless that would exceed the product's
    /// stock; the ceiling is a silent no-op. Out-of-stock products are not
    /// added at all.
    pub fn add_to_cart(&mut self, product: &Product) {
        if let Some(item) = self.items.iter_mut().find(|i| i.product.id == product.id) {
            if item.quantity >= product.stock_quantity {
                return;
            }
            item.quantity += 1;
        } else {
            if product.stock_quantity < 1 {
                return;
            }
            self.items.push(LineItem {
                product: product.clone(),
                quantity: 1,
            });
        }
        self.persist();
    }

    /// Sets a line's quantity from raw user input.
    ///
    /// `None` (non-numeric input) or zero removes the line; negative values
    /// are ignored; anything else is clamped to the product's stock.
    pub fn update_quantity(&mut self, product_id: Uuid, quantity: Option<i64>) {
        match quantity {
            None | Some(0) => self.remove_from_cart(product_id),
            Some(q) if q < 0 => {}
            Some(q) => {
                if let Some(item) = self.items.iter_mut().find(|i| i.product.id == product_id) {
                    let ceiling = i64::from(item.product.stock_quantity);
                    item.quantity = i32::try_from(q.min(ceiling)).unwrap_or(i32::MAX);
                    self.persist();
                }
            }
        }
    }

    /// Deletes the line item unconditionally.
    pub fn remove_from_cart(&mut self, product_id: Uuid) {
        let before = self.items.len();
        self.items.retain(|i| i.product.id != product_id);
        if self.items.len() != before {
            self.persist();
        }
    }

    pub fn set_discount_percent(&mut self, percent: Decimal) {
        self.discount_percent = percent.clamp(Decimal::ZERO, Decimal::from(100));
        self.persist();
    }

    pub fn set_note(&mut self, note: impl Into<String>) {
        self.note = note.into();
        self.persist();
    }

    pub fn set_payment_method(&mut self, method: PaymentMethod) {
        self.payment_method = method;
        self.persist();
    }

    pub fn set_customer(&mut self, customer: Option<Customer>) {
        self.customer = customer;
        self.persist();
    }

    /// Empties the draft and removes it from the profile store.
    pub fn clear(&mut self) {
        self.items.clear();
        self.customer = None;
        self.discount_percent = Decimal::ZERO;
        self.payment_method = PaymentMethod::default();
        self.note.clear();
        if let Err(e) = self.profile.clear_pending_sale() {
            tracing::warn!(error = %e, "failed to clear pending sale draft");
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn quantity_of(&self, product_id: Uuid) -> Option<i32> {
        self.items
            .iter()
            .find(|i| i.product.id == product_id)
            .map(|i| i.quantity)
    }

    #[must_use]
    pub fn note(&self) -> &str {
        &self.note
    }

    #[must_use]
    pub fn customer(&self) -> Option<&Customer> {
        self.customer.as_ref()
    }

    #[must_use]
    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    /// Derived money breakdown, recomputed from the current lines.
    #[must_use]
    pub fn totals(&self) -> SaleTotals {
        let subtotal: Decimal = self.items.iter().map(LineItem::line_total).sum();
        SaleTotals::compute(subtotal, self.discount_percent)
    }

    fn snapshot(&self) -> PendingSale {
        PendingSale {
            customer: self.customer.clone(),
            items: self.items.clone(),
            discount_percent: self.discount_percent,
            payment_method: self.payment_method,
            note: self.note.clone(),
            totals: self.totals(),
        }
    }

    fn persist(&self) {
        if let Err(e) = self.profile.save_pending_sale(&self.snapshot()) {
            tracing::warn!(error = %e, "failed to persist pending sale draft");
        }
    }

    /// Snapshots the current draft for the confirmation step. The draft
    /// stays persisted until [`finalize_sale`] clears it; no backend call is
    /// made here.
    #[must_use]
    pub fn process_sale(&self) -> PendingSale {
        let snapshot = self.snapshot();
        if let Err(e) = self.profile.save_pending_sale(&snapshot) {
            tracing::warn!(error = %e, "failed to persist pending sale draft");
        }
        snapshot
    }

    /// Hands the profile store back, e.g. to a confirmation step.
    #[must_use]
    pub fn profile(&self) -> &ProfileStore<S> {
        &self.profile
    }
}

/// Confirmation step: re-exposes the draft's totals, waits out the
/// simulated commit, clears the persisted draft, and issues a receipt.
///
/// The commit cannot fail in the current scope; the delay only stands in
/// for a real backend call.
pub async fn finalize_sale<S: KvStore>(
    profile: &ProfileStore<S>,
    draft: &PendingSale,
    commit_delay: Duration,
) -> SaleReceipt {
    tokio::time::sleep(commit_delay).await;

    if let Err(e) = profile.clear_pending_sale() {
        tracing::warn!(error = %e, "failed to clear pending sale after checkout");
    }

    SaleReceipt {
        sale_id: Uuid::new_v4(),
        totals: draft.totals,
        payment_method: draft.payment_method,
        completed_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use tillpoint_core::PaymentMethod;

    use crate::store::MemoryKvStore;

    use super::*;

    fn make_product(stock: i32, price_cents: i64) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: "Cold Brew".to_string(),
            price: Decimal::new(price_cents, 2),
            currency_code: Some("USD".to_string()),
            stock_quantity: stock,
            stock_unit: None,
            category: Some("Beverages".to_string()),
            rating: None,
            image_path: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn session() -> CartSession<MemoryKvStore> {
        CartSession::open(ProfileStore::new(MemoryKvStore::new()))
    }

    #[test]
    fn add_to_cart_never_exceeds_stock() {
        let mut cart = session();
        let product = make_product(3, 100);

        for _ in 0..4 {
            cart.add_to_cart(&product);
        }

        assert_eq!(cart.quantity_of(product.id), Some(3));
    }

    #[test]
    fn add_to_cart_ignores_out_of_stock_products() {
        let mut cart = session();
        let product = make_product(0, 100);

        cart.add_to_cart(&product);
        assert!(cart.is_empty());
    }

    #[test]
    fn no_duplicate_lines_for_the_same_product() {
        let mut cart = session();
        let product = make_product(10, 100);

        cart.add_to_cart(&product);
        cart.add_to_cart(&product);

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.quantity_of(product.id), Some(2));
    }

    #[test]
    fn update_quantity_to_zero_or_none_removes_the_line() {
        let mut cart = session();
        let product = make_product(10, 100);
        cart.add_to_cart(&product);

        cart.update_quantity(product.id, Some(0));
        assert!(cart.is_empty());

        cart.add_to_cart(&product);
        cart.update_quantity(product.id, None);
        assert!(cart.is_empty());
    }

    #[test]
    fn update_quantity_ignores_negative_values() {
        let mut cart = session();
        let product = make_product(10, 100);
        cart.add_to_cart(&product);

        cart.update_quantity(product.id, Some(-4));
        assert_eq!(cart.quantity_of(product.id), Some(1));
    }

    #[test]
    fn update_quantity_clamps_to_stock() {
        let mut cart = session();
        let product = make_product(5, 100);
        cart.add_to_cart(&product);

        cart.update_quantity(product.id, Some(99));
        assert_eq!(cart.quantity_of(product.id), Some(5));

        cart.update_quantity(product.id, Some(3));
        assert_eq!(cart.quantity_of(product.id), Some(3));
    }

    #[test]
    fn totals_follow_the_documented_formulas() {
        let mut cart = session();
        // 4 x 25.00 = 100.00 subtotal
        let product = make_product(10, 2500);
        for _ in 0..4 {
            cart.add_to_cart(&product);
        }
        cart.set_discount_percent(Decimal::from(10));

        let totals = cart.totals();
        assert_eq!(totals.subtotal, Decimal::from(100));
        assert_eq!(totals.discount, Decimal::from(10));
        assert_eq!(totals.tax, Decimal::from(9));
        assert_eq!(totals.total, Decimal::from(99));
    }

    #[test]
    fn reload_reconstructs_the_saved_draft() {
        let store = MemoryKvStore::new();
        let product = make_product(8, 450);
        let customer = Customer {
            id: Uuid::new_v4(),
            name: "Dana Reyes".to_string(),
            phone: None,
            email: None,
        };

        {
            let mut cart = CartSession::open(ProfileStore::new(&store));
            cart.add_to_cart(&product);
            cart.add_to_cart(&product);
            cart.set_discount_percent(Decimal::from(5));
            cart.set_payment_method(PaymentMethod::Card);
            cart.set_note("no bag");
            cart.set_customer(Some(customer.clone()));
        }

        let restored = CartSession::open(ProfileStore::new(&store));
        assert_eq!(restored.quantity_of(product.id), Some(2));
        assert_eq!(restored.customer().map(|c| c.name.as_str()), Some("Dana Reyes"));
        assert_eq!(restored.payment_method(), PaymentMethod::Card);
        assert_eq!(restored.note(), "no bag");
        assert_eq!(restored.totals().subtotal, Decimal::new(900, 2));
    }

    #[tokio::test]
    async fn finalize_sale_clears_the_draft_and_issues_a_receipt() {
        let store = MemoryKvStore::new();
        let profile = ProfileStore::new(&store);
        let product = make_product(4, 1000);

        let mut cart = CartSession::open(ProfileStore::new(&store));
        cart.add_to_cart(&product);
        let draft = cart.process_sale();
        assert!(ProfileStore::new(&store).pending_sale().is_some());

        let receipt = finalize_sale(&profile, &draft, Duration::ZERO).await;

        assert_eq!(receipt.totals.subtotal, Decimal::from(10));
        assert_eq!(receipt.totals.total, Decimal::from(11));
        assert!(ProfileStore::new(&store).pending_sale().is_none());
    }
}
