//! Batch restock: stage per-product quantities, then apply them one by one
//! against the product API.
//!
//! Updates are sequential awaited PATCH calls computing
//! `stock_quantity = current + staged` from the caller's product snapshot;
//! there is no server-side atomic increment, no retry, and no rollback of
//! already-applied updates. The returned [`RestockReport`] records exactly
//! which products were applied, skipped, or hit the first failure.

use std::collections::HashMap;
use std::time::Duration;

use uuid::Uuid;

use tillpoint_client::ProductsClient;
use tillpoint_core::Product;

use crate::notify::{Level, NotificationQueue};

// ---------------------------------------------------------------------------
// Selection state
// ---------------------------------------------------------------------------

/// Products picked for restock plus their staged (not yet applied)
/// quantities. Opening the dialog seeds every selected id with 0 and marks
/// the first as active.
#[derive(Debug, Default)]
pub struct RestockSelection {
    order: Vec<Uuid>,
    staged: HashMap<Uuid, i32>,
    active: Option<Uuid>,
}

impl RestockSelection {
    #[must_use]
    pub fn open(ids: &[Uuid]) -> Self {
        let mut order = Vec::with_capacity(ids.len());
        let mut staged = HashMap::with_capacity(ids.len());
        for &id in ids {
            if staged.insert(id, 0).is_none() {
                order.push(id);
            }
        }
        Self {
            active: order.first().copied(),
            order,
            staged,
        }
    }

    /// Overwrites the staged quantity for a selected id. Negative values
    /// and unknown ids are ignored.
    pub fn set_quantity(&mut self, id: Uuid, value: i32) {
        if value < 0 {
            return;
        }
        if let Some(staged) = self.staged.get_mut(&id) {
            *staged = value;
        }
    }

    pub fn increment(&mut self, id: Uuid) {
        if let Some(staged) = self.staged.get_mut(&id) {
            *staged = staged.saturating_add(1);
        }
    }

    /// Decrements by 1, floored at 0.
    pub fn decrement(&mut self, id: Uuid) {
        if let Some(staged) = self.staged.get_mut(&id) {
            *staged = (*staged - 1).max(0);
        }
    }

    pub fn set_active(&mut self, id: Uuid) {
        if self.staged.contains_key(&id) {
            self.active = Some(id);
        }
    }

    #[must_use]
    pub fn active(&self) -> Option<Uuid> {
        self.active
    }

    #[must_use]
    pub fn staged_quantity(&self, id: Uuid) -> Option<i32> {
        self.staged.get(&id).copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Staged entries with quantity > 0, in selection order.
    #[must_use]
    pub fn planned(&self) -> Vec<(Uuid, i32)> {
        self.order
            .iter()
            .filter_map(|id| {
                let qty = self.staged.get(id).copied().unwrap_or(0);
                (qty > 0).then_some((*id, qty))
            })
            .collect()
    }

    /// Selected ids whose staged quantity is still 0.
    #[must_use]
    pub fn skipped(&self) -> Vec<Uuid> {
        self.order
            .iter()
            .filter(|id| self.staged.get(id).copied().unwrap_or(0) == 0)
            .copied()
            .collect()
    }

    /// Drops all selection state, as on dialog close or a finished commit.
    pub fn clear(&mut self) {
        self.order.clear();
        self.staged.clear();
        self.active = None;
    }
}

// ---------------------------------------------------------------------------
// Commit
// ---------------------------------------------------------------------------

/// One successfully applied restock line.
#[derive(Debug, Clone)]
pub struct AppliedRestock {
    pub product_id: Uuid,
    pub name: String,
    pub added: i32,
    pub new_quantity: i32,
}

/// The update that stopped the batch, if any.
#[derive(Debug, Clone)]
pub struct RestockFailure {
    pub product_id: Uuid,
    pub message: String,
}

/// Per-item outcome of a restock commit. `applied` lists updates that hit
/// the backend before any failure short-circuited the loop.
#[derive(Debug, Clone, Default)]
pub struct RestockReport {
    pub applied: Vec<AppliedRestock>,
    pub skipped: Vec<Uuid>,
    pub failed: Option<RestockFailure>,
}

impl RestockReport {
    #[must_use]
    pub fn fully_applied(&self) -> bool {
        self.failed.is_none()
    }
}

/// Applies every staged quantity > 0 as an independent stock update.
///
/// Calls are sequential; each success schedules a success notification
/// delayed by `index * stagger` (display cadence only). The first failure
/// aborts the rest of the batch and pushes one generic error notification;
/// already-applied updates stay applied. A full success ends with a summary
/// notification. The selection is cleared on every exit path.
pub async fn commit_restock(
    selection: &mut RestockSelection,
    catalog: &[Product],
    client: &ProductsClient,
    notifications: &NotificationQueue,
    stagger: Duration,
) -> RestockReport {
    let planned = selection.planned();
    let mut report = RestockReport {
        skipped: selection.skipped(),
        ..RestockReport::default()
    };

    for (index, (id, added)) in planned.into_iter().enumerate() {
        let Some(product) = catalog.iter().find(|p| p.id == id) else {
            tracing::error!(product_id = %id, "restock target missing from catalog snapshot");
            notifications.push(Level::Error, "Restock failed: product no longer available");
            report.failed = Some(RestockFailure {
                product_id: id,
                message: "product missing from catalog snapshot".to_owned(),
            });
            break;
        };

        let new_quantity = product.stock_quantity.saturating_add(added);
        match client.update_stock(id, new_quantity).await {
            Ok(updated) => {
                notifications.push_in(
                    Level::Success,
                    format!(
                        "Restocked {}: +{} {}",
                        product.name,
                        added,
                        product.display_unit()
                    ),
                    stagger * u32::try_from(index).unwrap_or(u32::MAX),
                );
                report.applied.push(AppliedRestock {
                    product_id: id,
                    name: product.name.clone(),
                    added,
                    new_quantity: updated.stock_quantity,
                });
            }
            Err(e) => {
                tracing::error!(product_id = %id, error = %e, "restock update failed");
                notifications.push(
                    Level::Error,
                    "Restock failed: remaining items were not applied",
                );
                report.failed = Some(RestockFailure {
                    product_id: id,
                    message: e.to_string(),
                });
                break;
            }
        }
    }

    if report.fully_applied() && !report.applied.is_empty() {
        notifications.push(
            Level::Info,
            format!("{} product(s) restocked", report.applied.len()),
        );
    }

    selection.clear();
    report
}
