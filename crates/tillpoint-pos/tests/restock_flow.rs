//! Integration tests for the restock commit loop.
//!
//! Uses `wiremock` as the product API and a `ManualScheduler` so notification
//! timing is driven by hand instead of real timers.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tillpoint_client::ProductsClient;
use tillpoint_core::Product;
use tillpoint_pos::{commit_restock, Level, ManualScheduler, NotificationQueue, RestockSelection};

fn make_product(id: Uuid, name: &str, stock: i32) -> Product {
    Product {
        id,
        name: name.to_string(),
        price: Decimal::new(450, 2),
        currency_code: Some("USD".to_string()),
        stock_quantity: stock,
        stock_unit: Some("bottle".to_string()),
        category: Some("Beverages".to_string()),
        rating: None,
        image_path: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn product_envelope(id: Uuid, name: &str, stock: i32) -> serde_json::Value {
    json!({
        "data": {
            "id": id,
            "name": name,
            "price": "4.50",
            "currencyCode": "USD",
            "stockQuantity": stock,
            "stockUnit": "bottle",
            "category": "Beverages",
            "rating": null,
            "imagePath": null,
            "createdAt": "2026-08-01T12:00:00Z",
            "updatedAt": "2026-08-01T12:00:00Z"
        },
        "meta": { "request_id": "test", "timestamp": "2026-08-01T12:00:00Z" }
    })
}

fn manual_queue() -> (NotificationQueue, Arc<ManualScheduler>) {
    let scheduler = Arc::new(ManualScheduler::new());
    (NotificationQueue::new(scheduler.clone()), scheduler)
}

#[tokio::test]
async fn commit_patches_only_staged_quantities_above_zero() {
    let server = MockServer::start().await;
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let c = Uuid::new_v4();
    let catalog = vec![
        make_product(a, "Cold Brew Coffee", 10),
        make_product(b, "Sourdough Loaf", 5),
        make_product(c, "Whole Milk", 2),
    ];

    // newStock = currentStock + staged: 10+5 and 2+3. B must never be called.
    Mock::given(method("PATCH"))
        .and(path(format!("/products/{a}")))
        .and(body_json(json!({ "stockQuantity": 15 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&product_envelope(a, "Cold Brew Coffee", 15)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(format!("/products/{c}")))
        .and(body_json(json!({ "stockQuantity": 5 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&product_envelope(c, "Whole Milk", 5)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(format!("/products/{b}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(&product_envelope(b, "Sourdough Loaf", 5)))
        .expect(0)
        .mount(&server)
        .await;

    let client = ProductsClient::new(&server.uri(), 5).expect("client");
    let (queue, scheduler) = manual_queue();
    let mut selection = RestockSelection::open(&[a, b, c]);
    selection.set_quantity(a, 5);
    selection.set_quantity(c, 3);

    let report = commit_restock(
        &mut selection,
        &catalog,
        &client,
        &queue,
        Duration::from_millis(250),
    )
    .await;

    assert!(report.fully_applied());
    assert_eq!(report.applied.len(), 2);
    assert_eq!(report.applied[0].product_id, a);
    assert_eq!(report.applied[0].new_quantity, 15);
    assert_eq!(report.applied[1].product_id, c);
    assert_eq!(report.applied[1].new_quantity, 5);
    assert_eq!(report.skipped, vec![b]);

    // Selection is cleared on success.
    assert!(selection.is_empty());

    // Only the summary shows immediately; the per-product toasts are
    // staggered display jobs still waiting on the scheduler.
    let active = queue.active();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].level, Level::Info);
    assert!(active[0].message.contains("2 product(s) restocked"));

    scheduler.fire_pending();
    let active = queue.active();
    assert!(
        active.iter().any(|n| n.message.contains("Cold Brew Coffee")),
        "expected a staggered success toast for product A, got: {active:?}"
    );
    assert!(active.iter().any(|n| n.message.contains("Whole Milk")));
}

#[tokio::test]
async fn first_failure_aborts_the_rest_of_the_batch() {
    let server = MockServer::start().await;
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let c = Uuid::new_v4();
    let catalog = vec![
        make_product(a, "Cold Brew Coffee", 10),
        make_product(b, "Sourdough Loaf", 5),
        make_product(c, "Whole Milk", 2),
    ];

    Mock::given(method("PATCH"))
        .and(path(format!("/products/{a}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(&product_envelope(a, "Cold Brew Coffee", 12)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(format!("/products/{b}")))
        .respond_with(ResponseTemplate::new(500).set_body_json(&json!({
            "error": { "code": "internal_error", "message": "database query failed" },
            "meta": { "request_id": "test", "timestamp": "2026-08-01T12:00:00Z" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    // C is after the failure, so it must never be called.
    Mock::given(method("PATCH"))
        .and(path(format!("/products/{c}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(&product_envelope(c, "Whole Milk", 9)))
        .expect(0)
        .mount(&server)
        .await;

    let client = ProductsClient::new(&server.uri(), 5).expect("client");
    let (queue, _scheduler) = manual_queue();
    let mut selection = RestockSelection::open(&[a, b, c]);
    selection.set_quantity(a, 2);
    selection.set_quantity(b, 4);
    selection.set_quantity(c, 7);

    let report = commit_restock(
        &mut selection,
        &catalog,
        &client,
        &queue,
        Duration::from_millis(250),
    )
    .await;

    // A was applied before the failure and is reported as such; no rollback.
    assert_eq!(report.applied.len(), 1);
    assert_eq!(report.applied[0].product_id, a);
    let failed = report.failed.expect("failure should be reported");
    assert_eq!(failed.product_id, b);

    // The dialog closes regardless of outcome.
    assert!(selection.is_empty());

    // One generic error toast, no summary.
    let active = queue.active();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].level, Level::Error);
}

#[tokio::test]
async fn commit_with_nothing_staged_makes_no_calls() {
    let server = MockServer::start().await;
    let a = Uuid::new_v4();
    let catalog = vec![make_product(a, "Cold Brew Coffee", 10)];

    // No mocks mounted: any request would 404 and fail the report.
    let client = ProductsClient::new(&server.uri(), 5).expect("client");
    let (queue, _scheduler) = manual_queue();
    let mut selection = RestockSelection::open(&[a]);

    let report = commit_restock(
        &mut selection,
        &catalog,
        &client,
        &queue,
        Duration::from_millis(250),
    )
    .await;

    assert!(report.fully_applied());
    assert!(report.applied.is_empty());
    assert_eq!(report.skipped, vec![a]);
    assert!(queue.active().is_empty());
}
