//! Integration tests for `ProductsClient`.
//!
//! Uses `wiremock` to stand up a local HTTP server for each test so no
//! real network traffic is made.

use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tillpoint_client::{ClientError, ImageUpload, ProductsClient};
use tillpoint_core::{NewProduct, ProductPatch};

/// Builds a `ProductsClient` suitable for tests: 5-second timeout.
fn test_client(server: &MockServer) -> ProductsClient {
    ProductsClient::new(&server.uri(), 5).expect("failed to build test ProductsClient")
}

/// Minimal product JSON fixture in the server's wire shape.
fn product_json(id: Uuid, name: &str, stock: i32) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "price": "4.50",
        "currencyCode": "USD",
        "stockQuantity": stock,
        "stockUnit": "bottle",
        "category": "Beverages",
        "rating": 4.5,
        "imagePath": null,
        "createdAt": "2026-08-01T12:00:00Z",
        "updatedAt": "2026-08-01T12:00:00Z"
    })
}

fn product_envelope(id: Uuid, name: &str, stock: i32) -> serde_json::Value {
    json!({
        "data": product_json(id, name, stock),
        "meta": { "request_id": "test", "timestamp": "2026-08-01T12:00:00Z" }
    })
}

#[tokio::test]
async fn list_products_unwraps_the_envelope() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "data": [product_json(id, "Cold Brew Coffee", 40)],
            "meta": { "request_id": "test", "timestamp": "2026-08-01T12:00:00Z" }
        })))
        .mount(&server)
        .await;

    let products = test_client(&server)
        .list_products(None)
        .await
        .expect("list should succeed");

    assert_eq!(products.len(), 1);
    assert_eq!(products[0].id, id);
    assert_eq!(products[0].price, Decimal::new(450, 2));
    assert_eq!(products[0].stock_quantity, 40);
}

#[tokio::test]
async fn list_products_forwards_the_search_param() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products"))
        .and(query_param("search", "brew"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "data": [],
            "meta": { "request_id": "test", "timestamp": "2026-08-01T12:00:00Z" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let products = test_client(&server)
        .list_products(Some("brew"))
        .await
        .expect("filtered list should succeed");

    assert!(products.is_empty());
}

#[tokio::test]
async fn update_product_sends_a_sparse_camel_case_body() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("PATCH"))
        .and(path(format!("/products/{id}")))
        .and(body_json(json!({ "stockQuantity": 47 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&product_envelope(id, "Cold Brew Coffee", 47)))
        .expect(1)
        .mount(&server)
        .await;

    let product = test_client(&server)
        .update_stock(id, 47)
        .await
        .expect("stock update should succeed");

    assert_eq!(product.stock_quantity, 47);
}

#[tokio::test]
async fn update_product_maps_404_to_not_found() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("PATCH"))
        .and(path(format!("/products/{id}")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = test_client(&server)
        .update_product(id, &ProductPatch::stock_only(1))
        .await;

    assert!(
        matches!(result, Err(ClientError::NotFound { .. })),
        "expected NotFound, got: {result:?}"
    );
}

#[tokio::test]
async fn create_product_posts_multipart_and_returns_the_product() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(201).set_body_json(&product_envelope(id, "Cold Brew Coffee", 40)))
        .expect(1)
        .mount(&server)
        .await;

    let new = NewProduct {
        name: "Cold Brew Coffee".to_string(),
        price: Decimal::new(450, 2),
        stock_quantity: 40,
        currency_code: Some("USD".to_string()),
        stock_unit: None,
        category: Some("Beverages".to_string()),
        rating: None,
    };
    let image = ImageUpload {
        file_name: "cold-brew.png".to_string(),
        content_type: "image/png".to_string(),
        bytes: vec![0x89, 0x50, 0x4e, 0x47],
    };

    let product = test_client(&server)
        .create_product(&new, Some(image))
        .await
        .expect("create should succeed");

    assert_eq!(product.id, id);
    assert_eq!(product.name, "Cold Brew Coffee");
}

#[tokio::test]
async fn server_error_envelope_becomes_a_typed_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(500).set_body_json(&json!({
            "error": { "code": "internal_error", "message": "database query failed" },
            "meta": { "request_id": "test", "timestamp": "2026-08-01T12:00:00Z" }
        })))
        .mount(&server)
        .await;

    let result = test_client(&server).list_products(None).await;

    match result {
        Err(ClientError::Api { status, code, .. }) => {
            assert_eq!(status, 500);
            assert_eq!(code, "internal_error");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn malformed_success_body_is_a_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = test_client(&server).list_products(None).await;

    assert!(
        matches!(result, Err(ClientError::Deserialize { .. })),
        "expected Deserialize, got: {result:?}"
    );
}
