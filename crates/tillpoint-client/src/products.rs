//! HTTP client for the product resource.
//!
//! Responses are wrapped in the server's `{ data, meta }` envelope; the
//! client unwraps them and returns the domain types directly.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use uuid::Uuid;

use tillpoint_core::{NewProduct, Product, ProductPatch};

use crate::error::ClientError;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

/// An image file to attach to a create or update request.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Client for the product API.
pub struct ProductsClient {
    client: Client,
    base_url: String,
}

impl ProductsClient {
    /// Creates a client with a configured timeout against the given base URL
    /// (e.g. `http://localhost:4000`).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Fetches all products, optionally filtered by a name substring.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on network failure, non-2xx status, or a
    /// malformed response body.
    pub async fn list_products(&self, search: Option<&str>) -> Result<Vec<Product>, ClientError> {
        let url = format!("{}/products", self.base_url);
        let mut request = self.client.get(&url);
        if let Some(search) = search {
            request = request.query(&[("search", search)]);
        }
        let response = request.send().await?;
        unwrap_envelope(response, "product list").await
    }

    /// Creates a product via multipart form, optionally attaching an image.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on network failure, non-2xx status, or a
    /// malformed response body.
    pub async fn create_product(
        &self,
        new: &NewProduct,
        image: Option<ImageUpload>,
    ) -> Result<Product, ClientError> {
        let url = format!("{}/products", self.base_url);
        let form = build_product_form(new, image)?;
        let response = self.client.post(&url).multipart(form).send().await?;
        unwrap_envelope(response, "created product").await
    }

    /// Applies a sparse JSON patch to a product.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] if the product id does not exist,
    /// or another [`ClientError`] variant on failure.
    pub async fn update_product(
        &self,
        id: Uuid,
        patch: &ProductPatch,
    ) -> Result<Product, ClientError> {
        let url = format!("{}/products/{id}", self.base_url);
        let response = self.client.patch(&url).json(patch).send().await?;
        unwrap_envelope(response, "updated product").await
    }

    /// Sets a product's absolute stock quantity. Used by the restock
    /// workflow after it has computed `current + staged`.
    ///
    /// # Errors
    ///
    /// Same as [`ProductsClient::update_product`].
    pub async fn update_stock(&self, id: Uuid, new_quantity: i32) -> Result<Product, ClientError> {
        self.update_product(id, &ProductPatch::stock_only(new_quantity))
            .await
    }
}

fn build_product_form(
    new: &NewProduct,
    image: Option<ImageUpload>,
) -> Result<Form, ClientError> {
    let mut form = Form::new()
        .text("name", new.name.clone())
        .text("price", new.price.to_string())
        .text("stockQuantity", new.stock_quantity.to_string());
    if let Some(ref code) = new.currency_code {
        form = form.text("currencyCode", code.clone());
    }
    if let Some(ref unit) = new.stock_unit {
        form = form.text("stockUnit", unit.clone());
    }
    if let Some(ref category) = new.category {
        form = form.text("category", category.clone());
    }
    if let Some(rating) = new.rating {
        form = form.text("rating", rating.to_string());
    }
    if let Some(image) = image {
        let part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.content_type)?;
        form = form.part("image", part);
    }
    Ok(form)
}

async fn unwrap_envelope<T: DeserializeOwned>(
    response: Response,
    context: &str,
) -> Result<T, ClientError> {
    let status = response.status();
    let url = response.url().to_string();

    if status == StatusCode::NOT_FOUND {
        return Err(ClientError::NotFound { url });
    }

    if !status.is_success() {
        tracing::warn!(%status, %url, "product API request failed");
        let body = response.text().await.unwrap_or_default();
        if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&body) {
            return Err(ClientError::Api {
                status: status.as_u16(),
                code: envelope.error.code,
                message: envelope.error.message,
            });
        }
        return Err(ClientError::UnexpectedStatus {
            status: status.as_u16(),
            url,
        });
    }

    let body = response.text().await?;
    let envelope: Envelope<T> =
        serde_json::from_str(&body).map_err(|source| ClientError::Deserialize {
            context: context.to_owned(),
            source,
        })?;
    Ok(envelope.data)
}
