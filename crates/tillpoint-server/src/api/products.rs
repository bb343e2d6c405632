//! Product resource handlers: list, create (multipart), partial update
//! (JSON or multipart).

use std::collections::HashMap;
use std::str::FromStr;

use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Path, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    Extension, Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use tillpoint_core::{NewProduct, Product, ProductPatch};
use tillpoint_db::ProductChanges;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct ProductQuery {
    pub search: Option<String>,
}

// ---------------------------------------------------------------------------
// Multipart form decoding
// ---------------------------------------------------------------------------

/// Text fields plus the optional `image` file from a product form.
#[derive(Debug, Default)]
struct ProductForm {
    fields: HashMap<String, String>,
    image: Option<(String, Bytes)>,
}

#[derive(Debug)]
enum FormError {
    Transport(String),
    MissingField(&'static str),
    BadField { field: &'static str, value: String },
}

impl std::fmt::Display for FormError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormError::Transport(reason) => write!(f, "failed to read form: {reason}"),
            FormError::MissingField(field) => write!(f, "missing required field '{field}'"),
            FormError::BadField { field, value } => {
                write!(f, "could not parse field '{field}' from '{value}'")
            }
        }
    }
}

async fn read_product_form(multipart: &mut Multipart) -> Result<ProductForm, FormError> {
    let mut form = ProductForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| FormError::Transport(e.to_string()))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        if name == "image" {
            let file_name = field
                .file_name()
                .map_or_else(|| "upload".to_owned(), str::to_owned);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| FormError::Transport(e.to_string()))?;
            form.image = Some((file_name, bytes));
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| FormError::Transport(e.to_string()))?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

fn parse_field<T: FromStr>(
    fields: &HashMap<String, String>,
    field: &'static str,
) -> Result<Option<T>, FormError> {
    match fields.get(field).map(String::as_str).map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| FormError::BadField {
                field,
                value: raw.to_owned(),
            }),
    }
}

fn require<T>(value: Option<T>, field: &'static str) -> Result<T, FormError> {
    value.ok_or(FormError::MissingField(field))
}

fn new_product_from_form(fields: &HashMap<String, String>) -> Result<NewProduct, FormError> {
    let name = fields
        .get("name")
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty());

    Ok(NewProduct {
        name: require(name, "name")?,
        price: require(parse_field::<Decimal>(fields, "price")?, "price")?,
        stock_quantity: require(parse_field::<i32>(fields, "stockQuantity")?, "stockQuantity")?,
        currency_code: fields.get("currencyCode").cloned(),
        stock_unit: fields.get("stockUnit").cloned(),
        category: fields.get("category").cloned(),
        rating: parse_field::<f32>(fields, "rating")?,
    })
}

fn patch_from_form(fields: &HashMap<String, String>) -> Result<ProductPatch, FormError> {
    Ok(ProductPatch {
        name: fields
            .get("name")
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty()),
        price: parse_field::<Decimal>(fields, "price")?,
        currency_code: fields.get("currencyCode").cloned(),
        stock_quantity: parse_field::<i32>(fields, "stockQuantity")?,
        stock_unit: fields.get("stockUnit").cloned(),
        category: fields.get("category").cloned(),
        rating: parse_field::<f32>(fields, "rating")?,
        image_path: None,
    })
}

/// Collapses any form decoding/parsing failure into the generic 500 path.
/// Client input errors are not distinguished from server faults here.
fn map_form_error(request_id: &str, error: &FormError, action: &str) -> ApiError {
    tracing::error!(error = %error, "failed to {action} product");
    ApiError::new(request_id, "internal_error", format!("failed to {action} product"))
}

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /products — all products, optionally filtered by name substring.
pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ApiResponse<Vec<Product>>>, ApiError> {
    let rows = tillpoint_db::list_products(&state.pool, query.search.as_deref())
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(tillpoint_db::ProductRow::into_product)
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// POST /products — create from a multipart form, optionally storing an
/// uploaded image.
pub(super) async fn create_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<Product>>), ApiError> {
    let rid = &req_id.0;

    let form = read_product_form(&mut multipart)
        .await
        .map_err(|e| map_form_error(rid, &e, "create"))?;
    let new = new_product_from_form(&form.fields).map_err(|e| map_form_error(rid, &e, "create"))?;

    let image_path = match form.image {
        Some((file_name, bytes)) => Some(store_image(&state, rid, &file_name, &bytes).await?),
        None => None,
    };

    let row = tillpoint_db::insert_product(&state.pool, &new, image_path.as_deref())
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: row.into_product(),
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

/// PATCH /products/{productId} — sparse update from JSON or multipart,
/// optionally replacing the image. 404 when the id does not exist.
pub(super) async fn update_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(product_id): Path<Uuid>,
    request: Request,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    let rid = &req_id.0;

    // Load first so a nonexistent id is a clean 404 with no write.
    let existing = tillpoint_db::get_product(&state.pool, product_id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    if existing.is_none() {
        return Err(ApiError::new(rid, "not_found", "product not found"));
    }

    let (patch, image) = if is_multipart(request.headers()) {
        let mut multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| map_form_error(rid, &FormError::Transport(e.to_string()), "update"))?;
        let form = read_product_form(&mut multipart)
            .await
            .map_err(|e| map_form_error(rid, &e, "update"))?;
        let patch = patch_from_form(&form.fields).map_err(|e| map_form_error(rid, &e, "update"))?;
        (patch, form.image)
    } else {
        let Json(patch) = Json::<ProductPatch>::from_request(request, &())
            .await
            .map_err(|e| map_form_error(rid, &FormError::Transport(e.to_string()), "update"))?;
        (patch, None)
    };

    let image_path = match image {
        Some((file_name, bytes)) => Some(store_image(&state, rid, &file_name, &bytes).await?),
        None => patch.image_path.clone(),
    };

    let changes = ProductChanges {
        name: patch.name.as_deref(),
        price: patch.price,
        currency_code: patch.currency_code.as_deref(),
        stock_quantity: patch.stock_quantity,
        stock_unit: patch.stock_unit.as_deref(),
        category: patch.category.as_deref(),
        rating: patch.rating,
        image_path: image_path.as_deref(),
    };

    let row = tillpoint_db::update_product(&state.pool, product_id, changes)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?
        .ok_or_else(|| ApiError::new(rid, "not_found", "product not found"))?;

    Ok(Json(ApiResponse {
        data: row.into_product(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

async fn store_image(
    state: &AppState,
    request_id: &str,
    file_name: &str,
    bytes: &[u8],
) -> Result<String, ApiError> {
    state.uploads.save(file_name, bytes).await.map_err(|e| {
        tracing::error!(error = %e, "failed to store uploaded image");
        ApiError::new(request_id, "internal_error", "failed to store uploaded image")
    })
}
