use axum::{extract::State, Extension, Json};

use tillpoint_core::Customer;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

/// GET /customers — all customers, for attaching to a pending sale.
pub(super) async fn list_customers(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<Customer>>>, ApiError> {
    let rows = tillpoint_db::list_customers(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(tillpoint_db::CustomerRow::into_customer)
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
