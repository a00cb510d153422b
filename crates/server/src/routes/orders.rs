//! Order route handlers.

use axum::extract::{Path, State};
use ordercast_core::validate::{parse_positive_id, validate_new_order, validate_status_change};
use ordercast_core::{Order, OrderId};

use super::extract::JsonBody;
use super::response::ApiResponse;
use crate::error::Result;
use crate::state::AppState;

fn order_id(raw: &str) -> Result<OrderId> {
    Ok(OrderId::new(parse_positive_id(raw, "order")?))
}

/// GET /api/orders
pub async fn index(State(state): State<AppState>) -> ApiResponse<Vec<Order>> {
    ApiResponse::ok(state.orders().list())
}

/// POST /api/orders
///
/// # Errors
///
/// 400 for a bad `userId` or unknown status, 404 if the user does not exist.
pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<ApiResponse<Order>> {
    let request = validate_new_order(&body)?;
    Ok(ApiResponse::created(state.orders().create(request)?))
}

/// GET /api/orders/{id}
///
/// # Errors
///
/// 400 for a malformed id, 404 if no such order.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Order>> {
    let id = order_id(&id)?;
    Ok(ApiResponse::ok(state.orders().get(id)?))
}

/// PUT /api/orders/{id}/status
///
/// The status is checked before the order is looked up.
///
/// # Errors
///
/// 400 for a malformed id or unknown status, 404 if no such order.
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<ApiResponse<Order>> {
    let id = order_id(&id)?;
    let status = validate_status_change(&body)?;
    Ok(ApiResponse::ok(state.orders().transition(id, status)?))
}
