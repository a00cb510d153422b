//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                   - Liveness check
//!
//! # Users
//! GET    /api/users                - List users
//! POST   /api/users                - Create user (broadcasts USER_CREATED)
//! GET    /api/users/{id}           - Get user
//! PUT    /api/users/{id}           - Partial update
//! DELETE /api/users/{id}           - Delete user
//!
//! # Orders
//! GET    /api/orders               - List orders
//! POST   /api/orders               - Create order
//! GET    /api/orders/{id}          - Get order
//! PUT    /api/orders/{id}/status   - Change status (broadcasts ORDER_STATUS_CHANGED)
//!
//! # Notifications
//! GET    /ws                       - WebSocket upgrade
//! ```

pub mod extract;
pub mod orders;
pub mod response;
pub mod users;
pub mod ws;

use axum::{
    Router,
    routing::{get, put},
};

use crate::error::AppError;
use crate::state::AppState;

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::index).post(users::create))
        .route(
            "/{id}",
            get(users::show).put(users::update).delete(users::destroy),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index).post(orders::create))
        .route("/{id}", get(orders::show))
        .route("/{id}/status", put(orders::update_status))
}

/// Create all API and WebSocket routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/users", user_routes())
        .nest("/api/orders", order_routes())
        .route("/ws", get(ws::connect))
}

/// Fallback for unmatched paths.
pub async fn not_found() -> AppError {
    AppError::NotFound("Route not found.".to_string())
}
