//! WebSocket endpoint.

use std::sync::Arc;

use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;

use crate::services::connections;
use crate::state::AppState;

/// GET /ws
///
/// Upgrades and hands the socket to the connection lifecycle.
pub async fn connect(State(state): State<AppState>, upgrade: WebSocketUpgrade) -> Response {
    let bus = Arc::clone(state.bus());
    upgrade.on_upgrade(move |socket| connections::serve(socket, bus))
}
