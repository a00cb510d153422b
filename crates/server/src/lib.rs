//! Ordercast server: users and orders over HTTP with live change
//! notifications over WebSocket.
//!
//! # Architecture
//!
//! - [`db`] - in-memory entity store, one lock for every mutation
//! - [`services`] - operation layer composing the store with the
//!   notification bus, plus the WebSocket connection lifecycle
//! - [`routes`] - axum handlers mapping JSON requests onto services
//! - [`error`] - `AppError`, the single HTTP error envelope
//!
//! State is process-local and lost on restart.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

use std::future::Future;

use axum::{Router, body::Body, http::Request, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub use config::ServerConfig;
pub use state::AppState;

/// Build the complete application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(routes::routes())
        .fallback(routes::not_found)
        .with_state(state)
        .layer(axum::middleware::from_fn(
            middleware::request_id_middleware,
        ))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Serve the application on `listener` until `shutdown` resolves.
///
/// # Errors
///
/// Returns an I/O error if accepting connections fails.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown)
        .await
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}
