//! Operation-layer error types.

use ordercast_core::StatusError;
use thiserror::Error;

use crate::db::StoreError;

/// Errors surfaced by [`UserService`](super::UserService) and
/// [`OrderService`](super::OrderService).
///
/// Display strings pass through unchanged so the transport layer can reuse
/// them as client-facing messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The store rejected the mutation or lookup.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A status string outside the order status enum.
    #[error(transparent)]
    InvalidStatus(#[from] StatusError),
}
