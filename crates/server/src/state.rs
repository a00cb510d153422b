//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::db::Store;
use crate::services::{NotificationBus, OrderService, UserService};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; owns the store and the notification bus for
/// the lifetime of the process.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Store,
    bus: Arc<NotificationBus>,
}

impl AppState {
    /// Create state with an empty store.
    #[must_use]
    pub fn new(config: &ServerConfig) -> Self {
        let bus = Arc::new(NotificationBus::new(config.listener_buffer));
        Self {
            inner: Arc::new(AppStateInner {
                store: Store::new(),
                bus,
            }),
        }
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    /// The bus, shared with WebSocket connection tasks.
    #[must_use]
    pub fn bus(&self) -> &Arc<NotificationBus> {
        &self.inner.bus
    }

    #[must_use]
    pub fn users(&self) -> UserService<'_> {
        UserService::new(&self.inner.store, &self.inner.bus)
    }

    #[must_use]
    pub fn orders(&self) -> OrderService<'_> {
        OrderService::new(&self.inner.store, &self.inner.bus)
    }
}
