//! Order operations.

use ordercast_core::validate::OrderRequest;
use ordercast_core::{EventKind, Order, OrderId, OrderStatus, StatusChange};
use tracing::instrument;

use super::{NotificationBus, ServiceError};
use crate::db::{Store, StoreError};

/// Order operations over the shared store and bus.
pub struct OrderService<'a> {
    store: &'a Store,
    bus: &'a NotificationBus,
}

impl<'a> OrderService<'a> {
    #[must_use]
    pub const fn new(store: &'a Store, bus: &'a NotificationBus) -> Self {
        Self { store, bus }
    }

    /// All orders in creation order.
    #[must_use]
    pub fn list(&self) -> Vec<Order> {
        self.store.list_orders()
    }

    /// Look up one order.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::OrderNotFound` if the id is unknown.
    pub fn get(&self, id: OrderId) -> Result<Order, ServiceError> {
        Ok(self.store.get_order(id)?)
    }

    /// Create an order. No event is published.
    ///
    /// The user reference is checked before the status, so a request that is
    /// wrong on both counts reports the missing user.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidReference` for an unknown user, then
    /// `ServiceError::InvalidStatus` for an unknown status.
    #[instrument(skip(self, request), fields(user_id = %request.user_id))]
    pub fn create(&self, request: OrderRequest) -> Result<Order, ServiceError> {
        let mut writer = self.store.write();
        if !writer.contains_user(request.user_id) {
            return Err(StoreError::InvalidReference(request.user_id).into());
        }
        let status = request.status()?;
        let order = writer.create_order(request.user_id, status)?;
        drop(writer);

        tracing::info!(order_id = %order.id, %status, "order created");
        Ok(order)
    }

    /// Move an order to `status` and broadcast `ORDER_STATUS_CHANGED`.
    ///
    /// Published under the store lock, like user creation, so the two event
    /// kinds share one ordering.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::OrderNotFound` if the id is unknown. Nothing is
    /// published on failure.
    #[instrument(skip(self), fields(id = %id, status = %status))]
    pub fn transition(&self, id: OrderId, status: OrderStatus) -> Result<Order, ServiceError> {
        let mut writer = self.store.write();
        let transition = writer.update_order_status(id, status)?;
        let order = transition.order;
        let delivery = self.bus.publish(
            EventKind::OrderStatusChanged,
            &StatusChange {
                order_id: order.id,
                user_id: order.user_id,
                old_status: transition.previous,
                new_status: order.status,
            },
        );
        drop(writer);

        tracing::info!(
            old_status = %transition.previous,
            delivered = delivery.delivered,
            skipped = delivery.skipped,
            "order status changed"
        );
        Ok(order)
    }
}
