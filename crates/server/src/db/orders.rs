//! Order mutations.

use chrono::Utc;
use ordercast_core::{Order, OrderId, OrderStatus, UserId};

use super::{StoreError, StoreWriter};

/// A committed status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// The order after the change.
    pub order: Order,
    /// Status held immediately before the change.
    pub previous: OrderStatus,
}

impl StoreWriter<'_> {
    /// Insert a new order for an existing user.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidReference`] if `user_id` does not name a
    /// live user. The order id sequence does not advance on failure.
    pub fn create_order(
        &mut self,
        user_id: UserId,
        status: OrderStatus,
    ) -> Result<Order, StoreError> {
        let tables = &mut *self.tables;

        if !tables.users.contains_key(&user_id) {
            return Err(StoreError::InvalidReference(user_id));
        }

        let id = OrderId::new(tables.next_order_id);
        let next = tables
            .next_order_id
            .checked_add(1)
            .ok_or(StoreError::IdsExhausted("order"))?;

        let now = Utc::now();
        let order = Order {
            id,
            user_id,
            status,
            created_at: now,
            updated_at: now,
        };

        tables.next_order_id = next;
        tables.orders.insert(id, order.clone());

        Ok(order)
    }

    /// Set an order's status and refresh `updated_at`.
    ///
    /// Setting the status an order already has is still a transition.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::OrderNotFound`] if the order does not exist.
    pub fn update_order_status(
        &mut self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Transition, StoreError> {
        let order = self
            .tables
            .orders
            .get_mut(&id)
            .ok_or(StoreError::OrderNotFound(id))?;

        let previous = order.status;
        order.status = status;
        order.updated_at = Utc::now();

        Ok(Transition {
            order: order.clone(),
            previous,
        })
    }
}
