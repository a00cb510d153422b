//! Notification envelopes pushed to WebSocket listeners.
//!
//! Every frame is `{event, data, timestamp}`:
//!
//! | Event                  | Delivery  | `data`                                   |
//! |------------------------|-----------|------------------------------------------|
//! | `CONNECTED`            | unicast   | [`ConnectedNotice`]                      |
//! | `USER_CREATED`         | broadcast | the full [`User`](super::User)           |
//! | `ORDER_STATUS_CHANGED` | broadcast | [`StatusChange`]                         |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{OrderId, OrderStatus, UserId};

/// Name of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Connected,
    UserCreated,
    OrderStatusChanged,
}

impl EventKind {
    /// The wire name of this event.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connected => "CONNECTED",
            Self::UserCreated => "USER_CREATED",
            Self::OrderStatusChanged => "ORDER_STATUS_CHANGED",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The standard notification wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub event: EventKind,
    pub data: T,
    #[serde(with = "super::timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl<T> Envelope<T> {
    /// Wrap `data`, stamped with the current time.
    #[must_use]
    pub fn now(event: EventKind, data: T) -> Self {
        Self {
            event,
            data,
            timestamp: Utc::now(),
        }
    }
}

/// Payload of `ORDER_STATUS_CHANGED`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub old_status: OrderStatus,
    pub new_status: OrderStatus,
}

/// Payload of the `CONNECTED` handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectedNotice {
    pub message: String,
}

impl Default for ConnectedNotice {
    fn default() -> Self {
        Self {
            message: "WebSocket connected".to_owned(),
        }
    }
}
