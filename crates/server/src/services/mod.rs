//! Operation layer.
//!
//! # Services
//!
//! - `users` - user CRUD, publishes `USER_CREATED`
//! - `orders` - order creation and status transitions, publishes
//!   `ORDER_STATUS_CHANGED`
//! - `bus` - listener registry and non-blocking fan-out
//! - `connections` - per-socket lifecycle on top of the bus
//!
//! Services never build HTTP responses; they return [`ServiceError`] and the
//! route layer maps it.

pub mod bus;
pub mod connections;
mod error;
pub mod orders;
pub mod users;

pub use bus::{Delivery, Frame, ListenerId, NotificationBus, Subscription};
pub use connections::{Connection, ConnectionState};
pub use error::ServiceError;
pub use orders::OrderService;
pub use users::UserService;
