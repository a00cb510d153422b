//! Core types for ordercast.
//!
//! This module provides type-safe wrappers for the domain concepts shared
//! between the store, the notification bus and the HTTP layer.

pub mod email;
pub mod event;
pub mod id;
pub mod order;
pub mod status;
pub mod timestamp;
pub mod user;

pub use email::{Email, EmailError};
pub use event::{ConnectedNotice, Envelope, EventKind, StatusChange};
pub use id::*;
pub use order::Order;
pub use status::{OrderStatus, StatusError};
pub use user::{NewUser, User, UserPatch};
