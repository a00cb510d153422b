//! In-memory entity store.
//!
//! # Tables
//!
//! - `users` - keyed by [`UserId`], iterated in creation order
//! - `emails` - case-folded email -> owning user, the uniqueness index
//! - `orders` - keyed by [`OrderId`], iterated in creation order
//!
//! # Locking
//!
//! All tables sit behind one `RwLock`. Readers share it through
//! [`StoreReader`]; every mutation goes through a single [`StoreWriter`],
//! which makes each check-then-write sequence (duplicate email, user
//! reference) atomic against every other mutation. Mutations check first and
//! commit last, so a failed call leaves the tables untouched and never
//! consumes an id.
//!
//! State is volatile by design. [`Store::reset`] restores the empty baseline
//! and is only compiled for tests (`cfg(test)` or the `testing` feature).

pub mod orders;
pub mod users;

use std::collections::{BTreeMap, HashMap};
use std::ops::Deref;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use ordercast_core::{Order, OrderId, User, UserId};
use thiserror::Error;

pub use orders::Transition;

/// Errors returned by store operations.
///
/// Display strings are client-facing and reused verbatim in error envelopes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No user has this id.
    #[error("User with id {0} not found.")]
    UserNotFound(UserId),

    /// No order has this id.
    #[error("Order with id {0} not found.")]
    OrderNotFound(OrderId),

    /// Another user already owns this email (case-insensitive).
    #[error("Email already exists.")]
    DuplicateEmail,

    /// An order referenced a user that does not exist.
    #[error("User with id {0} not found.")]
    InvalidReference(UserId),

    /// An id sequence reached `i32::MAX`.
    #[error("{0} id sequence exhausted")]
    IdsExhausted(&'static str),
}

/// The authoritative data set.
#[derive(Debug)]
pub struct Tables {
    users: BTreeMap<UserId, User>,
    emails: HashMap<String, UserId>,
    orders: BTreeMap<OrderId, Order>,
    next_user_id: i32,
    next_order_id: i32,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            users: BTreeMap::new(),
            emails: HashMap::new(),
            orders: BTreeMap::new(),
            next_user_id: 1,
            next_order_id: 1,
        }
    }
}

impl Tables {
    /// All users in creation order.
    #[must_use]
    pub fn list_users(&self) -> Vec<User> {
        self.users.values().cloned().collect()
    }

    /// Look up a user.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UserNotFound`] if no user has this id.
    pub fn get_user(&self, id: UserId) -> Result<User, StoreError> {
        self.users
            .get(&id)
            .cloned()
            .ok_or(StoreError::UserNotFound(id))
    }

    /// Whether a user with this id currently exists.
    #[must_use]
    pub fn contains_user(&self, id: UserId) -> bool {
        self.users.contains_key(&id)
    }

    /// All orders in creation order.
    #[must_use]
    pub fn list_orders(&self) -> Vec<Order> {
        self.orders.values().cloned().collect()
    }

    /// Look up an order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::OrderNotFound`] if no order has this id.
    pub fn get_order(&self, id: OrderId) -> Result<Order, StoreError> {
        self.orders
            .get(&id)
            .cloned()
            .ok_or(StoreError::OrderNotFound(id))
    }

    /// Number of live users.
    #[must_use]
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Number of orders.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }
}

/// Shared read access. Holds the read lock until dropped.
pub struct StoreReader<'a> {
    tables: RwLockReadGuard<'a, Tables>,
}

impl Deref for StoreReader<'_> {
    type Target = Tables;

    fn deref(&self) -> &Tables {
        &self.tables
    }
}

/// Exclusive write access. Holds the write lock until dropped.
///
/// Mutations live in [`users`] and [`orders`]. Callers that must act on a
/// committed mutation before any other writer runs (event publishing) do so
/// while still holding the writer.
pub struct StoreWriter<'a> {
    tables: RwLockWriteGuard<'a, Tables>,
}

impl Deref for StoreWriter<'_> {
    type Target = Tables;

    fn deref(&self) -> &Tables {
        &self.tables
    }
}

/// Thread-safe store of users and orders.
#[derive(Debug, Default)]
pub struct Store {
    tables: RwLock<Tables>,
}

impl Store {
    /// Create an empty store with both id sequences starting at 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire shared read access.
    ///
    /// A poisoned lock is recovered: mutations commit in a single step after
    /// all checks, so a panicking holder cannot leave tables half-written.
    pub fn read(&self) -> StoreReader<'_> {
        StoreReader {
            tables: self.tables.read().unwrap_or_else(PoisonError::into_inner),
        }
    }

    /// Acquire exclusive write access.
    pub fn write(&self) -> StoreWriter<'_> {
        StoreWriter {
            tables: self.tables.write().unwrap_or_else(PoisonError::into_inner),
        }
    }

    /// All users in creation order.
    #[must_use]
    pub fn list_users(&self) -> Vec<User> {
        self.read().list_users()
    }

    /// Look up a user.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UserNotFound`] if no user has this id.
    pub fn get_user(&self, id: UserId) -> Result<User, StoreError> {
        self.read().get_user(id)
    }

    /// All orders in creation order.
    #[must_use]
    pub fn list_orders(&self) -> Vec<Order> {
        self.read().list_orders()
    }

    /// Look up an order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::OrderNotFound`] if no order has this id.
    pub fn get_order(&self, id: OrderId) -> Result<Order, StoreError> {
        self.read().get_order(id)
    }

    /// Clear every record and restart both id sequences at 1.
    #[cfg(any(test, feature = "testing"))]
    pub fn reset(&self) {
        *self.write().tables = Tables::default();
        tracing::debug!("store reset");
    }
}
