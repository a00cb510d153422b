//! Notification bus: best-effort fan-out of event envelopes to listeners.
//!
//! Each listener owns a bounded queue. [`NotificationBus::publish`] serializes
//! the envelope once and offers it to every queue with `try_send`, so a slow
//! listener loses frames instead of stalling the publisher or its peers.
//! Listeners whose receiving half is gone are pruned after the pass.
//!
//! Delivery is at-most-once with no replay. A listener only sees envelopes
//! published after [`NotificationBus::subscribe`] returned.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use ordercast_core::{Envelope, EventKind};
use serde::Serialize;
use tokio::sync::mpsc::{self, error::TrySendError};

/// A serialized envelope, shared by every listener it is delivered to.
pub type Frame = Arc<str>;

/// Opaque handle identifying one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The receiving side of a subscription.
#[derive(Debug)]
pub struct Subscription {
    pub id: ListenerId,
    pub frames: mpsc::Receiver<Frame>,
}

/// Outcome of one publish.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Listeners that had the frame queued.
    pub delivered: usize,
    /// Listeners that were full or already closed.
    pub skipped: usize,
}

/// The set of live listeners.
#[derive(Debug)]
pub struct NotificationBus {
    listeners: RwLock<HashMap<ListenerId, mpsc::Sender<Frame>>>,
    next_id: AtomicU64,
    capacity: usize,
}

impl NotificationBus {
    /// Create a bus whose listeners each buffer up to `capacity` frames.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            listeners: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            capacity: capacity.max(1),
        }
    }

    /// Register a new listener.
    pub fn subscribe(&self) -> Subscription {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, frames) = mpsc::channel(self.capacity);

        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, tx);

        tracing::debug!(listener = %id, "listener subscribed");
        Subscription { id, frames }
    }

    /// Remove a listener. Unknown or already-removed ids are ignored.
    pub fn unsubscribe(&self, id: ListenerId) {
        let removed = self
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);

        if removed.is_some() {
            tracing::debug!(listener = %id, "listener unsubscribed");
        }
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Wrap `data` in an envelope and offer it to every current listener.
    ///
    /// Never blocks and never fails: full queues are skipped, closed queues
    /// are skipped and then pruned.
    pub fn publish<T: Serialize>(&self, event: EventKind, data: &T) -> Delivery {
        let Some(frame) = encode(event, data) else {
            return Delivery::default();
        };

        // Snapshot so concurrent subscribe/unsubscribe never waits on sends.
        let targets: Vec<(ListenerId, mpsc::Sender<Frame>)> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(id, tx)| (*id, tx.clone()))
            .collect();

        let mut delivery = Delivery::default();
        let mut closed = Vec::new();

        for (id, tx) in targets {
            match tx.try_send(Arc::clone(&frame)) {
                Ok(()) => delivery.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(listener = %id, %event, "listener queue full, frame dropped");
                    delivery.skipped += 1;
                }
                Err(TrySendError::Closed(_)) => {
                    closed.push(id);
                    delivery.skipped += 1;
                }
            }
        }

        if !closed.is_empty() {
            let mut listeners = self
                .listeners
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            for id in closed {
                listeners.remove(&id);
            }
        }

        tracing::debug!(
            %event,
            delivered = delivery.delivered,
            skipped = delivery.skipped,
            "event published"
        );
        delivery
    }
}

/// Serialize an envelope for `data`, stamped now.
///
/// Returns `None` only if `data` itself fails to serialize, which is logged.
pub fn encode<T: Serialize>(event: EventKind, data: &T) -> Option<Frame> {
    match serde_json::to_string(&Envelope::now(event, data)) {
        Ok(json) => Some(Frame::from(json)),
        Err(e) => {
            tracing::error!(%event, error = %e, "failed to serialize event");
            None
        }
    }
}
