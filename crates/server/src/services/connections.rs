//! WebSocket connection lifecycle.
//!
//! ```text
//! CONNECTING --open()--> OPEN --close()--> CLOSED
//!      \_______________close()_____________/
//! ```
//!
//! Opening subscribes the connection to the bus; the caller then sends the
//! `CONNECTED` handshake to that socket alone. Closing, whether from a client
//! close frame, a transport error or a dropped task, unsubscribes exactly once.
//! A publish racing with the close sees a closed queue and skips it.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use ordercast_core::{ConnectedNotice, EventKind};
use tokio::sync::mpsc;

use super::bus::{self, Frame, ListenerId, NotificationBus};

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

/// One client connection's membership in the bus.
///
/// Dropping the value closes it.
#[derive(Debug)]
pub struct Connection {
    bus: Arc<NotificationBus>,
    listener: Option<ListenerId>,
    state: ConnectionState,
}

impl Connection {
    /// A freshly accepted connection, not yet listening.
    #[must_use]
    pub const fn accept(bus: Arc<NotificationBus>) -> Self {
        Self {
            bus,
            listener: None,
            state: ConnectionState::Connecting,
        }
    }

    #[must_use]
    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    /// Subscribe to the bus and move to `Open`.
    ///
    /// Returns `None` unless the connection is still `Connecting`.
    pub fn open(&mut self) -> Option<mpsc::Receiver<Frame>> {
        if self.state != ConnectionState::Connecting {
            return None;
        }
        let subscription = self.bus.subscribe();
        self.listener = Some(subscription.id);
        self.state = ConnectionState::Open;
        Some(subscription.frames)
    }

    /// Leave the bus and move to `Closed`. Safe to call repeatedly.
    pub fn close(&mut self) {
        if let Some(id) = self.listener.take() {
            self.bus.unsubscribe(id);
        }
        self.state = ConnectionState::Closed;
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close();
    }
}

/// The `CONNECTED` handshake frame.
#[must_use]
pub fn handshake() -> Option<Frame> {
    bus::encode(EventKind::Connected, &ConnectedNotice::default())
}

/// Drive one upgraded socket until either side closes it.
///
/// Inbound text and binary frames are ignored; the channel is push-only.
pub async fn serve(socket: WebSocket, bus: Arc<NotificationBus>) {
    let mut connection = Connection::accept(bus);
    let Some(mut frames) = connection.open() else {
        return;
    };
    tracing::info!("websocket connected");

    let (mut sink, mut stream) = socket.split();

    if let Some(hello) = handshake()
        && sink.send(Message::Text(hello.to_string().into())).await.is_err()
    {
        connection.close();
        return;
    }

    loop {
        tokio::select! {
            frame = frames.recv() => {
                let Some(frame) = frame else { break };
                if sink.send(Message::Text(frame.to_string().into())).await.is_err() {
                    break;
                }
            }
            inbound = stream.next() => match inbound {
                Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    connection.close();
    tracing::info!("websocket disconnected");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    #[test]
    fn test_lifecycle() {
        let bus = Arc::new(NotificationBus::new(4));
        let mut connection = Connection::accept(Arc::clone(&bus));
        assert_eq!(connection.state(), ConnectionState::Connecting);
        assert_eq!(bus.listener_count(), 0);

        let mut frames = connection.open().unwrap();
        assert_eq!(connection.state(), ConnectionState::Open);
        assert_eq!(bus.listener_count(), 1);
        assert!(connection.open().is_none());

        bus.publish(EventKind::UserCreated, &json!({"id": 1}));
        assert!(frames.try_recv().is_ok());

        connection.close();
        connection.close();
        assert_eq!(connection.state(), ConnectionState::Closed);
        assert_eq!(bus.listener_count(), 0);
        assert!(connection.open().is_none());
    }

    #[test]
    fn test_close_before_open() {
        let bus = Arc::new(NotificationBus::new(4));
        let mut connection = Connection::accept(Arc::clone(&bus));
        connection.close();
        assert_eq!(connection.state(), ConnectionState::Closed);
        assert!(connection.open().is_none());
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let bus = Arc::new(NotificationBus::new(4));
        {
            let mut connection = Connection::accept(Arc::clone(&bus));
            let _frames = connection.open().unwrap();
            assert_eq!(bus.listener_count(), 1);
        }
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_publish_after_close_is_harmless() {
        let bus = Arc::new(NotificationBus::new(4));
        let mut closing = Connection::accept(Arc::clone(&bus));
        let mut staying = Connection::accept(Arc::clone(&bus));
        let closing_frames = closing.open().unwrap();
        let mut staying_frames = staying.open().unwrap();

        drop(closing_frames);
        let delivery = bus.publish(EventKind::UserCreated, &json!({"id": 1}));
        closing.close();

        assert_eq!(delivery.delivered, 1);
        assert!(staying_frames.try_recv().is_ok());
        assert_eq!(bus.listener_count(), 1);
    }

    #[test]
    fn test_handshake_frame() {
        let value: Value = serde_json::from_str(&handshake().unwrap()).unwrap();
        assert_eq!(value["event"], "CONNECTED");
        assert_eq!(value["data"]["message"], "WebSocket connected");
    }
}
