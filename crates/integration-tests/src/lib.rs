//! End-to-end tests for the ordercast server.
//!
//! Each test boots the real router on an ephemeral port and talks to it with
//! `reqwest` and `tokio-tungstenite`, the way an external client would.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p ordercast-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `users` - user CRUD over HTTP
//! - `orders` - order creation and status transitions
//! - `websocket` - live notifications

use std::net::SocketAddr;
use std::time::Duration;

use futures::StreamExt;
use ordercast_server::{AppState, ServerConfig};
use reqwest::Client;
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, tungstenite::Message};

/// A client-side WebSocket connection to the server.
pub type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How long to wait for an expected notification.
pub const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

/// How long to wait before concluding no notification is coming.
pub const QUIET_PERIOD: Duration = Duration::from_millis(200);

/// A server running in the test's runtime. Aborted on drop.
pub struct TestServer {
    addr: SocketAddr,
    state: AppState,
    client: Client,
    task: JoinHandle<()>,
}

impl TestServer {
    /// Bind `127.0.0.1:0` and serve a fresh app with default config.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the listener cannot be bound.
    pub async fn spawn() -> std::io::Result<Self> {
        Self::spawn_with(&ServerConfig::default()).await
    }

    /// Like [`spawn`](Self::spawn) with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the listener cannot be bound.
    pub async fn spawn_with(config: &ServerConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = AppState::new(config);

        let task = tokio::spawn({
            let state = state.clone();
            async move {
                let _ = ordercast_server::serve(listener, state, std::future::pending()).await;
            }
        });

        Ok(Self {
            addr,
            state,
            client: Client::new(),
            task,
        })
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    #[must_use]
    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    #[must_use]
    pub const fn client(&self) -> &Client {
        &self.client
    }

    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Clear every record and restart id sequences.
    pub fn reset(&self) {
        self.state.store().reset();
    }

    /// Open a WebSocket and consume the `CONNECTED` handshake.
    ///
    /// # Errors
    ///
    /// Returns an error if the upgrade fails or the first frame is not
    /// `CONNECTED`.
    pub async fn connect(&self) -> Result<Socket, String> {
        let (mut socket, _) = tokio_tungstenite::connect_async(self.ws_url())
            .await
            .map_err(|e| e.to_string())?;

        let hello = next_event(&mut socket)
            .await
            .ok_or("no handshake received")?;
        if hello["event"] != "CONNECTED" {
            return Err(format!("unexpected first frame: {hello}"));
        }
        Ok(socket)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Wait up to [`EVENT_TIMEOUT`] for the next text frame, decoded as JSON.
///
/// Returns `None` on timeout, close or a non-JSON frame.
pub async fn next_event(socket: &mut Socket) -> Option<Value> {
    next_event_within(socket, EVENT_TIMEOUT).await
}

/// Wait up to `limit` for the next text frame, decoded as JSON.
pub async fn next_event_within(socket: &mut Socket, limit: Duration) -> Option<Value> {
    let deadline = tokio::time::Instant::now() + limit;
    loop {
        let message = tokio::time::timeout_at(deadline, socket.next())
            .await
            .ok()??
            .ok()?;
        match message {
            Message::Text(text) => return serde_json::from_str(text.as_str()).ok(),
            Message::Close(_) => return None,
            _ => {}
        }
    }
}
