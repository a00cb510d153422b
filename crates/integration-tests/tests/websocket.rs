//! Live notifications over `/ws`.

use futures::SinkExt;
use ordercast_integration_tests::{QUIET_PERIOD, TestServer, next_event, next_event_within};
use reqwest::StatusCode;
use serde_json::{Value, json};
use tokio_tungstenite::tungstenite::Message;

async fn create_user(server: &TestServer, email: &str) -> Value {
    let resp = server
        .client()
        .post(server.url("/api/users"))
        .json(&json!({"name": "Alice", "email": email}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("Failed to parse body");
    body["data"].clone()
}

async fn put_status(server: &TestServer, order_id: u32, status: &str) -> StatusCode {
    server
        .client()
        .put(server.url(&format!("/api/orders/{order_id}/status")))
        .json(&json!({"status": status}))
        .send()
        .await
        .expect("Failed to send request")
        .status()
}

#[tokio::test]
async fn test_handshake_is_first_frame() {
    let server = TestServer::spawn().await.expect("Failed to start server");
    let (mut socket, _) = tokio_tungstenite::connect_async(server.ws_url())
        .await
        .expect("Failed to connect");

    let hello = next_event(&mut socket).await.expect("No handshake");
    assert_eq!(hello["event"], "CONNECTED");
    assert!(hello["data"]["message"].is_string());
    assert!(hello["timestamp"].is_string());
}

#[tokio::test]
async fn test_user_created_reaches_every_listener() {
    let server = TestServer::spawn().await.expect("Failed to start server");
    let mut first = server.connect().await.expect("Failed to connect");
    let mut second = server.connect().await.expect("Failed to connect");

    let user = create_user(&server, "a@b.com").await;

    for socket in [&mut first, &mut second] {
        let event = next_event(socket).await.expect("No event");
        assert_eq!(event["event"], "USER_CREATED");
        assert_eq!(event["data"], user);
        assert!(next_event_within(socket, QUIET_PERIOD).await.is_none());
    }
}

#[tokio::test]
async fn test_status_change_event_and_silence_on_failure() {
    let server = TestServer::spawn().await.expect("Failed to start server");
    create_user(&server, "a@b.com").await;
    server
        .client()
        .post(server.url("/api/orders"))
        .json(&json!({"userId": 1}))
        .send()
        .await
        .expect("Failed to send request");

    let mut socket = server.connect().await.expect("Failed to connect");

    assert_eq!(put_status(&server, 1, "SHIPPED").await, StatusCode::OK);
    let event = next_event(&mut socket).await.expect("No event");
    assert_eq!(event["event"], "ORDER_STATUS_CHANGED");
    assert_eq!(
        event["data"],
        json!({"orderId": 1, "userId": 1, "oldStatus": "PENDING", "newStatus": "SHIPPED"})
    );

    assert_eq!(put_status(&server, 1, "BOGUS").await, StatusCode::BAD_REQUEST);
    assert_eq!(put_status(&server, 99, "SHIPPED").await, StatusCode::NOT_FOUND);
    assert!(next_event_within(&mut socket, QUIET_PERIOD).await.is_none());
}

#[tokio::test]
async fn test_events_arrive_in_commit_order() {
    let server = TestServer::spawn().await.expect("Failed to start server");
    let mut socket = server.connect().await.expect("Failed to connect");

    for i in 1..=5 {
        create_user(&server, &format!("user{i}@b.com")).await;
    }

    for expected in 1..=5 {
        let event = next_event(&mut socket).await.expect("No event");
        assert_eq!(event["data"]["id"], expected);
    }
}

#[tokio::test]
async fn test_disconnected_listener_does_not_affect_others() {
    let server = TestServer::spawn().await.expect("Failed to start server");
    let mut leaving = server.connect().await.expect("Failed to connect");
    let mut staying = server.connect().await.expect("Failed to connect");

    leaving
        .send(Message::Close(None))
        .await
        .expect("Failed to close");
    drop(leaving);

    let user = create_user(&server, "a@b.com").await;
    let event = next_event(&mut staying).await.expect("No event");
    assert_eq!(event["data"]["id"], user["id"]);

    // The server prunes the closed listener; only `staying` remains.
    let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(5);
    while server.state().bus().listener_count() > 1 {
        assert!(tokio::time::Instant::now() < deadline, "listener never removed");
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn test_late_listener_gets_no_replay() {
    let server = TestServer::spawn().await.expect("Failed to start server");
    create_user(&server, "a@b.com").await;

    let mut socket = server.connect().await.expect("Failed to connect");
    assert!(next_event_within(&mut socket, QUIET_PERIOD).await.is_none());
}
