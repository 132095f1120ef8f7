//! Tests for `WsManager` and the bus-to-subscriber forwarder.
//!
//! These exercise the connection registry directly, without performing any
//! HTTP upgrades.

use std::sync::Arc;

use axum::extract::ws::Message;
use serveiq_api::notifications::NotificationForwarder;
use serveiq_api::ws::WsManager;
use serveiq_events::{parse_message, ChannelMessage, EventBus, NewFileEvent};

// ---------------------------------------------------------------------------
// Test: add/remove maintain the connection count
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_and_remove_track_connection_count() {
    let manager = WsManager::new();
    assert_eq!(manager.connection_count().await, 0);

    let _rx1 = manager.add("conn-1".to_string()).await;
    let _rx2 = manager.add("conn-2".to_string()).await;
    assert_eq!(manager.connection_count().await, 2);

    manager.remove("conn-1").await;
    manager.remove("nonexistent").await;
    assert_eq!(manager.connection_count().await, 1);
}

// ---------------------------------------------------------------------------
// Test: broadcast reaches every live connection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn broadcast_delivers_to_all_connections() {
    let manager = WsManager::new();
    let mut rx1 = manager.add("conn-1".to_string()).await;
    let mut rx2 = manager.add("conn-2".to_string()).await;

    let delivered = manager.broadcast(Message::Text("hello".into())).await;
    assert_eq!(delivered, 2);

    for rx in [&mut rx1, &mut rx2] {
        match rx.recv().await.unwrap() {
            Message::Text(text) => assert_eq!(text.as_str(), "hello"),
            other => panic!("Expected Text, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn broadcast_skips_closed_receivers() {
    let manager = WsManager::new();
    let rx1 = manager.add("conn-1".to_string()).await;
    let mut rx2 = manager.add("conn-2".to_string()).await;
    drop(rx1);

    let delivered = manager.broadcast(Message::Text("still here".into())).await;
    assert_eq!(delivered, 1);
    assert!(rx2.recv().await.is_some());
}

// ---------------------------------------------------------------------------
// Test: shutdown_all sends Close and clears the registry
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shutdown_all_sends_close_and_clears() {
    let manager = WsManager::new();
    let mut rx = manager.add("conn-1".to_string()).await;

    manager.shutdown_all().await;

    assert_eq!(manager.connection_count().await, 0);
    assert!(matches!(rx.recv().await.unwrap(), Message::Close(None)));
}

#[tokio::test]
async fn ping_all_sends_ping() {
    let manager = WsManager::new();
    let mut rx = manager.add("conn-1".to_string()).await;

    manager.ping_all().await;

    assert!(matches!(rx.recv().await.unwrap(), Message::Ping(_)));
}

// ---------------------------------------------------------------------------
// Test: forwarder pushes new_file frames
// ---------------------------------------------------------------------------

#[tokio::test]
async fn forwarder_pushes_new_file_frame() {
    let manager = Arc::new(WsManager::new());
    let mut rx = manager.add("worker".to_string()).await;
    let forwarder = NotificationForwarder::new(Arc::clone(&manager));

    let id = uuid::Uuid::new_v4();
    let delivered = forwarder.forward(NewFileEvent::new("Gate", id)).await;
    assert_eq!(delivered, 1);

    let Message::Text(text) = rx.recv().await.unwrap() else {
        panic!("Expected a text frame");
    };
    let json: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
    assert_eq!(json["type"], "new_file");
    assert_eq!(json["data"]["document_id"], id.to_string());
    assert_eq!(json["data"]["location"], "Gate");
}

#[tokio::test]
async fn forwarder_without_subscribers_drops_event() {
    let manager = Arc::new(WsManager::new());
    let forwarder = NotificationForwarder::new(manager);

    let delivered = forwarder
        .forward(NewFileEvent::new("Gate", uuid::Uuid::new_v4()))
        .await;
    assert_eq!(delivered, 0);
}

#[tokio::test]
async fn forwarder_run_relays_bus_events_until_closed() {
    let manager = Arc::new(WsManager::new());
    let mut rx = manager.add("worker".to_string()).await;
    let bus = EventBus::default();
    let handle = tokio::spawn(NotificationForwarder::new(Arc::clone(&manager)).run(bus.subscribe()));

    let event = NewFileEvent::new("Dock", uuid::Uuid::new_v4());
    bus.publish(event.clone());

    let Message::Text(text) = rx.recv().await.unwrap() else {
        panic!("Expected a text frame");
    };
    assert_eq!(parse_message(text.as_str()).unwrap(), ChannelMessage::NewFile(event));

    drop(bus);
    handle.await.unwrap();
}
