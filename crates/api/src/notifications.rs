//! Bridge from the in-process event bus to WebSocket subscribers.

use std::sync::Arc;

use axum::extract::ws::Message;
use serveiq_events::{ChannelMessage, NewFileEvent};
use tokio::sync::broadcast;

use crate::ws::WsManager;

/// Pushes every bus event to all connected subscribers as a text frame.
///
/// Delivery is best effort: subscribers that are not connected when an
/// event is published never see it.
pub struct NotificationForwarder {
    ws_manager: Arc<WsManager>,
}

impl NotificationForwarder {
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Run until the bus is dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<NewFileEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    self.forward(event).await;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification forwarder lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification forwarder shutting down");
                    break;
                }
            }
        }
    }

    /// Send one event to every subscriber, returning how many accepted it.
    pub async fn forward(&self, event: NewFileEvent) -> usize {
        let document_id = event.document_id.clone();
        let frame = ChannelMessage::from(event).to_json();
        let delivered = self.ws_manager.broadcast(Message::Text(frame.into())).await;

        if delivered == 0 {
            tracing::warn!(document_id = %document_id, "No subscribers connected, notification missed");
        } else {
            tracing::debug!(document_id = %document_id, delivered, "Notification pushed");
        }
        delivered
    }
}
