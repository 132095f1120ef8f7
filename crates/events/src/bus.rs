//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`NewFileEvent`]s. It is
//! designed to be shared via `Arc<EventBus>` across the application.
//! Subscribers only see events published after they subscribed.

use tokio::sync::broadcast;

use crate::message::NewFileEvent;

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// # Usage
///
/// ```rust
/// use serveiq_events::{EventBus, NewFileEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(NewFileEvent::new("Gate", uuid_like()));
/// # fn uuid_like() -> serveiq_core::types::RecordId { Default::default() }
/// ```
pub struct EventBus {
    sender: broadcast::Sender<NewFileEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Returns the number of subscribers that received it. With no
    /// subscribers the event is dropped.
    pub fn publish(&self, event: NewFileEvent) -> usize {
        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(event)) => {
                tracing::debug!(
                    document_id = %event.document_id,
                    "No subscribers, notification dropped"
                );
                0
            }
        }
    }

    /// Subscribe to events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<NewFileEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
