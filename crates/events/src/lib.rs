//! Notification channel between the ingest server and the processing worker.
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`NewFileEvent`] -- "a new record exists" notification.
//! - [`ChannelMessage`] -- the JSON envelope pushed over the WebSocket link.

pub mod bus;
pub mod message;

pub use bus::EventBus;
pub use message::{parse_message, ChannelMessage, NewFileEvent, NEW_FILE};
