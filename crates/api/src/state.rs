use std::sync::Arc;

use serveiq_db::store::RecordStore;
use serveiq_events::EventBus;

use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Record store the handlers read from and write to.
    pub store: Arc<dyn RecordStore>,
    /// Connected notification subscribers.
    pub ws_manager: Arc<WsManager>,
    /// Bus that `new_file` events are published on after a record is stored.
    pub event_bus: Arc<EventBus>,
}
