//! Application state shared across all request handlers.

use killfeed_core::config::StreamConfig;
use killfeed_core::processors::RecentEventsView;
use killfeed_core::store::EventStore;
use killfeed_core::tracking::LastUpdate;
use std::sync::Arc;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
/// Handlers only read; the poll scheduler is the sole writer of the store
/// and of the last-update time.
#[derive(Clone)]
pub struct AppState {
    /// Recent-events projection over the store.
    pub view: RecentEventsView,
    /// Stream cadence for `/stream` and `/ws` subscribers.
    pub stream: StreamConfig,
}

impl AppState {
    /// Create a new AppState reading from `store` and `last_update`.
    pub fn new(store: Arc<dyn EventStore>, last_update: LastUpdate, stream: StreamConfig) -> Self {
        Self {
            view: RecentEventsView::new(store, last_update),
            stream,
        }
    }
}
