//! Messages of the live event stream.
//!
//! Both `GET /stream` (server-sent events, one `data:` line per message)
//! and `GET /ws` (one text frame per message) carry [`StreamMessage`]
//! serialized as JSON:
//!
//! ```json
//! {"events":[{"EventId":101,"TimeStamp":"2024-03-01 12:00:00","KillerName":"Alice","VictimName":"Bob"}],"last_update":"2024-03-01 12:00:05"}
//! ```
//!
//! A new message is pushed on a fixed cadence for as long as the connection
//! stays open. `last_update` is `null` until the server has ingested at
//! least one event.

use serde::{Deserialize, Serialize};

use super::events::EventSummary;

/// One snapshot of the recent-events view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamMessage {
    /// Most recent events, newest first.
    pub events: Vec<EventSummary>,
    /// When the server last ingested a new event (`YYYY-MM-DD HH:MM:SS`, UTC).
    pub last_update: Option<String>,
}
