use serde::{Deserialize, Serialize};

/// Compact projection of one kill event, as pushed to stream subscribers.
///
/// Keys keep the upstream PascalCase naming so that clients written against
/// the game-info API can read both shapes with the same field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EventSummary {
    pub event_id: i64,
    /// `YYYY-MM-DD HH:MM:SS`, or the raw upstream value if it could not be parsed.
    pub time_stamp: String,
    pub killer_name: String,
    pub victim_name: String,
}

/// Response body of `GET /` and `GET /home`.
///
/// `events` are full stored documents, newest first, with `TimeStamp`
/// normalized the same way as [`EventSummary::time_stamp`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeResponse {
    pub events: Vec<serde_json::Value>,
    pub last_update: Option<String>,
}
