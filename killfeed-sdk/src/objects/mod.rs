//! Objects exchanged between the killfeed server and its clients.

pub mod events;
pub mod stream;

pub use events::{EventSummary, HomeResponse};
pub use stream::StreamMessage;

use serde::{Deserialize, Serialize};

/// Response body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
