//! HTTP API.
//!
//! # Endpoints
//!
//! - `GET /`, `GET /home` – recent events (full documents) and last-update time
//! - `GET /events/{id}`   – stored documents for one event
//! - `GET /stream`        – server-sent events, one snapshot per cadence tick
//! - `GET /ws`            – the same snapshots over a WebSocket

use axum::{Router, http::StatusCode, response::IntoResponse, routing::get};
use killfeed_core::store::StoreError;

use crate::state::AppState;

mod events;
mod stream;

/// Build the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(events::home))
        .route("/home", get(events::home))
        .route("/events/{event_id}", get(events::get_event))
        .route("/stream", get(stream::sse_stream))
        .route("/ws", get(stream::ws_stream))
}

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

/// Errors that can occur in API handlers.
#[derive(Debug)]
enum ApiError {
    /// A store query failed.
    Store(StoreError),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Store(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiError::Store(e) => {
                tracing::error!(error = %e, "API store error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
        }
    }
}
