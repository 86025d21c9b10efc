//! Client side of the upstream kill feed.
//!
//! The pipeline needs two calls from the source: the identifiers currently
//! listed, and the full document for one identifier. [`EventSource`] is that
//! seam; [`GameInfoClient`] implements it against the Albion Online
//! game-info API.

use crate::entities::{EventDocument, EventId};
use async_trait::async_trait;
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// Errors that can occur while querying the source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// API request error
    #[error("API request error: {0}")]
    Request(#[from] reqwest::Error),

    /// API response parsing error
    #[error("API response parsing error: {0}")]
    Parse(String),

    /// Rate limit exceeded
    #[error("rate limit exceeded, retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    /// API returned a non-success status
    #[error("API error: status {status}")]
    ApiError { status: u16 },
}

/// Upstream event feed.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Identifiers of the events the source currently lists.
    async fn list_event_ids(&self) -> Result<HashSet<EventId>, SourceError>;

    /// Full document for one event.
    async fn event_detail(&self, id: EventId) -> Result<EventDocument, SourceError>;
}

/// [`EventSource`] backed by the game-info REST API.
#[derive(Debug, Clone)]
pub struct GameInfoClient {
    base_url: Url,
    http_client: reqwest::Client,
}

impl GameInfoClient {
    /// Default regional endpoint.
    pub const DEFAULT_BASE_URL: &str = "https://gameinfo-sgp.albiononline.com/api/gameinfo";

    const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

    /// Create a client for `base_url` (e.g. [`Self::DEFAULT_BASE_URL`]).
    ///
    /// Every request is bounded by `timeout`.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, SourceError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("killfeed/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            base_url,
            http_client,
        })
    }

    fn events_url(&self) -> String {
        format!("{}/events", self.base_url.as_str().trim_end_matches('/'))
    }

    fn event_url(&self, id: EventId) -> String {
        format!("{}/{}", self.events_url(), id)
    }

    async fn get_json(&self, url: &str) -> Result<serde_json::Value, SourceError> {
        let response = self.http_client.get(url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(Self::DEFAULT_RETRY_AFTER_SECS);
            return Err(SourceError::RateLimited { retry_after_secs });
        }
        if !status.is_success() {
            return Err(SourceError::ApiError {
                status: status.as_u16(),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl EventSource for GameInfoClient {
    async fn list_event_ids(&self) -> Result<HashSet<EventId>, SourceError> {
        let body = self.get_json(&self.events_url()).await?;
        let ids = parse_listing(body)?;
        debug!(listed = ids.len(), "Fetched event listing");
        Ok(ids)
    }

    async fn event_detail(&self, id: EventId) -> Result<EventDocument, SourceError> {
        let body = self.get_json(&self.event_url(id)).await?;
        EventDocument::from_value(body)
            .ok_or_else(|| SourceError::Parse(format!("event {id} detail is not an object")))
    }
}

/// Extract identifiers from a listing response (a JSON array of events).
///
/// Entries without a usable `EventId` are skipped.
fn parse_listing(body: serde_json::Value) -> Result<HashSet<EventId>, SourceError> {
    let serde_json::Value::Array(items) = body else {
        return Err(SourceError::Parse("event listing is not an array".to_string()));
    };

    let mut ids = HashSet::with_capacity(items.len());
    for item in &items {
        match item.get(EventDocument::EVENT_ID).and_then(EventId::from_json) {
            Some(id) => {
                ids.insert(id);
            }
            None => warn!(entry = %item, "Listing entry without a usable EventId, skipping"),
        }
    }
    Ok(ids)
}
