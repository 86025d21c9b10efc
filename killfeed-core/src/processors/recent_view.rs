//! Read-only projections over the event store.

use crate::config::RECENT_EVENTS_LIMIT;
use crate::entities::{EventDocument, EventId};
use crate::store::{EventStore, StoreError};
use crate::tracking::LastUpdate;
use crate::utils::timestamp::{format_last_update, normalize_timestamp_value};
use killfeed_sdk::objects::{EventSummary, HomeResponse, StreamMessage};
use std::sync::Arc;
use tracing::warn;

/// Project a stored document to its compact stream form.
///
/// Missing killer or victim names become empty strings. Returns `None` only
/// when the document has no usable `EventId`.
pub fn summarize(document: &EventDocument) -> Option<EventSummary> {
    let event_id = document.event_id()?;
    Some(EventSummary {
        event_id: event_id.0,
        time_stamp: normalize_timestamp_value(document.time_stamp()),
        killer_name: document.killer_name().unwrap_or_default().to_string(),
        victim_name: document.victim_name().unwrap_or_default().to_string(),
    })
}

/// The most recent events plus ingestion freshness.
///
/// Cheap to clone; every clone reads the same store and tracker.
#[derive(Clone)]
pub struct RecentEventsView {
    store: Arc<dyn EventStore>,
    last_update: LastUpdate,
    limit: usize,
}

impl RecentEventsView {
    pub fn new(store: Arc<dyn EventStore>, last_update: LastUpdate) -> Self {
        Self {
            store,
            last_update,
            limit: RECENT_EVENTS_LIMIT,
        }
    }

    /// Display form of the last-update time, `None` before the first ingestion.
    pub fn last_update(&self) -> Option<String> {
        self.last_update.get().map(format_last_update)
    }

    /// Compact records of the most recent events, newest first.
    pub async fn summaries(&self) -> Result<Vec<EventSummary>, StoreError> {
        let documents = self.store.find_recent(self.limit).await?;
        Ok(documents
            .iter()
            .filter_map(|document| {
                let summary = summarize(document);
                if summary.is_none() {
                    warn!(document = ?document.as_map().keys().collect::<Vec<_>>(), "Stored event without EventId, skipping");
                }
                summary
            })
            .collect())
    }

    /// One message for stream subscribers.
    pub async fn snapshot(&self) -> Result<StreamMessage, StoreError> {
        Ok(StreamMessage {
            events: self.summaries().await?,
            last_update: self.last_update(),
        })
    }

    /// Full documents of the most recent events with display timestamps.
    pub async fn home(&self) -> Result<HomeResponse, StoreError> {
        let documents = self.store.find_recent(self.limit).await?;
        let events = documents
            .into_iter()
            .map(|mut document| {
                let time_stamp = normalize_timestamp_value(document.time_stamp());
                document.insert(EventDocument::TIME_STAMP, time_stamp.into());
                document.into_value()
            })
            .collect();
        Ok(HomeResponse {
            events,
            last_update: self.last_update(),
        })
    }

    /// Stored documents for one event, verbatim.
    pub async fn event(&self, id: EventId) -> Result<Vec<EventDocument>, StoreError> {
        self.store.find_by_id(id).await
    }
}
