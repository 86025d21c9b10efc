//! Fakes shared by the processor tests.

use crate::entities::{EventDocument, EventId};
use crate::source::{EventSource, SourceError};
use crate::store::{EventStore, MemoryEventStore, StoreError};
use async_trait::async_trait;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

pub fn kill_event(id: i64, time_stamp: &str, killer: &str, victim: &str) -> EventDocument {
    EventDocument::from_value(json!({
        "EventId": id,
        "TimeStamp": time_stamp,
        "Killer": {"Name": killer, "AverageItemPower": 1200.5},
        "Victim": {"Name": victim},
        "TotalVictimKillFame": 4200,
    }))
    .unwrap()
}

/// Scripted [`EventSource`].
///
/// Listings return the configured ids (or fail while `fail_listing` is
/// set); details come from `details` and fail for ids in `failing`.
#[derive(Default)]
pub struct FakeSource {
    pub listing: Mutex<HashSet<EventId>>,
    pub details: Mutex<HashMap<EventId, EventDocument>>,
    pub failing: Mutex<HashSet<EventId>>,
    pub fail_listing: AtomicBool,
    pub list_calls: AtomicUsize,
    pub detail_calls: AtomicUsize,
    pub list_delay: Mutex<Option<Duration>>,
}

impl FakeSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// List `docs` and serve their details.
    pub async fn publish(&self, docs: impl IntoIterator<Item = EventDocument>) {
        let mut listing = self.listing.lock().await;
        let mut details = self.details.lock().await;
        listing.clear();
        for doc in docs {
            let id = doc.event_id().unwrap();
            listing.insert(id);
            details.insert(id, doc);
        }
    }

    pub async fn fail_detail(&self, id: EventId) {
        self.failing.lock().await.insert(id);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventSource for FakeSource {
    async fn list_event_ids(&self) -> Result<HashSet<EventId>, SourceError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.list_delay.lock().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(SourceError::ApiError { status: 503 });
        }
        Ok(self.listing.lock().await.clone())
    }

    async fn event_detail(&self, id: EventId) -> Result<EventDocument, SourceError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().await.contains(&id) {
            return Err(SourceError::Parse(format!("scripted failure for {id}")));
        }
        self.details
            .lock()
            .await
            .get(&id)
            .cloned()
            .ok_or(SourceError::ApiError { status: 404 })
    }
}

/// [`MemoryEventStore`] whose operations can be made to fail.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryEventStore,
    pub fail_reads: AtomicBool,
    pub fail_upserts_for: Mutex<HashSet<EventId>>,
}

impl FlakyStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl EventStore for FlakyStore {
    async fn upsert(&self, id: EventId, document: EventDocument) -> Result<(), StoreError> {
        if self.fail_upserts_for.lock().await.contains(&id) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        self.inner.upsert(id, document).await
    }

    async fn find_recent(&self, limit: usize) -> Result<Vec<EventDocument>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolClosed));
        }
        self.inner.find_recent(limit).await
    }

    async fn find_by_id(&self, id: EventId) -> Result<Vec<EventDocument>, StoreError> {
        self.inner.find_by_id(id).await
    }
}
