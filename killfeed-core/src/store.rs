//! Durable event storage.
//!
//! The pipeline only needs three operations from storage: upsert by id,
//! the most recent N by `TimeStamp`, and lookup by id. [`EventStore`]
//! captures exactly that, with a PostgreSQL implementation for production
//! and an in-memory one for tests and local runs.

use crate::entities::events::{GetEventsById, GetRecentEvents, UpsertEvent};
use crate::entities::{EventDocument, EventId};
use crate::framework::DatabaseProcessor;
use async_trait::async_trait;
use kanau::processor::Processor;
use sqlx::PgPool;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors that can occur while talking to the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Storage contract consumed by the ingestion worker and the recent-events view.
///
/// Implementations must tolerate concurrent upserts and reads without any
/// locking by the caller.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Insert the document, or merge it into the stored one with the same id.
    async fn upsert(&self, id: EventId, document: EventDocument) -> Result<(), StoreError>;

    /// Up to `limit` documents ordered by `TimeStamp` descending.
    async fn find_recent(&self, limit: usize) -> Result<Vec<EventDocument>, StoreError>;

    /// Every document stored under `id`.
    async fn find_by_id(&self, id: EventId) -> Result<Vec<EventDocument>, StoreError>;
}

/// PostgreSQL-backed store (table `events`, see `migrations/`).
#[derive(Debug, Clone)]
pub struct PgEventStore {
    db: DatabaseProcessor,
}

impl PgEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            db: DatabaseProcessor { pool },
        }
    }
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn upsert(&self, id: EventId, document: EventDocument) -> Result<(), StoreError> {
        self.db
            .process(UpsertEvent {
                event_id: id,
                document,
            })
            .await?;
        Ok(())
    }

    async fn find_recent(&self, limit: usize) -> Result<Vec<EventDocument>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        Ok(self.db.process(GetRecentEvents { limit }).await?)
    }

    async fn find_by_id(&self, id: EventId) -> Result<Vec<EventDocument>, StoreError> {
        Ok(self.db.process(GetEventsById { event_id: id }).await?)
    }
}

/// In-memory store with the same merge and ordering rules as [`PgEventStore`].
#[derive(Debug, Default)]
pub struct MemoryEventStore {
    events: RwLock<BTreeMap<EventId, EventDocument>>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents.
    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}

/// Newest `TimeStamp` first; missing or non-string timestamps last; ties broken
/// by id, newest first. Matches the `ORDER BY` of [`GetRecentEvents`].
fn recency_order(a: &EventDocument, b: &EventDocument) -> Ordering {
    match (a.time_stamp_str(), b.time_stamp_str()) {
        (Some(x), Some(y)) => y.cmp(x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| b.event_id().cmp(&a.event_id()))
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn upsert(&self, id: EventId, document: EventDocument) -> Result<(), StoreError> {
        let mut events = self.events.write().await;
        events.entry(id).or_default().merge(document);
        Ok(())
    }

    async fn find_recent(&self, limit: usize) -> Result<Vec<EventDocument>, StoreError> {
        let events = self.events.read().await;
        let mut docs: Vec<EventDocument> = events.values().cloned().collect();
        docs.sort_by(recency_order);
        docs.truncate(limit);
        Ok(docs)
    }

    async fn find_by_id(&self, id: EventId) -> Result<Vec<EventDocument>, StoreError> {
        let events = self.events.read().await;
        Ok(events.get(&id).cloned().into_iter().collect())
    }
}
