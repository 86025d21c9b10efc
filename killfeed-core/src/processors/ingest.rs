//! Ingestion worker.
//!
//! For each new identifier: fetch the full document from the source and
//! upsert it into the store. Every identifier succeeds or fails on its own;
//! one bad event never stops the rest of the batch.

use crate::entities::EventId;
use crate::source::{EventSource, SourceError};
use crate::store::{EventStore, StoreError};
use futures_util::StreamExt;
use futures_util::stream;
use kanau::processor::Processor;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur while ingesting a single event.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Detail could not be fetched or parsed
    #[error("detail fetch failed: {0}")]
    Source(#[from] SourceError),

    /// Document could not be written
    #[error("upsert failed: {0}")]
    Store(#[from] StoreError),
}

/// Request to ingest one event.
#[derive(Debug, Clone, Copy)]
pub struct IngestEvent {
    pub event_id: EventId,
}

/// Result of ingesting a batch of identifiers.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub ingested: Vec<EventId>,
    pub failed: Vec<(EventId, IngestError)>,
}

impl IngestReport {
    pub fn failed_ids(&self) -> impl Iterator<Item = EventId> + '_ {
        self.failed.iter().map(|(id, _)| *id)
    }
}

pub struct Ingestor {
    source: Arc<dyn EventSource>,
    store: Arc<dyn EventStore>,
    concurrency: usize,
}

impl Ingestor {
    /// Create an ingestor running at most `concurrency` ingestions at once.
    pub fn new(source: Arc<dyn EventSource>, store: Arc<dyn EventStore>, concurrency: usize) -> Self {
        Self {
            source,
            store,
            concurrency: concurrency.max(1),
        }
    }

    /// Ingest every identifier in `ids`, in no particular order.
    pub async fn ingest_batch(&self, ids: impl IntoIterator<Item = EventId>) -> IngestReport {
        let results: Vec<(EventId, Result<(), IngestError>)> = stream::iter(ids)
            .map(|event_id| async move { (event_id, self.process(IngestEvent { event_id }).await) })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut report = IngestReport::default();
        for (event_id, result) in results {
            match result {
                Ok(()) => {
                    info!(%event_id, "Ingested event");
                    report.ingested.push(event_id);
                }
                Err(e) => {
                    warn!(%event_id, error = %e, "Failed to ingest event");
                    report.failed.push((event_id, e));
                }
            }
        }
        report
    }
}

impl Processor<IngestEvent> for Ingestor {
    type Output = ();
    type Error = IngestError;

    async fn process(&self, event: IngestEvent) -> Result<(), IngestError> {
        let IngestEvent { event_id } = event;
        let mut document = self.source.event_detail(event_id).await?;

        if let Some(reported) = document.event_id().filter(|reported| *reported != event_id) {
            warn!(%event_id, %reported, "Detail carries a different EventId, keeping the requested one");
        }
        // Stored documents always carry the id as an integer.
        document.set_event_id(event_id);

        self.store.upsert(event_id, document).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryEventStore;
    use crate::testing::{FakeSource, FlakyStore, kill_event};
    use serde_json::json;

    #[tokio::test]
    async fn test_failed_detail_does_not_stop_the_batch() {
        let source = FakeSource::new();
        source
            .publish([
                kill_event(1, "2024-03-01T10:00:00Z", "A", "B"),
                kill_event(2, "2024-03-01T10:01:00Z", "C", "D"),
                kill_event(3, "2024-03-01T10:02:00Z", "E", "F"),
            ])
            .await;
        source.fail_detail(EventId(2)).await;
        let store = Arc::new(MemoryEventStore::new());
        let ingestor = Ingestor::new(source.clone(), store.clone(), 2);

        let report = ingestor
            .ingest_batch([EventId(1), EventId(2), EventId(3)])
            .await;

        let mut ingested = report.ingested.clone();
        ingested.sort();
        assert_eq!(ingested, vec![EventId(1), EventId(3)]);
        assert_eq!(report.failed_ids().collect::<Vec<_>>(), vec![EventId(2)]);
        assert!(matches!(report.failed[0].1, IngestError::Source(_)));
        assert_eq!(store.len().await, 2);
        assert!(store.find_by_id(EventId(2)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_upsert_is_reported_per_event() {
        let source = FakeSource::new();
        source
            .publish([
                kill_event(1, "2024-03-01T10:00:00Z", "A", "B"),
                kill_event(2, "2024-03-01T10:01:00Z", "C", "D"),
            ])
            .await;
        let store = FlakyStore::new();
        store.fail_upserts_for.lock().await.insert(EventId(1));
        let ingestor = Ingestor::new(source, store.clone(), 4);

        let report = ingestor.ingest_batch([EventId(1), EventId(2)]).await;

        assert_eq!(report.ingested, vec![EventId(2)]);
        assert!(matches!(report.failed[0], (EventId(1), IngestError::Store(_))));
    }

    #[tokio::test]
    async fn test_ingesting_twice_is_idempotent() {
        let source = FakeSource::new();
        let doc = kill_event(5, "2024-03-01T10:00:00Z", "A", "B");
        source.publish([doc.clone()]).await;
        let store = Arc::new(MemoryEventStore::new());
        let ingestor = Ingestor::new(source, store.clone(), 1);

        ingestor.process(IngestEvent { event_id: EventId(5) }).await.unwrap();
        let once = store.find_by_id(EventId(5)).await.unwrap();
        ingestor.process(IngestEvent { event_id: EventId(5) }).await.unwrap();
        let twice = store.find_by_id(EventId(5)).await.unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(once, twice);
        assert_eq!(twice, vec![doc]);
    }

    #[tokio::test]
    async fn test_string_event_id_is_stored_as_integer() {
        let source = FakeSource::new();
        let doc = crate::entities::EventDocument::from_value(json!({
            "EventId": "77",
            "TimeStamp": "2024-03-01T10:00:00Z",
        }))
        .unwrap();
        source.publish([doc]).await;
        let store = Arc::new(MemoryEventStore::new());
        let ingestor = Ingestor::new(source, store.clone(), 1);

        ingestor.process(IngestEvent { event_id: EventId(77) }).await.unwrap();

        let stored = store.find_by_id(EventId(77)).await.unwrap();
        assert_eq!(stored[0].as_map()["EventId"], json!(77));
    }
}
