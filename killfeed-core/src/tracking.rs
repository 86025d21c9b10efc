//! Process-wide pipeline state.
//!
//! Both trackers have a single writer (the poll cycle) and many readers
//! (HTTP handlers, stream subscribers). Readers only ever get snapshots.

use crate::entities::EventId;
use std::collections::HashSet;
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::{RwLock, watch};

/// Identifiers listed by the most recent successful poll cycle.
///
/// Replaced wholesale at the end of a cycle, never merged. Starts empty, so
/// the first cycle after a restart treats every listed event as new.
#[derive(Debug, Clone, Default)]
pub struct SeenSet {
    inner: Arc<RwLock<Arc<HashSet<EventId>>>>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current set. Later replacements do not affect the returned snapshot.
    pub async fn snapshot(&self) -> Arc<HashSet<EventId>> {
        Arc::clone(&*self.inner.read().await)
    }

    pub async fn replace(&self, current: HashSet<EventId>) {
        *self.inner.write().await = Arc::new(current);
    }
}

/// When a poll cycle last ingested at least one new event.
#[derive(Debug, Clone)]
pub struct LastUpdate {
    tx: Arc<watch::Sender<Option<OffsetDateTime>>>,
}

impl LastUpdate {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// `None` until the first successful ingestion.
    pub fn get(&self) -> Option<OffsetDateTime> {
        *self.tx.borrow()
    }

    pub fn mark(&self, at: OffsetDateTime) {
        self.tx.send_replace(Some(at));
    }
}

impl Default for LastUpdate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[tokio::test]
    async fn test_seen_set_snapshot_is_isolated_from_replacement() {
        let seen = SeenSet::new();
        seen.replace(HashSet::from([EventId(1), EventId(2)])).await;
        let before = seen.snapshot().await;

        seen.replace(HashSet::from([EventId(3)])).await;

        assert_eq!(*before, HashSet::from([EventId(1), EventId(2)]));
        assert_eq!(*seen.snapshot().await, HashSet::from([EventId(3)]));
    }

    #[tokio::test]
    async fn test_last_update_is_shared_between_clones() {
        let last_update = LastUpdate::new();
        let reader = last_update.clone();
        assert_eq!(reader.get(), None);

        let at = datetime!(2024-03-01 12:00:00 UTC);
        last_update.mark(at);

        assert_eq!(reader.get(), Some(at));
    }
}
