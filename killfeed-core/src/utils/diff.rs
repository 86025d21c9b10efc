use crate::entities::EventId;
use std::collections::HashSet;

/// Returns the identifiers in `current` that are not in `seen`.
pub fn new_event_ids(current: &HashSet<EventId>, seen: &HashSet<EventId>) -> HashSet<EventId> {
    current.difference(seen).copied().collect()
}

/// Identifiers to ingest this cycle: the new ones, plus those whose
/// ingestion failed last cycle and that are still listed.
pub fn pending_event_ids(
    current: &HashSet<EventId>,
    seen: &HashSet<EventId>,
    retry: &HashSet<EventId>,
) -> HashSet<EventId> {
    let mut pending = new_event_ids(current, seen);
    pending.extend(retry.intersection(current).copied());
    pending
}
