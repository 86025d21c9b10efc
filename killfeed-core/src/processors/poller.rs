//! Poll cycle and its scheduler.
//!
//! A cycle is `list -> diff -> ingest`:
//! - The source listing is diffed against the identifiers seen by the
//!   previous successful cycle.
//! - New identifiers go through the [`Ingestor`].
//! - The seen-set is then replaced by the listing, and the last-update time
//!   is bumped if anything was ingested.
//!
//! A failed listing aborts the cycle before any state is touched.
//!
//! The [`PollScheduler`] runs cycles on a fixed base interval. When a
//! base-interval cycle finds no newly listed identifier (re-attempts of
//! earlier failures do not count), it arms a single short-delay
//! re-check so that the start of a burst is picked up quickly; the re-check
//! never arms another one.

use crate::config::PollerConfig;
use crate::entities::EventId;
use crate::processors::ingest::Ingestor;
use crate::source::{EventSource, SourceError};
use crate::store::EventStore;
use crate::tracking::{LastUpdate, SeenSet};
use crate::utils::diff::{new_event_ids, pending_event_ids};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use time::OffsetDateTime;
use tokio::sync::{Mutex, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info};

/// Errors that abort a whole poll cycle.
#[derive(Debug, Error)]
pub enum PollError {
    /// The source listing could not be fetched
    #[error("listing failed: {0}")]
    Listing(#[from] SourceError),
}

/// What started a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleTrigger {
    /// The periodic base timer.
    Interval,
    /// The one-shot re-check after an empty cycle.
    Retry,
}

/// How a cycle that did not fail ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// At least one identifier was pending ingestion.
    ///
    /// `new` counts identifiers not in the previous listing; the rest of
    /// `pending` are re-attempts of earlier failures.
    Ingested {
        listed: usize,
        new: usize,
        pending: usize,
        ingested: usize,
        failed: usize,
    },
    /// Nothing new in the listing.
    NoNewEvents { listed: usize },
    /// Another cycle was still running; nothing was done.
    Skipped,
}

/// Whether a finished cycle should arm the one-shot re-check.
///
/// Only base-interval cycles that saw no newly listed identifier arm it.
pub fn should_arm_retry(trigger: CycleTrigger, outcome: &Result<CycleOutcome, PollError>) -> bool {
    trigger == CycleTrigger::Interval
        && matches!(
            outcome,
            Ok(CycleOutcome::NoNewEvents { .. } | CycleOutcome::Ingested { new: 0, .. })
        )
}

/// Running flag ensuring at most one cycle is in flight.
#[derive(Debug, Default)]
struct CycleGuard {
    running: AtomicBool,
}

struct CycleToken<'a> {
    guard: &'a CycleGuard,
}

impl CycleGuard {
    fn try_enter(&self) -> Option<CycleToken<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| CycleToken { guard: self })
    }
}

impl Drop for CycleToken<'_> {
    fn drop(&mut self) {
        self.guard.running.store(false, Ordering::Release);
    }
}

/// Runs single poll cycles against shared pipeline state.
pub struct Poller {
    source: Arc<dyn EventSource>,
    ingestor: Ingestor,
    seen: SeenSet,
    last_update: LastUpdate,
    /// Listed identifiers whose ingestion failed in the last cycle.
    retry: Mutex<HashSet<EventId>>,
    guard: CycleGuard,
}

impl Poller {
    pub fn new(
        source: Arc<dyn EventSource>,
        store: Arc<dyn EventStore>,
        seen: SeenSet,
        last_update: LastUpdate,
        ingest_concurrency: usize,
    ) -> Self {
        Self {
            ingestor: Ingestor::new(source.clone(), store, ingest_concurrency),
            source,
            seen,
            last_update,
            retry: Mutex::new(HashSet::new()),
            guard: CycleGuard::default(),
        }
    }

    pub fn seen(&self) -> &SeenSet {
        &self.seen
    }

    pub fn last_update(&self) -> &LastUpdate {
        &self.last_update
    }

    /// Run one cycle, or return [`CycleOutcome::Skipped`] if one is already running.
    pub async fn poll_once(&self) -> Result<CycleOutcome, PollError> {
        let Some(_token) = self.guard.try_enter() else {
            debug!("Poll cycle already in flight, skipping");
            return Ok(CycleOutcome::Skipped);
        };

        let current = self.source.list_event_ids().await?;
        let listed = current.len();

        let seen = self.seen.snapshot().await;
        let mut retry = self.retry.lock().await;
        let new = new_event_ids(&current, &seen).len();
        let pending = pending_event_ids(&current, &seen, &retry);

        if pending.is_empty() {
            retry.clear();
            self.seen.replace(current).await;
            return Ok(CycleOutcome::NoNewEvents { listed });
        }

        let pending_count = pending.len();
        let report = self.ingestor.ingest_batch(pending).await;

        *retry = report.failed_ids().collect();
        self.seen.replace(current).await;
        if !report.ingested.is_empty() {
            self.last_update.mark(OffsetDateTime::now_utc());
        }

        Ok(CycleOutcome::Ingested {
            listed,
            new,
            pending: pending_count,
            ingested: report.ingested.len(),
            failed: report.failed.len(),
        })
    }
}

/// Drives [`Poller`] cycles on the base interval plus one-shot re-checks.
pub struct PollScheduler {
    poller: Arc<Poller>,
    config: PollerConfig,
}

impl PollScheduler {
    pub fn new(poller: Arc<Poller>, config: PollerConfig) -> Self {
        Self { poller, config }
    }

    /// Run until shutdown is signaled.
    ///
    /// The first base tick fires immediately. Cycles run one after the other
    /// on this task; base ticks missed while a cycle was running are
    /// skipped. An in-flight cycle always finishes before shutdown.
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>) {
        let mut base = tokio::time::interval(self.config.base_interval);
        base.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let retry = tokio::time::sleep(self.config.retry_delay);
        tokio::pin!(retry);
        let mut retry_armed = false;

        info!(
            base_interval = ?self.config.base_interval,
            retry_delay = ?self.config.retry_delay,
            "PollScheduler started"
        );

        loop {
            let trigger = tokio::select! {
                biased;

                // Shutdown has highest priority.
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("PollScheduler received shutdown signal");
                        break;
                    }
                    continue;
                }

                _ = base.tick() => CycleTrigger::Interval,

                () = &mut retry, if retry_armed => CycleTrigger::Retry,
            };

            // A base cycle supersedes any pending re-check.
            retry_armed = false;

            let outcome = self.poller.poll_once().await;
            log_outcome(trigger, &outcome);

            if should_arm_retry(trigger, &outcome) {
                retry.as_mut().reset(Instant::now() + self.config.retry_delay);
                retry_armed = true;
                debug!(delay = ?self.config.retry_delay, "Armed one-shot re-check");
            }
        }

        info!("PollScheduler shutdown complete");
    }
}

fn log_outcome(trigger: CycleTrigger, outcome: &Result<CycleOutcome, PollError>) {
    match outcome {
        Ok(CycleOutcome::Ingested {
            listed,
            new,
            pending,
            ingested,
            failed,
        }) => info!(
            ?trigger,
            listed, new, pending, ingested, failed, "{ingested} events ingested"
        ),
        Ok(CycleOutcome::NoNewEvents { listed }) => {
            info!(?trigger, listed, "No new events")
        }
        Ok(CycleOutcome::Skipped) => debug!(?trigger, "Cycle skipped"),
        Err(e) => error!(?trigger, error = %e, "Poll cycle failed"),
    }
}
