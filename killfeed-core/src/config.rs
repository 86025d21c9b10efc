//! Runtime configuration for the pipeline processors.
//!
//! These are the validated values; loading them from file and CLI is done
//! by the server crate.

use std::time::Duration;

/// Number of events shown by the recent-events view.
pub const RECENT_EVENTS_LIMIT: usize = 50;

/// Poll scheduler settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    /// Period of the base timer.
    pub base_interval: Duration,
    /// Delay of the one-shot re-check armed after an empty cycle.
    pub retry_delay: Duration,
    /// Maximum number of detail fetches in flight during one cycle.
    pub ingest_concurrency: usize,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            base_interval: Duration::from_secs(25),
            retry_delay: Duration::from_secs(5),
            ingest_concurrency: 4,
        }
    }
}

/// Stream broadcaster settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    /// Time between two snapshots pushed to one subscriber.
    pub cadence: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            cadence: Duration::from_secs(15),
        }
    }
}
