//! Processors of the ingestion pipeline.
//!
//! - `Poller` / `PollScheduler`: list the source, diff against the seen-set,
//!   hand new identifiers to the `Ingestor`
//! - `Ingestor`: fetches each new event and upserts it into the store
//! - `RecentEventsView`: reads the most recent events back out
//! - `snapshot_stream`: pushes the view to one subscriber on a cadence

pub mod broadcaster;
pub mod ingest;
pub mod poller;
pub mod recent_view;

pub use broadcaster::snapshot_stream;
pub use ingest::{IngestError, IngestReport, Ingestor};
pub use poller::{CycleOutcome, CycleTrigger, PollError, PollScheduler, Poller};
pub use recent_view::RecentEventsView;
