//! Per-subscriber snapshot streams.
//!
//! Every subscriber gets its own [`snapshot_stream`]: an endless, lazy
//! sequence of [`StreamMessage`]s, one per cadence tick, read fresh from
//! the store each time. Nothing is shared between subscribers except the
//! store and the last-update tracker. Dropping the stream (the connection
//! went away) stops its ticker.

use crate::processors::recent_view::RecentEventsView;
use futures_util::Stream;
use futures_util::stream;
use killfeed_sdk::objects::StreamMessage;
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::warn;

struct Subscription {
    view: RecentEventsView,
    ticker: Interval,
}

/// Snapshot messages every `cadence`, starting immediately.
///
/// A tick whose store read fails produces no message; the stream carries
/// on with the next tick. The stream never ends on its own.
pub fn snapshot_stream(
    view: RecentEventsView,
    cadence: Duration,
) -> impl Stream<Item = StreamMessage> + Send + 'static {
    let mut ticker = tokio::time::interval(cadence);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    stream::unfold(Subscription { view, ticker }, |mut sub| async move {
        loop {
            sub.ticker.tick().await;
            match sub.view.snapshot().await {
                Ok(msg) => return Some((msg, sub)),
                Err(e) => warn!(error = %e, "Failed to read recent events for subscriber"),
            }
        }
    })
}
