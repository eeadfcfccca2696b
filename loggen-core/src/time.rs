//! Timing capabilities driving the pacing loop.

use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior};

/// A periodic tick source that also acts as the clock of a run.
///
/// The pacer waits on [`tick`](Self::tick) and reads [`now`](Self::now) after every tick to compute
/// how many records are due. Readings are offsets from an arbitrary origin. They are expected to
/// be monotonic, but the pacer tolerates a clock that moves backwards.
pub trait Ticker {
    /// Completes at the next tick boundary.
    fn tick(&mut self) -> impl Future<Output = ()> + Send;

    /// Current clock reading.
    fn now(&self) -> Duration;
}

/// A [`Ticker`] backed by a tokio [`Interval`].
///
/// The first tick completes immediately. Ticks missed because the loop fell behind are skipped
/// rather than bursted, since the pacer already catches up based on elapsed time.
#[derive(Debug)]
pub struct IntervalTicker {
    interval: Interval,
    origin: Instant,
}

impl IntervalTicker {
    /// Creates a ticker firing every `period`.
    ///
    /// # Panics
    ///
    /// Panics if `period` is zero, or when called outside of a tokio runtime.
    pub fn new(period: Duration) -> Self {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        Self {
            interval,
            origin: Instant::now(),
        }
    }
}

impl Ticker for IntervalTicker {
    async fn tick(&mut self) {
        self.interval.tick().await;
    }

    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}
