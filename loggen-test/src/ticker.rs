//! A simulated clock and a [`Ticker`] that replays scripted clock readings.
//!
//! ```
//! use std::time::Duration;
//!
//! use loggen_test::ticker::{ScriptedTicker, SimClock};
//! use tokio_util::sync::CancellationToken;
//!
//! let clock = SimClock::default();
//! let token = CancellationToken::new();
//! // ticks at 10ms, 20ms and 30ms, then cancels the run
//! let ticker = ScriptedTicker::every(clock.clone(), Duration::from_millis(10), 3, token.clone());
//! ```

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use loggen_core::Ticker;
use tokio_util::sync::CancellationToken;

/// A manually driven clock, shared between a ticker and the sinks observing it.
#[derive(Clone, Debug, Default)]
pub struct SimClock(Arc<AtomicU64>);

impl SimClock {
    /// Current reading of the clock.
    pub fn now(&self) -> Duration {
        Duration::from_nanos(self.0.load(Ordering::SeqCst))
    }

    /// Moves the clock to `time`, which may lie in the past.
    pub fn set(&self, time: Duration) {
        self.0.store(time.as_nanos() as u64, Ordering::SeqCst);
    }
}

/// Replays a fixed list of clock readings, one per tick.
///
/// Every tick completes immediately after moving the [`SimClock`] to the next reading. Once all
/// readings are used up, the ticker cancels `token` and never ticks again.
#[derive(Debug)]
pub struct ScriptedTicker {
    clock: SimClock,
    readings: VecDeque<Duration>,
    token: CancellationToken,
}

impl ScriptedTicker {
    /// Creates a ticker replaying `readings` in order.
    pub fn new(
        clock: SimClock,
        readings: impl IntoIterator<Item = Duration>,
        token: CancellationToken,
    ) -> Self {
        Self {
            clock,
            readings: readings.into_iter().collect(),
            token,
        }
    }

    /// Creates a ticker with `count` ticks spaced `period` apart, starting at the current reading.
    pub fn every(clock: SimClock, period: Duration, count: u32, token: CancellationToken) -> Self {
        let start = clock.now();
        let readings = (1..=count).map(move |n| start + period * n);
        Self::new(clock, readings, token)
    }
}

impl Ticker for ScriptedTicker {
    async fn tick(&mut self) {
        match self.readings.pop_front() {
            Some(reading) => self.clock.set(reading),
            None => {
                self.token.cancel();
                std::future::pending::<()>().await;
            }
        }
    }

    fn now(&self) -> Duration {
        self.clock.now()
    }
}
