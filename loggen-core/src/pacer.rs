//! The rate-pacing loop.
//!
//! On every tick the [`Pacer`] computes how many records should have been emitted since the start
//! of the run, `floor(elapsed * target_rate)`, and emits the difference to what it actually
//! emitted. A single tick emits at most `burst_cap` records. Whatever remains is picked up by the
//! following ticks, since the expected count keeps growing with elapsed time while the emitted
//! count is the only state carried between ticks.
//!
//! Flooring the expected count means a record is never emitted ahead of its scheduled time. The
//! achieved rate converges to the target from below.

use std::fmt;
use std::time::Duration;

use uuid::Uuid;

use crate::cancel::CancelSource;
use crate::config::{RunConfig, TargetRate};
use crate::payload::Payloads;
use crate::sink::{LineSink, LogRecord};
use crate::time::Ticker;

/// Emits records at a configured rate until cancelled.
#[derive(Debug)]
pub struct Pacer {
    config: RunConfig,
    payloads: Payloads,
}

impl Pacer {
    /// Creates a pacer for the given configuration and payload selector.
    pub fn new(config: RunConfig, payloads: Payloads) -> Self {
        Self { config, payloads }
    }

    /// Runs until `cancel` fires and returns a summary of the run.
    ///
    /// A fresh instance identifier is generated for every run and attached to all of its records.
    /// Cancellation is checked between ticks, so it is observed within one tick interval plus the
    /// time to emit at most `burst_cap` records. No partial tick is emitted after cancellation.
    pub async fn run<T, S, C>(&mut self, mut ticker: T, mut sink: S, cancel: &C) -> RunSummary
    where
        T: Ticker,
        S: LineSink,
        C: CancelSource + ?Sized,
    {
        let instance_id = Uuid::new_v4();
        let mut state = RunState::new(ticker.now());

        tracing::debug!(
            %instance_id,
            target_rate = self.config.target_rate().get(),
            tick_interval = ?self.config.tick_interval(),
            burst_cap = self.config.burst_cap(),
            "run started"
        );

        let cancelled = cancel.cancelled();
        tokio::pin!(cancelled);

        loop {
            tokio::select! {
                biased;

                _ = &mut cancelled => break,
                _ = ticker.tick() => {
                    let now = ticker.now();
                    self.on_tick(&mut state, now, instance_id, &mut sink);
                }
            }
        }

        let elapsed = state.elapsed(ticker.now());
        if let Err(error) = sink.flush() {
            tracing::error!(
                error = &error as &dyn std::error::Error,
                "failed to flush log records"
            );
        }

        let summary = RunSummary {
            instance_id,
            elapsed,
            total_emitted: state.emitted,
            ticks: state.ticks,
            sink_failures: state.sink_failures,
        };
        tracing::debug!(?summary, "run finished");
        summary
    }

    fn on_tick<S: LineSink>(
        &mut self,
        state: &mut RunState,
        now: Duration,
        instance_id: Uuid,
        sink: &mut S,
    ) {
        state.ticks += 1;

        let deficit = state.deficit(now, self.config.target_rate());
        if deficit == 0 {
            return;
        }

        let burst_cap = self.config.burst_cap();
        if deficit > burst_cap {
            tracing::trace!(deficit, burst_cap, "behind schedule, emission capped");
        }

        for _ in 0..deficit.min(burst_cap) {
            state.emitted += 1;
            let record = LogRecord {
                sequence: state.emitted,
                instance_id,
                payload: self.payloads.pick(),
            };

            if let Err(error) = sink.emit(&record) {
                if state.sink_failures == 0 {
                    tracing::error!(
                        error = &error as &dyn std::error::Error,
                        sequence = record.sequence,
                        "failed to emit log record"
                    );
                }
                state.sink_failures += 1;
            }
        }
    }
}

/// Mutable state of a run, owned by the pacing loop.
#[derive(Debug)]
struct RunState {
    start: Duration,
    emitted: u64,
    ticks: u64,
    sink_failures: u64,
}

impl RunState {
    fn new(start: Duration) -> Self {
        Self {
            start,
            emitted: 0,
            ticks: 0,
            sink_failures: 0,
        }
    }

    /// Time since the start of the run, zero if the clock moved backwards past it.
    fn elapsed(&self, now: Duration) -> Duration {
        now.saturating_sub(self.start)
    }

    /// Number of records that should have been emitted by `now`.
    fn expected(&self, now: Duration, rate: TargetRate) -> u64 {
        (self.elapsed(now).as_secs_f64() * rate.get() as f64).floor() as u64
    }

    /// Number of records due at `now`, zero when on or ahead of schedule.
    fn deficit(&self, now: Duration, rate: TargetRate) -> u64 {
        self.expected(now, rate).saturating_sub(self.emitted)
    }
}

/// Outcome of a finished run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunSummary {
    /// Identifier attached to all records of the run.
    pub instance_id: Uuid,
    /// Time from the start of the run until cancellation was observed.
    pub elapsed: Duration,
    /// Number of records handed to the sink.
    pub total_emitted: u64,
    /// Number of ticks processed.
    pub ticks: u64,
    /// Number of records the sink reported as failed.
    pub sink_failures: u64,
}

impl RunSummary {
    /// Duration of the run in seconds.
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Achieved rate in lines per second.
    ///
    /// This is zero for a run of zero duration.
    pub fn observed_rate(&self) -> f64 {
        if self.elapsed.is_zero() {
            return 0.0;
        }
        self.total_emitted as f64 / self.elapsed_secs()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "generated for {:.2} sec, printed total {} lines, {:.1} per second",
            self.elapsed_secs(),
            self.total_emitted,
            self.observed_rate()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate(value: i64) -> TargetRate {
        TargetRate::try_from(value).unwrap()
    }

    #[test]
    fn expected_count_is_floored() {
        let state = RunState::new(Duration::ZERO);

        assert_eq!(state.expected(Duration::from_millis(15), rate(100)), 1);
        assert_eq!(state.expected(Duration::from_millis(9), rate(100)), 0);
        assert_eq!(state.expected(Duration::from_secs(2), rate(3)), 6);
    }

    #[test]
    fn deficit_never_negative() {
        let mut state = RunState::new(Duration::from_secs(1));
        state.emitted = 50;

        // before the start of the run
        assert_eq!(state.deficit(Duration::ZERO, rate(100)), 0);
        // ahead of schedule
        assert_eq!(state.deficit(Duration::from_millis(1200), rate(100)), 0);
        assert_eq!(state.deficit(Duration::from_millis(1600), rate(100)), 10);
    }

    #[test]
    fn observed_rate_of_empty_run() {
        let summary = RunSummary {
            instance_id: Uuid::nil(),
            elapsed: Duration::ZERO,
            total_emitted: 0,
            ticks: 0,
            sink_failures: 0,
        };

        assert_eq!(summary.observed_rate(), 0.0);
        assert_eq!(
            summary.to_string(),
            "generated for 0.00 sec, printed total 0 lines, 0.0 per second"
        );
    }

    #[test]
    fn observed_rate() {
        let summary = RunSummary {
            instance_id: Uuid::nil(),
            elapsed: Duration::from_millis(2500),
            total_emitted: 250,
            ticks: 250,
            sink_failures: 0,
        };

        assert_eq!(summary.observed_rate(), 100.0);
        assert_eq!(
            summary.to_string(),
            "generated for 2.50 sec, printed total 250 lines, 100.0 per second"
        );
    }
}
