//! Validated parameters of a single generator run.

use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// Default interval between two pacing ticks.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(10);

/// Default maximum number of records emitted in a single tick.
pub const DEFAULT_BURST_CAP: u64 = 10_000;

/// Target emission rate in lines per second.
///
/// A `TargetRate` is always positive. Raw input is converted with [`TryFrom<i64>`] or
/// [`FromStr`], both of which reject zero, negative and non-numeric values with a
/// [`ConfigError`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct TargetRate(NonZeroU64);

impl TargetRate {
    /// Creates a target rate from a positive number of lines per second.
    pub const fn new(lines_per_second: NonZeroU64) -> Self {
        Self(lines_per_second)
    }

    /// Returns the rate in lines per second.
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl TryFrom<i64> for TargetRate {
    type Error = ConfigError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u64::try_from(value)
            .ok()
            .and_then(NonZeroU64::new)
            .map(Self)
            .ok_or(ConfigError::NonPositiveRate(value))
    }
}

impl FromStr for TargetRate {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::MissingRate);
        }

        let value: i64 = trimmed
            .parse()
            .map_err(|_| ConfigError::InvalidRate(trimmed.to_owned()))?;
        Self::try_from(value)
    }
}

impl fmt::Display for TargetRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A builder for creating a [`RunConfig`].
#[derive(Debug)]
pub struct RunConfigBuilder {
    target_rate: TargetRate,
    tick_interval: Duration,
    burst_cap: u64,
}

impl RunConfigBuilder {
    /// The interval at which the pacer wakes up to emit lines.
    pub fn tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    /// The maximum number of lines emitted in a single tick.
    ///
    /// This bounds the work done between two cancellation checks. Sustained throughput can never
    /// exceed `burst_cap / tick_interval`.
    pub fn burst_cap(mut self, burst_cap: u64) -> Self {
        self.burst_cap = burst_cap;
        self
    }

    /// Validates the parameters and creates the run configuration.
    pub fn build(self) -> Result<RunConfig, ConfigError> {
        if self.tick_interval.is_zero() {
            return Err(ConfigError::ZeroTickInterval);
        }
        if self.burst_cap == 0 {
            return Err(ConfigError::ZeroBurstCap);
        }

        Ok(RunConfig {
            target_rate: self.target_rate,
            tick_interval: self.tick_interval,
            burst_cap: self.burst_cap,
        })
    }
}

/// Immutable configuration of one generator run.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RunConfig {
    target_rate: TargetRate,
    tick_interval: Duration,
    burst_cap: u64,
}

impl RunConfig {
    /// Constructs a new builder with default tick interval and burst cap.
    pub fn builder(target_rate: TargetRate) -> RunConfigBuilder {
        RunConfigBuilder {
            target_rate,
            tick_interval: DEFAULT_TICK_INTERVAL,
            burst_cap: DEFAULT_BURST_CAP,
        }
    }

    /// Target emission rate.
    pub fn target_rate(&self) -> TargetRate {
        self.target_rate
    }

    /// Interval between two pacing ticks.
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Maximum number of lines emitted per tick.
    pub fn burst_cap(&self) -> u64 {
        self.burst_cap
    }

    /// The highest sustained rate this configuration can reach, in lines per second.
    pub fn max_throughput(&self) -> f64 {
        self.burst_cap as f64 / self.tick_interval.as_secs_f64()
    }

    /// Returns `true` if the burst cap prevents reaching the target rate.
    pub fn is_saturated(&self) -> bool {
        self.target_rate.get() as f64 > self.max_throughput()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_rates() {
        assert_eq!(
            TargetRate::try_from(0),
            Err(ConfigError::NonPositiveRate(0))
        );
        assert_eq!(
            TargetRate::try_from(-5),
            Err(ConfigError::NonPositiveRate(-5))
        );
        assert_eq!(
            "-5".parse::<TargetRate>(),
            Err(ConfigError::NonPositiveRate(-5))
        );
        assert_eq!("0".parse::<TargetRate>(), Err(ConfigError::NonPositiveRate(0)));
    }

    #[test]
    fn rejects_non_numeric_rates() {
        assert_eq!(
            "abc".parse::<TargetRate>(),
            Err(ConfigError::InvalidRate("abc".into()))
        );
        assert_eq!(
            "1.5".parse::<TargetRate>(),
            Err(ConfigError::InvalidRate("1.5".into()))
        );
        assert_eq!("  ".parse::<TargetRate>(), Err(ConfigError::MissingRate));
    }

    #[test]
    fn parses_positive_rates() {
        let rate: TargetRate = " 250 ".parse().unwrap();
        assert_eq!(rate.get(), 250);
        assert_eq!(rate.to_string(), "250");
    }

    #[test]
    fn builder_defaults() {
        let config = RunConfig::builder(TargetRate::try_from(100).unwrap())
            .build()
            .unwrap();

        assert_eq!(config.tick_interval(), Duration::from_millis(10));
        assert_eq!(config.burst_cap(), 10_000);
        assert_eq!(config.max_throughput(), 1_000_000.0);
        assert!(!config.is_saturated());
    }

    #[test]
    fn builder_validates() {
        let rate = TargetRate::try_from(100).unwrap();

        let err = RunConfig::builder(rate)
            .tick_interval(Duration::ZERO)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::ZeroTickInterval);

        let err = RunConfig::builder(rate).burst_cap(0).build().unwrap_err();
        assert_eq!(err, ConfigError::ZeroBurstCap);
    }

    #[test]
    fn saturation() {
        let config = RunConfig::builder(TargetRate::try_from(10_000_000).unwrap())
            .build()
            .unwrap();
        assert!(config.is_saturated());
    }
}
