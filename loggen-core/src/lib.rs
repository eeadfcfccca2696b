//! Core of the synthetic log traffic generator.
//!
//! The [`Pacer`] emits structured [`LogRecord`]s at a target rate until it is cancelled, then
//! reports the achieved throughput in a [`RunSummary`]. Everything it interacts with is injected:
//!
//! - a [`Ticker`] that wakes the loop up periodically and serves as its clock,
//! - a [`LineSink`] that receives the records,
//! - a [`CancelSource`] that ends the run.
//!
//! This keeps the pacing algorithm testable with a simulated clock and manual cancellation.
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod cancel;
pub mod config;
pub mod error;
pub mod pacer;
pub mod payload;
pub mod sink;
pub mod time;

pub use crate::cancel::CancelSource;
pub use crate::config::{RunConfig, TargetRate};
pub use crate::error::{ConfigError, SinkError};
pub use crate::pacer::{Pacer, RunSummary};
pub use crate::payload::Payloads;
pub use crate::sink::{JsonLinesSink, LineSink, LogRecord, TracingSink};
pub use crate::time::{IntervalTicker, Ticker};
