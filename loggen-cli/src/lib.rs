//! Command line front end of the log generator.
//!
//! This builds on top of [`loggen_core`] and provides everything around the pacing loop: loading
//! configuration, setting up logging, wiring termination signals to cancellation and reporting the
//! final summary.
#![warn(missing_debug_implementations)]

pub mod cli;
pub mod config;
pub mod observability;
pub mod run;
