//! Test utilities for the log generator.
//!
//! This crate provides utilities to exercise the pacing loop deterministically. See the modules
//! for all available utilities.

pub mod sink;
pub mod ticker;
pub mod tracing;
