//! Sinks that capture records for assertions.

use std::collections::BTreeMap;
use std::time::Duration;

use loggen_core::error::{SinkError, SinkResult};
use loggen_core::{LineSink, LogRecord};
use uuid::Uuid;

use crate::ticker::SimClock;

/// A record captured by [`RecordingSink`], with the clock reading at the time of emission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Recorded {
    /// Sequence number of the record.
    pub sequence: u64,
    /// Run identifier of the record.
    pub instance_id: Uuid,
    /// Payload of the record.
    pub payload: String,
    /// Clock reading when the record was emitted.
    pub at: Duration,
}

/// Stores every emitted record.
#[derive(Debug, Default)]
pub struct RecordingSink {
    clock: SimClock,
    records: Vec<Recorded>,
    flushes: usize,
}

impl RecordingSink {
    /// Creates a sink that stamps records with readings of `clock`.
    pub fn new(clock: SimClock) -> Self {
        Self {
            clock,
            records: Vec::new(),
            flushes: 0,
        }
    }

    /// All records emitted so far.
    pub fn records(&self) -> &[Recorded] {
        &self.records
    }

    /// How often the sink was flushed.
    pub fn flushes(&self) -> usize {
        self.flushes
    }

    /// Number of records emitted at each distinct clock reading.
    ///
    /// With a [`ScriptedTicker`](crate::ticker::ScriptedTicker) using distinct readings, this is
    /// the size of every non-empty batch.
    pub fn batches(&self) -> BTreeMap<Duration, u64> {
        let mut batches = BTreeMap::new();
        for record in &self.records {
            *batches.entry(record.at).or_default() += 1;
        }
        batches
    }
}

impl LineSink for RecordingSink {
    fn emit(&mut self, record: &LogRecord<'_>) -> SinkResult<()> {
        self.records.push(Recorded {
            sequence: record.sequence,
            instance_id: record.instance_id,
            payload: record.payload.to_owned(),
            at: self.clock.now(),
        });
        Ok(())
    }

    fn flush(&mut self) -> SinkResult<()> {
        self.flushes += 1;
        Ok(())
    }
}

/// Counts records without storing them.
#[derive(Debug, Default)]
pub struct CountingSink {
    /// Number of records emitted.
    pub count: u64,
    /// Sequence number of the last record.
    pub last_sequence: u64,
}

impl LineSink for CountingSink {
    fn emit(&mut self, record: &LogRecord<'_>) -> SinkResult<()> {
        self.count += 1;
        self.last_sequence = record.sequence;
        Ok(())
    }
}

/// Rejects every `n`-th record.
#[derive(Debug)]
pub struct FailingSink {
    every: u64,
    /// Number of records rejected.
    pub failures: u64,
}

impl FailingSink {
    /// Creates a sink failing every `every`-th record.
    pub fn every(every: u64) -> Self {
        Self { every, failures: 0 }
    }
}

impl LineSink for FailingSink {
    fn emit(&mut self, record: &LogRecord<'_>) -> SinkResult<()> {
        if record.sequence % self.every == 0 {
            self.failures += 1;
            return Err(SinkError::Io(std::io::ErrorKind::BrokenPipe.into()));
        }
        Ok(())
    }
}
