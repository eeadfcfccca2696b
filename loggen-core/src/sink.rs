//! Destinations for generated records.
//!
//! The pacer hands every record to a [`LineSink`]. Two sinks are provided: [`TracingSink`], which
//! emits each record as an `INFO` event through `tracing`, and [`JsonLinesSink`], which writes one
//! JSON object per line to any writer.

use std::io::Write;
use std::time::SystemTime;

use serde::Serialize;
use uuid::Uuid;

use crate::error::SinkResult;

/// Target of the events emitted by [`TracingSink`].
pub const LINES_TARGET: &str = "loggen::lines";

/// A single generated log record.
///
/// Records are transient: they are built for one call to [`LineSink::emit`] and discarded
/// afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogRecord<'a> {
    /// 1-based position of this record within its run.
    pub sequence: u64,
    /// Identifier of the run, shared by all records of that run.
    pub instance_id: Uuid,
    /// The message text.
    pub payload: &'a str,
}

/// Receives generated records.
///
/// `emit` is called synchronously from the pacing loop and must not block for long, otherwise
/// cancellation is delayed. Sinks that can block arbitrarily should offload the work.
///
/// A failing `emit` does not undo the record: it has been handed to the sink and counts as
/// emitted.
pub trait LineSink {
    /// Delivers one record.
    fn emit(&mut self, record: &LogRecord<'_>) -> SinkResult<()>;

    /// Flushes buffered records. Called once when the run ends.
    fn flush(&mut self) -> SinkResult<()> {
        Ok(())
    }
}

impl<S: LineSink + ?Sized> LineSink for &mut S {
    fn emit(&mut self, record: &LogRecord<'_>) -> SinkResult<()> {
        (**self).emit(record)
    }

    fn flush(&mut self) -> SinkResult<()> {
        (**self).flush()
    }
}

impl<S: LineSink + ?Sized> LineSink for Box<S> {
    fn emit(&mut self, record: &LogRecord<'_>) -> SinkResult<()> {
        (**self).emit(record)
    }

    fn flush(&mut self) -> SinkResult<()> {
        (**self).flush()
    }
}

/// Emits records as `INFO` events on the [`LINES_TARGET`] target.
///
/// Rendering is left to the installed subscriber. The sequence number is attached as `counter`
/// and the run identifier as `service.instance.id`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl LineSink for TracingSink {
    fn emit(&mut self, record: &LogRecord<'_>) -> SinkResult<()> {
        tracing::info!(
            target: LINES_TARGET,
            counter = record.sequence,
            service.instance.id = %record.instance_id,
            "{}",
            record.payload
        );
        Ok(())
    }
}

#[derive(Serialize)]
struct JsonLine<'a> {
    timestamp: String,
    level: &'static str,
    message: &'a str,
    counter: u64,
    #[serde(rename = "service.instance.id")]
    instance_id: Uuid,
}

/// Writes records as JSON lines.
///
/// Wrap unbuffered writers such as stdout in a [`std::io::BufWriter`]; the buffer is flushed at
/// the end of the run.
#[derive(Debug)]
pub struct JsonLinesSink<W> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    /// Creates a sink writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> LineSink for JsonLinesSink<W> {
    fn emit(&mut self, record: &LogRecord<'_>) -> SinkResult<()> {
        let line = JsonLine {
            timestamp: humantime::format_rfc3339_micros(SystemTime::now()).to_string(),
            level: "INFO",
            message: record.payload,
            counter: record.sequence,
            instance_id: record.instance_id,
        };

        serde_json::to_writer(&mut self.writer, &line)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> SinkResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;

    #[test]
    fn json_lines_carry_all_fields() {
        let instance_id = Uuid::new_v4();
        let mut sink = JsonLinesSink::new(Vec::new());

        for sequence in 1..=3 {
            let record = LogRecord {
                sequence,
                instance_id,
                payload: "Hello, world",
            };
            sink.emit(&record).unwrap();
        }
        sink.flush().unwrap();

        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<Value> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(lines.len(), 3);
        for (index, line) in lines.iter().enumerate() {
            assert_eq!(line["counter"], index as u64 + 1);
            assert_eq!(line["level"], "INFO");
            assert_eq!(line["message"], "Hello, world");
            assert_eq!(line["service.instance.id"], instance_id.to_string());
            assert!(line["timestamp"].as_str().unwrap().ends_with('Z'));
        }
    }

    #[test]
    fn write_failures_surface_as_errors() {
        struct Broken;

        impl Write for Broken {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::ErrorKind::BrokenPipe.into())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut sink = JsonLinesSink::new(Broken);
        let record = LogRecord {
            sequence: 1,
            instance_id: Uuid::nil(),
            payload: "Log line",
        };
        assert!(sink.emit(&record).is_err());
    }
}
