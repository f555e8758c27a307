//! ## quayside-core::trace
//! **Append-only event log**
//!
//! Processes report notable transitions as `<time>: <message>` records. The
//! core only needs somewhere to append them; where they end up (memory,
//! stdout, a digest) is up to the sink.

use std::fmt;
use std::io::Write;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::time::SimTime;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub time: SimTime,
    pub message: String,
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.time, self.message)
    }
}

pub trait LogSink {
    fn append(&mut self, record: LogRecord);
}

impl<S: LogSink + ?Sized> LogSink for &mut S {
    fn append(&mut self, record: LogRecord) {
        (**self).append(record)
    }
}

impl<S: LogSink + ?Sized> LogSink for Box<S> {
    fn append(&mut self, record: LogRecord) {
        (**self).append(record)
    }
}

/// Tee: both sinks see every record.
impl<A: LogSink, B: LogSink> LogSink for (A, B) {
    fn append(&mut self, record: LogRecord) {
        self.0.append(record.clone());
        self.1.append(record);
    }
}

/// Keeps every record in memory.
#[derive(Debug, Default, Clone)]
pub struct TraceLog {
    records: Vec<LogRecord>,
}

impl TraceLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<LogRecord> {
        self.records
    }

    /// Records rendered as `<time>: <message>` lines.
    pub fn lines(&self) -> Vec<String> {
        self.records.iter().map(ToString::to_string).collect()
    }
}

impl LogSink for TraceLog {
    fn append(&mut self, record: LogRecord) {
        self.records.push(record);
    }
}

/// Writes each record as a line. After the first I/O failure the sink goes
/// quiet; the run itself is not affected.
pub struct WriterSink<W: Write> {
    writer: W,
    failed: bool,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            failed: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> LogSink for WriterSink<W> {
    fn append(&mut self, record: LogRecord) {
        if self.failed {
            return;
        }
        if let Err(e) = writeln!(self.writer, "{record}") {
            warn!("Event log writer failed, dropping further records: {e}");
            self.failed = true;
        }
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl LogSink for NullSink {
    fn append(&mut self, _record: LogRecord) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(t: u32, message: &str) -> LogRecord {
        LogRecord {
            time: SimTime::from(t),
            message: message.into(),
        }
    }

    #[test]
    fn trace_log_keeps_order() {
        let mut log = TraceLog::new();
        log.append(record(0, "a"));
        log.append(record(3, "b"));
        assert_eq!(log.lines(), vec!["0: a", "3: b"]);
    }

    #[test]
    fn writer_sink_formats_lines() {
        let mut sink = WriterSink::new(Vec::new());
        sink.append(record(9, "Vessel V1 leaves the terminal."));
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(text, "9: Vessel V1 leaves the terminal.\n");
    }

    #[test]
    fn tee_feeds_both() {
        let mut tee = (TraceLog::new(), TraceLog::new());
        tee.append(record(1, "x"));
        assert_eq!(tee.0.records(), tee.1.records());
        assert_eq!(tee.0.records().len(), 1);
    }
}
