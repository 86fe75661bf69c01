//! Destinations for report lines.

use std::io::Write;
use tracing::info;

/// Receives report lines one at a time, in order.
pub trait LineSink {
    fn write_line(&mut self, line: &str) -> std::io::Result<()>;
}

/// Collects lines in memory.
impl LineSink for Vec<String> {
    fn write_line(&mut self, line: &str) -> std::io::Result<()> {
        self.push(line.to_string());
        Ok(())
    }
}

/// Writes each line followed by a newline to any [`Write`] target.
pub struct WriterSink<W: Write> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> LineSink for WriterSink<W> {
    fn write_line(&mut self, line: &str) -> std::io::Result<()> {
        writeln!(self.writer, "{line}")
    }
}

/// Emits each line as an info-level tracing event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LineSink for TracingSink {
    fn write_line(&mut self, line: &str) -> std::io::Result<()> {
        info!(target: "social_probe::report", "{line}");
        Ok(())
    }
}
