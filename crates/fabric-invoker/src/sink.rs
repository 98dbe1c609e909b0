//! Destinations for invocation output

use std::io::{self, Write};

/// Append-only destination for diagnostics and child output, owned by the caller
pub trait OutputSink: Send {
    /// Append one line (without its terminator)
    fn write_line(&mut self, line: &str) -> io::Result<()>;
}

impl OutputSink for Vec<String> {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.push(line.to_string());
        Ok(())
    }
}

/// Adapts any [`Write`] into a line sink, flushing after each line
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: W,
}

impl<W: Write + Send> WriterSink<W> {
    /// Wrap `writer`
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the wrapped writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> OutputSink for WriterSink<W> {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.writer, "{line}")?;
        self.writer.flush()
    }
}
