//! JSON Lines result sink.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use sagres::eval::{ResultRecord, ResultSink};
use sagres::{Result, SagresError};

/// Writes one JSON object per record and line.
#[derive(Debug)]
pub(crate) struct JsonLinesSink<W: Write> {
    writer: W,
}

impl JsonLinesSink<BufWriter<File>> {
    /// Creates (or truncates) `path`.
    pub(crate) fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .map_err(|e| SagresError::Other(format!("cannot create {}: {e}", path.display())))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonLinesSink<W> {
    pub(crate) const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Flushes buffered records.
    pub(crate) fn finish(mut self) -> Result<W> {
        self.writer
            .flush()
            .map_err(|e| SagresError::Other(e.to_string()))?;
        Ok(self.writer)
    }
}

impl<W: Write> ResultSink for JsonLinesSink<W> {
    fn write(&mut self, record: &ResultRecord) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record)
            .map_err(|e| SagresError::Other(format!("cannot encode record {}: {e}", record.key)))?;
        self.writer
            .write_all(b"\n")
            .map_err(|e| SagresError::Other(e.to_string()))
    }
}
