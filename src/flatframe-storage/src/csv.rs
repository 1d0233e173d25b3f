//! CSV implementations of the row source/sink boundary.

use std::fs::File;
use std::path::PathBuf;

use arrow::csv::{ReaderBuilder, WriterBuilder};
use arrow::record_batch::RecordBatch;

use common_error::{FrameError, FrameResult};
use flatframe_core::Schema;

use crate::source::{RowSink, RowSource};
use crate::table::Table;

const DEFAULT_BATCH_SIZE: usize = 8192;

/// A header-bearing CSV file read with a declared schema.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    schema: Schema,
    batch_size: usize,
}

impl CsvSource {
    /// Create a CSV source for the given path and declared schema.
    pub fn new(path: impl Into<PathBuf>, schema: Schema) -> Self {
        Self {
            path: path.into(),
            schema,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Set the batch size used while reading.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
}

impl RowSource for CsvSource {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn read(&self) -> FrameResult<Table> {
        let file = File::open(&self.path)?;
        let reader = ReaderBuilder::new(self.schema.to_arrow())
            .with_header(true)
            .with_batch_size(self.batch_size)
            .build(file)?;

        let batches = reader
            .collect::<Result<Vec<RecordBatch>, _>>()
            .map_err(|e| {
                FrameError::ParseError(format!("{}: {e}", self.path.display()))
            })?;
        Table::try_new(self.schema.clone(), batches)
    }
}

/// A CSV file sink writing header + rows in column order.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    /// Create a CSV sink for the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RowSink for CsvSink {
    fn write(&self, table: &Table) -> FrameResult<()> {
        let file = File::create(&self.path)?;
        let mut writer = WriterBuilder::new().with_header(true).build(file);

        for batch in table.batches() {
            writer.write(batch)?;
        }

        Ok(())
    }
}
