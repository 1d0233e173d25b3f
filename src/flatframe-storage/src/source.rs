//! Row source and sink contracts.

use common_error::FrameResult;
use flatframe_core::Schema;

use crate::table::Table;

/// A schema-typed row source the engine reads a [`Table`] from.
///
/// The read is the only input I/O of a pipeline run; implementations
/// acquire and release their underlying resource inside `read`.
pub trait RowSource {
    /// Declared schema of the rows this source yields.
    fn schema(&self) -> &Schema;

    /// Read the full source into a table.
    fn read(&self) -> FrameResult<Table>;
}

/// A row sink a [`Table`] is written to.
pub trait RowSink {
    /// Write the table, header first, in column order.
    fn write(&self, table: &Table) -> FrameResult<()>;
}

/// A row source backed by an existing in-memory table.
#[derive(Debug, Clone)]
pub struct MemorySource {
    table: Table,
}

impl MemorySource {
    /// Create a source over the given table.
    pub fn new(table: Table) -> Self {
        Self { table }
    }
}

impl RowSource for MemorySource {
    fn schema(&self) -> &Schema {
        self.table.schema()
    }

    fn read(&self) -> FrameResult<Table> {
        Ok(self.table.clone())
    }
}
