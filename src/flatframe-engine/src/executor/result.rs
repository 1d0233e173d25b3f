//! Execution results.

use std::time::Duration;

use arrow::record_batch::RecordBatch;

use common_error::FrameResult;
use flatframe_storage::Table;

use crate::physical::PhysicalSchema;

/// The collected output of one plan execution.
#[derive(Debug)]
pub struct ExecutionResult {
    /// Result batches in production order.
    pub batches: Vec<RecordBatch>,
    /// Output schema.
    schema: PhysicalSchema,
    /// Wall-clock execution time.
    pub elapsed: Duration,
}

impl ExecutionResult {
    /// Create a new execution result.
    pub fn new(batches: Vec<RecordBatch>, schema: PhysicalSchema, elapsed: Duration) -> Self {
        Self {
            batches,
            schema,
            elapsed,
        }
    }

    /// Get the output schema.
    pub fn schema(&self) -> &PhysicalSchema {
        &self.schema
    }

    /// Get the total number of result rows.
    pub fn total_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }

    /// Check if the result is empty.
    pub fn is_empty(&self) -> bool {
        self.total_rows() == 0
    }

    /// Materialize the result into a reusable [`Table`].
    ///
    /// This is the caching point: the returned table is immutable and
    /// cheap to clone, so several downstream queries can consume it
    /// without recomputing the plan that produced it.
    pub fn into_table(self) -> FrameResult<Table> {
        Table::try_new(self.schema.logical().clone(), self.batches)
    }
}
