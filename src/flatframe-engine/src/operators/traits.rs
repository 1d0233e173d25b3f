//! Physical operator trait.

use std::fmt::Debug;
use std::sync::Arc;

use arrow::record_batch::RecordBatch;
use async_trait::async_trait;

use common_error::FrameResult;

use crate::executor::ExecutionContext;
use crate::physical::PhysicalSchema;

/// Trait for physical operators in the execution plan.
///
/// Physical operators form a chain that processes data in a
/// **pull-based** fashion. Each call to `next()` returns the next batch
/// of results.
///
/// # Lifecycle
///
/// ```text
/// create → open → next* → close
/// ```
///
/// - `open()` initializes state and child operators
/// - `next()` returns batches until exhausted (returns None)
/// - `close()` releases state (MUST be idempotent)
///
/// Operators never mutate upstream data; a transform always produces new
/// batches.
#[async_trait]
pub trait PhysicalOperator: Send + Sync + Debug {
    /// Get the operator name for display.
    fn name(&self) -> &'static str;

    /// Get the output schema.
    fn schema(&self) -> &PhysicalSchema;

    /// Get child operators.
    fn children(&self) -> Vec<&Arc<dyn PhysicalOperator>>;

    /// Initialize the operator and its children.
    async fn open(&self, ctx: &ExecutionContext) -> FrameResult<()>;

    /// Get the next batch of results.
    ///
    /// Returns `Ok(Some(batch))` while data is available, `Ok(None)`
    /// when exhausted, `Err(_)` on failure (aborts the pipeline).
    async fn next(&self) -> FrameResult<Option<RecordBatch>>;

    /// Close the operator and release state.
    async fn close(&self) -> FrameResult<()>;

    /// Generate EXPLAIN output at the given indentation level.
    fn explain(&self, indent: usize) -> String {
        let prefix = "  ".repeat(indent);
        let mut output = format!("{}{}\n", prefix, self.display());
        for child in self.children() {
            output.push_str(&child.explain(indent + 1));
        }
        output
    }

    /// Display string for EXPLAIN.
    fn display(&self) -> String {
        self.name().to_string()
    }
}
