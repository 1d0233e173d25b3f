//! Local single-node executor.

use std::time::Instant;

use common_error::FrameResult;
use flatframe_storage::Table;

use crate::executor::{ExecutionContext, ExecutionResult};
use crate::physical::PhysicalPlan;

/// Local single-node executor.
///
/// Executes physical plans over an input table using the pull-based
/// pipeline model. An executor value is explicitly constructed, used,
/// and dropped by the caller; there is no process-wide context.
#[derive(Debug, Default)]
pub struct LocalExecutor;

impl LocalExecutor {
    /// Create a new local executor.
    pub fn new() -> Self {
        Self
    }

    /// Execute a physical plan against the given input table.
    pub async fn execute(
        &self,
        plan: &PhysicalPlan,
        table: Table,
    ) -> FrameResult<ExecutionResult> {
        let ctx = ExecutionContext::new(table);
        let root = plan.root();
        let schema = plan.schema().clone();

        root.open(&ctx).await?;

        let mut batches = Vec::new();
        let start = Instant::now();

        loop {
            match root.next().await {
                Ok(Some(batch)) => {
                    if batch.num_rows() > 0 {
                        batches.push(batch);
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    // Release operator state before surfacing the error.
                    let _ = root.close().await;
                    return Err(e);
                }
            }
        }

        root.close().await?;

        let elapsed = start.elapsed();
        let result = ExecutionResult::new(batches, schema, elapsed);
        tracing::info!(
            rows = result.total_rows(),
            elapsed_ms = elapsed.as_millis() as u64,
            "plan executed"
        );

        Ok(result)
    }

    /// Execute synchronously (blocking).
    pub fn execute_sync(&self, plan: &PhysicalPlan, table: Table) -> FrameResult<ExecutionResult> {
        common_runtime::block_on(self.execute(plan, table))?
    }
}
