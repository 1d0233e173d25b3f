//! Execution context for plan execution.

use flatframe_storage::Table;

/// Execution context passed to all operators.
///
/// Binds the input table for the pipeline's scan. The context is
/// read-only to operators and shared across the pipeline; execution
/// state lives inside each operator, never here.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// The input table the plan's scan reads from.
    pub table: Table,
}

impl ExecutionContext {
    /// Create a context over the given input table.
    pub fn new(table: Table) -> Self {
        Self { table }
    }
}
