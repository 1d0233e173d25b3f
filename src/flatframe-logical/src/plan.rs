//! Logical plan structure and fluent builder.

use serde::{Deserialize, Serialize};

use common_error::FrameResult;
use flatframe_core::{NestedField, Schema};

use crate::expr::AggExpr;
use crate::ops::{AggregateOp, FlattenOp, LogicalOp, ScanOp, SortKey, SortOp};
use crate::schema_inference::infer_schema;

/// A logical plan: a linear chain of operators with a validated output
/// schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalPlan {
    /// The root operator of the plan.
    pub root: LogicalOp,
    /// The output schema of this plan.
    pub schema: Schema,
}

impl LogicalPlan {
    /// Create a plan from a root operator, validating the whole chain.
    pub fn try_new(root: LogicalOp) -> FrameResult<Self> {
        let schema = infer_schema(&root)?;
        Ok(Self { root, schema })
    }

    /// Get a reference to the root operator.
    pub fn root(&self) -> &LogicalOp {
        &self.root
    }

    /// Get the output schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Generate a tree-formatted explanation of the plan.
    pub fn explain(&self) -> String {
        let mut output = String::new();
        output.push_str("Logical Plan:\n");
        output.push_str(&self.root.explain(1));
        output
    }

    /// Count the number of operators in the plan.
    pub fn operator_count(&self) -> usize {
        let mut count = 1;
        let mut op = &self.root;
        while let Some(input) = op.input() {
            count += 1;
            op = input;
        }
        count
    }
}

impl std::fmt::Display for LogicalPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.root)
    }
}

/// Builder for constructing logical plans fluently.
///
/// Operators are applied in call order; nothing is reordered.
#[derive(Debug, Clone)]
pub struct PlanBuilder {
    op: LogicalOp,
}

impl PlanBuilder {
    /// Start building from a scan of a source with the given schema.
    pub fn scan(schema: Schema) -> Self {
        Self {
            op: LogicalOp::scan(ScanOp::new(schema)),
        }
    }

    /// Add a flatten stage.
    pub fn flatten(
        self,
        column: impl Into<String>,
        fields: Vec<NestedField>,
        id_output: impl Into<String>,
        name_output: impl Into<String>,
    ) -> Self {
        Self {
            op: LogicalOp::Flatten(FlattenOp::new(
                self.op, column, fields, id_output, name_output,
            )),
        }
    }

    /// Add a sort stage.
    pub fn sort(self, keys: Vec<SortKey>) -> Self {
        Self {
            op: LogicalOp::Sort(SortOp::new(self.op, keys)),
        }
    }

    /// Add a grouped aggregation.
    pub fn aggregate(self, keys: Vec<String>, aggs: Vec<AggExpr>) -> Self {
        Self {
            op: LogicalOp::Aggregate(AggregateOp::new(self.op, keys, aggs)),
        }
    }

    /// Validate the chain and build the final plan.
    pub fn build(self) -> FrameResult<LogicalPlan> {
        LogicalPlan::try_new(self.op)
    }
}
