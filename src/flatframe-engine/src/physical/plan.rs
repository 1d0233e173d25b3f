//! Physical plan wrapper.

use std::sync::Arc;

use crate::operators::PhysicalOperator;
use crate::physical::PhysicalSchema;

/// A physical plan: the root of an operator pipeline.
#[derive(Debug, Clone)]
pub struct PhysicalPlan {
    root: Arc<dyn PhysicalOperator>,
}

impl PhysicalPlan {
    /// Create a plan from its root operator.
    pub fn new(root: Arc<dyn PhysicalOperator>) -> Self {
        Self { root }
    }

    /// Get the root operator.
    pub fn root(&self) -> &Arc<dyn PhysicalOperator> {
        &self.root
    }

    /// Get the output schema.
    pub fn schema(&self) -> &PhysicalSchema {
        self.root.schema()
    }

    /// Generate EXPLAIN output for the whole pipeline.
    pub fn explain(&self) -> String {
        let mut output = String::new();
        output.push_str("Physical Plan:\n");
        output.push_str(&self.root.explain(1));
        output
    }
}
