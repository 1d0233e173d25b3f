//! Scan operator.

use serde::{Deserialize, Serialize};

use flatframe_core::Schema;

/// Scan operator - the leaf of every plan.
///
/// Carries the declared schema of the row source so downstream operators
/// can be resolved and type-checked before execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanOp {
    /// Declared schema of the row source.
    pub schema: Schema,
}

impl ScanOp {
    /// Create a scan over a source with the given schema.
    pub fn new(schema: Schema) -> Self {
        Self { schema }
    }
}
