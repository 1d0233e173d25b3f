//! Aggregate operator for grouping and reduction.

use serde::{Deserialize, Serialize};

use crate::expr::AggExpr;

use super::LogicalOp;

/// Aggregate operator - grouping and reduction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateOp {
    /// Input operator.
    pub input: Box<LogicalOp>,
    /// Grouping key column names.
    pub keys: Vec<String>,
    /// Aggregation expressions.
    pub aggs: Vec<AggExpr>,
}

impl AggregateOp {
    /// Create a new aggregate operation.
    pub fn new(input: LogicalOp, keys: Vec<String>, aggs: Vec<AggExpr>) -> Self {
        Self {
            input: Box::new(input),
            keys,
            aggs,
        }
    }
}
