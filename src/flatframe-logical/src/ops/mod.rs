//! Logical operators for transform plans.

mod aggregate;
mod flatten;
mod scan;
mod sort;

pub use aggregate::AggregateOp;
pub use flatten::FlattenOp;
pub use scan::ScanOp;
pub use sort::{SortKey, SortOp};

use serde::{Deserialize, Serialize};

/// Logical operator in a transform plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LogicalOp {
    /// Scan a typed row source.
    Scan(ScanOp),
    /// Parse one nested array column and explode it into rows.
    Flatten(FlattenOp),
    /// Order rows by one or more keys.
    Sort(SortOp),
    /// Group rows and reduce each group.
    Aggregate(AggregateOp),
}

impl LogicalOp {
    /// Create a scan operator.
    pub fn scan(scan: ScanOp) -> Self {
        Self::Scan(scan)
    }

    /// Get the input operator, if any.
    pub fn input(&self) -> Option<&LogicalOp> {
        match self {
            Self::Scan(_) => None,
            Self::Flatten(op) => Some(&op.input),
            Self::Sort(op) => Some(&op.input),
            Self::Aggregate(op) => Some(&op.input),
        }
    }

    /// Get the name of this operator.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Scan(_) => "Scan",
            Self::Flatten(_) => "Flatten",
            Self::Sort(_) => "Sort",
            Self::Aggregate(_) => "Aggregate",
        }
    }

    /// Explain this operator as an indented tree string.
    pub fn explain(&self, indent: usize) -> String {
        let prefix = "  ".repeat(indent);
        let mut result = format!("{}{}", prefix, self.explain_self());

        if let Some(input) = self.input() {
            result.push('\n');
            result.push_str(&input.explain(indent + 1));
        }

        result
    }

    fn explain_self(&self) -> String {
        match self {
            Self::Scan(op) => format!("Scan({} columns)", op.schema.len()),
            Self::Flatten(op) => format!(
                "Flatten({} -> [{}, {}])",
                op.column, op.id_output, op.name_output
            ),
            Self::Sort(op) => {
                let keys: Vec<_> = op.keys.iter().map(ToString::to_string).collect();
                format!("Sort({})", keys.join(", "))
            }
            Self::Aggregate(op) => {
                let aggs: Vec<_> = op.aggs.iter().map(ToString::to_string).collect();
                format!(
                    "Aggregate(keys=[{}], aggs=[{}])",
                    op.keys.join(", "),
                    aggs.join(", ")
                )
            }
        }
    }
}

impl std::fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.explain(0))
    }
}
