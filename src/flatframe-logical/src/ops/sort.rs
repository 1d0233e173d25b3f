//! Sort operator: row ordering.

use serde::{Deserialize, Serialize};

use super::LogicalOp;

/// Sort key specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    /// Column to sort by.
    pub column: String,

    /// Sort direction (ascending if true).
    pub ascending: bool,

    /// Nulls first (if true, NULLs come before non-NULLs).
    pub nulls_first: bool,
}

impl SortKey {
    /// Create a new ascending sort key, nulls last.
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
            nulls_first: false,
        }
    }

    /// Create a new descending sort key, nulls last.
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
            nulls_first: false,
        }
    }

    /// Set nulls first.
    #[must_use]
    pub const fn nulls_first(mut self) -> Self {
        self.nulls_first = true;
        self
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let dir = if self.ascending { "ASC" } else { "DESC" };
        let nulls = if self.nulls_first {
            "NULLS FIRST"
        } else {
            "NULLS LAST"
        };
        write!(f, "{} {} {}", self.column, dir, nulls)
    }
}

/// Sort operator - row ordering.
///
/// A stable sort: rows equal under every key keep their input order,
/// which is what makes a downstream `FIRST` aggregate deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortOp {
    /// Input operator.
    pub input: Box<LogicalOp>,
    /// Sort keys in order of precedence.
    pub keys: Vec<SortKey>,
}

impl SortOp {
    /// Create a new sort operation.
    pub fn new(input: LogicalOp, keys: Vec<SortKey>) -> Self {
        Self {
            input: Box::new(input),
            keys,
        }
    }
}
