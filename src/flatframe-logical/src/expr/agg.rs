//! Aggregate functions for grouped reduction.

use serde::{Deserialize, Serialize};

use flatframe_core::DataType;

/// Aggregate function types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggFunc {
    /// Count rows in the group.
    Count,
    /// Maximum value by natural ordering, ignoring nulls.
    Max,
    /// Value from the first row of the group in input enumeration order.
    First,
}

impl AggFunc {
    /// Get the result type of this aggregate given the input column type.
    ///
    /// Returns `None` if the function is not valid for the given type.
    /// `Count` takes no input column and always returns Int64.
    pub fn result_type(&self, input: Option<&DataType>) -> Option<DataType> {
        match self {
            Self::Count => Some(DataType::Int64),

            // Max is restricted to numeric columns; see the aggregation
            // engine contract.
            Self::Max => match input? {
                t if t.is_numeric() => Some(t.clone()),
                _ => None,
            },

            Self::First => input.cloned(),
        }
    }

    /// Get the function name for display.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Count => "COUNT",
            Self::Max => "MAX",
            Self::First => "FIRST",
        }
    }

    /// Check if this aggregate depends on row enumeration order.
    pub const fn is_order_dependent(&self) -> bool {
        matches!(self, Self::First)
    }
}

impl std::fmt::Display for AggFunc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An aggregate expression: function, input column, optional alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggExpr {
    /// The aggregate function.
    pub func: AggFunc,
    /// The input column name; `None` only for `COUNT(*)`.
    pub column: Option<String>,
    /// Optional alias for the result column.
    pub alias: Option<String>,
}

impl AggExpr {
    /// Create `COUNT(*)`.
    pub fn count_star() -> Self {
        Self {
            func: AggFunc::Count,
            column: None,
            alias: None,
        }
    }

    /// Create `MAX(column)`.
    pub fn max(column: impl Into<String>) -> Self {
        Self {
            func: AggFunc::Max,
            column: Some(column.into()),
            alias: None,
        }
    }

    /// Create `FIRST(column)`.
    pub fn first(column: impl Into<String>) -> Self {
        Self {
            func: AggFunc::First,
            column: Some(column.into()),
            alias: None,
        }
    }

    /// Set the alias for the result column.
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Get the effective output column name.
    pub fn output_name(&self) -> String {
        self.alias.clone().unwrap_or_else(|| self.to_string())
    }
}

impl std::fmt::Display for AggExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.column {
            Some(col) => write!(f, "{}({})", self.func, col),
            None => write!(f, "{}(*)", self.func),
        }
    }
}
