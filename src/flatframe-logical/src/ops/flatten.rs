//! Flatten operator: parse a nested array column and explode it.

use serde::{Deserialize, Serialize};

use flatframe_core::NestedField;

use super::LogicalOp;

/// Flatten operator.
///
/// Parses one JSON-encoded array-of-records column into the given
/// two-field record shape and explodes each row into one output row per
/// record. Rows whose cell is absent, malformed, or an empty array are
/// dropped. The source column is removed; the two projected columns are
/// appended to the schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlattenOp {
    /// Input operator.
    pub input: Box<LogicalOp>,
    /// Name of the source column to flatten.
    pub column: String,
    /// The two-field record shape to parse each array element with.
    pub fields: Vec<NestedField>,
    /// Output column name for the first (identifier) field.
    pub id_output: String,
    /// Output column name for the second (name) field.
    pub name_output: String,
}

impl FlattenOp {
    /// Create a new flatten operation.
    pub fn new(
        input: LogicalOp,
        column: impl Into<String>,
        fields: Vec<NestedField>,
        id_output: impl Into<String>,
        name_output: impl Into<String>,
    ) -> Self {
        Self {
            input: Box::new(input),
            column: column.into(),
            fields,
            id_output: id_output.into(),
            name_output: name_output.into(),
        }
    }
}
