//! Physical schema pairing the logical schema with its Arrow projection.

use std::fmt;

use arrow::datatypes::SchemaRef;

use flatframe_core::Schema;

/// Physical schema for operator output.
///
/// Pairs the logical [`Schema`] (used for column resolution and type
/// checks) with the Arrow schema every produced `RecordBatch` carries.
#[derive(Debug, Clone)]
pub struct PhysicalSchema {
    logical: Schema,
    arrow: SchemaRef,
}

impl PhysicalSchema {
    /// Create from a logical schema.
    pub fn new(logical: Schema) -> Self {
        let arrow = logical.to_arrow();
        Self { logical, arrow }
    }

    /// Get the logical schema.
    pub fn logical(&self) -> &Schema {
        &self.logical
    }

    /// Get the Arrow schema.
    pub fn arrow_schema(&self) -> &SchemaRef {
        &self.arrow
    }

    /// Number of columns.
    pub fn num_columns(&self) -> usize {
        self.logical.len()
    }

    /// Get all field names.
    pub fn field_names(&self) -> Vec<&str> {
        self.logical.column_names()
    }
}

impl From<Schema> for PhysicalSchema {
    fn from(schema: Schema) -> Self {
        Self::new(schema)
    }
}

impl fmt::Display for PhysicalSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.logical)
    }
}
