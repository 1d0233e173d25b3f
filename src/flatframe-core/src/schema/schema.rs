//! Schema definition for flatframe tables.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use common_error::{ensure, FrameResult};

use crate::types::DataType;

/// Information about a column in the schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name.
    pub name: String,
    /// Data type.
    pub data_type: DataType,
    /// Whether this column can contain nulls.
    pub nullable: bool,
}

impl ColumnDef {
    /// Create a new nullable column definition.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
        }
    }

    /// Set nullable for this column.
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }
}

/// Schema for a table: an ordered sequence of typed columns.
///
/// Validated at construction; a `Schema` value is always well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<ColumnDef>,
}

impl Schema {
    /// Create a schema with the given columns.
    ///
    /// Fails with `SchemaError` on duplicate column names, nested
    /// record shapes whose arity is not exactly two, duplicate nested
    /// field names, or nested fields that are not Int64 or String.
    pub fn new(columns: Vec<ColumnDef>) -> FrameResult<Self> {
        for (i, col) in columns.iter().enumerate() {
            ensure!(
                !columns[..i].iter().any(|c| c.name == col.name),
                SchemaError: "duplicate column name '{}'", col.name
            );

            if let DataType::NestedRecordArray(fields) = &col.data_type {
                ensure!(
                    fields.len() == 2,
                    SchemaError: "nested column '{}' must have exactly 2 fields, got {}",
                    col.name,
                    fields.len()
                );
                ensure!(
                    fields[0].name != fields[1].name,
                    SchemaError: "nested column '{}' has duplicate field name '{}'",
                    col.name,
                    fields[0].name
                );
                for field in fields {
                    ensure!(
                        matches!(field.data_type, DataType::Int64 | DataType::String),
                        SchemaError: "nested field '{}.{}' must be Int64 or String, got {}",
                        col.name,
                        field.name,
                        field.data_type
                    );
                }
            }
        }

        Ok(Self { columns })
    }

    /// Get the columns.
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Get a column definition by name.
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Find a column index by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Get all column names.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Check if the schema is empty.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Get the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Convert to an Arrow schema.
    pub fn to_arrow(&self) -> arrow_schema::SchemaRef {
        let fields: Vec<arrow_schema::Field> = self
            .columns
            .iter()
            .map(|c| arrow_schema::Field::new(&c.name, c.data_type.to_arrow(), c.nullable))
            .collect();
        Arc::new(arrow_schema::Schema::new(fields))
    }
}

impl std::fmt::Display for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Schema {{")?;
        for col in &self.columns {
            writeln!(
                f,
                "  {}: {} {}",
                col.name,
                col.data_type,
                if col.nullable { "(nullable)" } else { "" }
            )?;
        }
        write!(f, "}}")
    }
}
