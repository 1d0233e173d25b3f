//! Immutable materialized table values.

use std::sync::Arc;

use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;

use common_error::{ensure, FrameResult};
use flatframe_core::Schema;

/// An immutable, materialized table: a logical schema plus Arrow record
/// batches.
///
/// Cloning is cheap (the batch vector is shared), which is what makes a
/// materialized table a practical cache: the flattened table is produced
/// once and handed to multiple downstream queries.
#[derive(Debug, Clone)]
pub struct Table {
    schema: Schema,
    arrow_schema: SchemaRef,
    batches: Arc<Vec<RecordBatch>>,
}

impl Table {
    /// Create a table, validating that every batch conforms to the
    /// schema (column count, names, and Arrow types).
    pub fn try_new(schema: Schema, batches: Vec<RecordBatch>) -> FrameResult<Self> {
        let arrow_schema = schema.to_arrow();

        for batch in &batches {
            ensure!(
                batch.num_columns() == arrow_schema.fields().len(),
                SchemaError: "batch has {} columns, schema has {}",
                batch.num_columns(),
                arrow_schema.fields().len()
            );
            for (batch_field, field) in batch
                .schema()
                .fields()
                .iter()
                .zip(arrow_schema.fields().iter())
            {
                ensure!(
                    batch_field.name() == field.name()
                        && batch_field.data_type() == field.data_type(),
                    SchemaError: "batch column '{}: {}' does not match schema column '{}: {}'",
                    batch_field.name(),
                    batch_field.data_type(),
                    field.name(),
                    field.data_type()
                );
            }
        }

        Ok(Self {
            schema,
            arrow_schema,
            batches: Arc::new(batches),
        })
    }

    /// Create an empty table with the given schema.
    pub fn empty(schema: Schema) -> Self {
        let arrow_schema = schema.to_arrow();
        Self {
            schema,
            arrow_schema,
            batches: Arc::new(Vec::new()),
        }
    }

    /// Get the logical schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Get the Arrow schema.
    pub fn arrow_schema(&self) -> &SchemaRef {
        &self.arrow_schema
    }

    /// Get the record batches.
    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    /// Get the total number of rows.
    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }

    /// Get the number of columns.
    pub fn num_columns(&self) -> usize {
        self.schema.len()
    }

    /// Check if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float64Array, StringArray};
    use flatframe_core::{ColumnDef, DataType};

    fn test_schema() -> Schema {
        Schema::new(vec![
            ColumnDef::new("title", DataType::String),
            ColumnDef::new("popularity", DataType::Float64),
        ])
        .unwrap()
    }

    fn test_batch(schema: &Schema) -> RecordBatch {
        RecordBatch::try_new(
            schema.to_arrow(),
            vec![
                Arc::new(StringArray::from(vec!["A", "B"])),
                Arc::new(Float64Array::from(vec![10.0, 55.0])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_table_creation() {
        let schema = test_schema();
        let batch = test_batch(&schema);
        let table = Table::try_new(schema, vec![batch]).unwrap();

        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.num_columns(), 2);
        assert!(!table.is_empty());
    }

    #[test]
    fn test_table_rejects_mismatched_batch() {
        let schema = test_schema();
        let other = Schema::new(vec![ColumnDef::new("title", DataType::String)]).unwrap();
        let batch = RecordBatch::try_new(
            other.to_arrow(),
            vec![Arc::new(StringArray::from(vec!["A"]))],
        )
        .unwrap();

        assert!(Table::try_new(schema, vec![batch]).is_err());
    }

    #[test]
    fn test_empty_table() {
        let table = Table::empty(test_schema());
        assert!(table.is_empty());
        assert_eq!(table.num_rows(), 0);
    }

    #[test]
    fn test_clone_shares_batches() {
        let schema = test_schema();
        let batch = test_batch(&schema);
        let table = Table::try_new(schema, vec![batch]).unwrap();
        let clone = table.clone();

        assert_eq!(clone.num_rows(), table.num_rows());
        assert!(Arc::ptr_eq(&table.batches, &clone.batches));
    }
}
