//! Flatten execution operator: parse one nested array column and
//! explode each row into one output row per record.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Int64Builder, StringArray, StringBuilder, UInt32Array};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;

use common_error::{FrameError, FrameResult};
use flatframe_core::{parse_nested_cell, ColumnDef, DataType, NestedField, NestedRecord, Schema, Value};

use crate::executor::ExecutionContext;
use crate::operators::PhysicalOperator;
use crate::physical::PhysicalSchema;

/// Internal state for the flatten operator.
#[derive(Debug, Default)]
enum FlattenState {
    #[default]
    Uninitialized,
    Open {
        /// Rows dropped so far because their cell was absent, malformed,
        /// or an empty array.
        dropped: u64,
    },
    Exhausted,
    Closed,
}

/// Flatten execution operator.
///
/// Streaming: consumes one input batch at a time and emits one output
/// batch per input batch that produced at least one row. A row whose
/// cell parses to *k* records contributes *k* output rows, identical in
/// every other column; a row whose cell is absent, malformed, or an
/// empty array contributes none. The source column is removed and the
/// two projected columns are appended.
#[derive(Debug)]
pub struct FlattenExec {
    /// Input operator.
    input: Arc<dyn PhysicalOperator>,
    /// Index of the source column in the input schema.
    column_index: usize,
    /// Name of the source column (for errors and display).
    column: String,
    /// The two-field record shape.
    fields: Vec<NestedField>,
    /// Output schema.
    schema: PhysicalSchema,
    /// Execution state.
    state: tokio::sync::Mutex<FlattenState>,
}

impl FlattenExec {
    /// Create a flatten operator, resolving and type-checking the source
    /// column against the input schema before any row is touched.
    pub fn try_new(
        input: Arc<dyn PhysicalOperator>,
        column: impl Into<String>,
        fields: Vec<NestedField>,
        id_output: impl Into<String>,
        name_output: impl Into<String>,
    ) -> FrameResult<Self> {
        let column = column.into();
        if fields.len() != 2 {
            return Err(FrameError::SchemaError(format!(
                "flatten of '{column}' requires exactly 2 record fields, got {}",
                fields.len()
            )));
        }

        let input_schema = input.schema().logical();

        let Some(column_index) = input_schema.index_of(&column) else {
            return Err(FrameError::SchemaError(format!(
                "flatten column '{column}' not found in input schema"
            )));
        };

        let source = &input_schema.columns()[column_index];
        match &source.data_type {
            DataType::String => {}
            DataType::NestedRecordArray(declared) if declared == &fields => {}
            other => {
                return Err(FrameError::SchemaError(format!(
                    "flatten column '{column}' has incompatible type {other}"
                )));
            }
        }

        let mut columns: Vec<ColumnDef> = input_schema
            .columns()
            .iter()
            .filter(|c| c.name != column)
            .cloned()
            .collect();
        columns.push(ColumnDef::new(id_output, fields[0].data_type.clone()));
        columns.push(ColumnDef::new(name_output, fields[1].data_type.clone()));
        let schema = PhysicalSchema::new(Schema::new(columns)?);

        Ok(Self {
            input,
            column_index,
            column,
            fields,
            schema,
            state: tokio::sync::Mutex::new(FlattenState::Uninitialized),
        })
    }

    /// Explode one input batch.
    ///
    /// Returns the exploded batch (possibly empty) and the number of
    /// input rows dropped.
    fn flatten_batch(&self, batch: &RecordBatch) -> FrameResult<(RecordBatch, u64)> {
        let source = batch
            .column(self.column_index)
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| {
                FrameError::execution(format!(
                    "flatten column '{}' is not a string array",
                    self.column
                ))
            })?;

        let mut indices: Vec<u32> = Vec::new();
        let mut records: Vec<NestedRecord> = Vec::new();
        let mut dropped = 0u64;

        for row in 0..batch.num_rows() {
            let raw = if source.is_null(row) {
                None
            } else {
                Some(source.value(row))
            };

            match parse_nested_cell(raw, &self.fields) {
                Some(cell_records) => {
                    for record in cell_records {
                        indices.push(row as u32);
                        records.push(record);
                    }
                }
                None => dropped += 1,
            }
        }

        let take_indices = UInt32Array::from(indices);
        let mut columns: Vec<ArrayRef> = Vec::with_capacity(batch.num_columns() + 1);
        for (i, column) in batch.columns().iter().enumerate() {
            if i == self.column_index {
                continue;
            }
            columns.push(arrow::compute::take(column.as_ref(), &take_indices, None)?);
        }
        columns.push(build_projected(&records, 0, &self.fields[0].data_type)?);
        columns.push(build_projected(&records, 1, &self.fields[1].data_type)?);

        let out = RecordBatch::try_new(self.schema.arrow_schema().clone(), columns)?;
        Ok((out, dropped))
    }
}

/// Build the output array for one projected record field.
fn build_projected(
    records: &[NestedRecord],
    field_index: usize,
    data_type: &DataType,
) -> FrameResult<ArrayRef> {
    match data_type {
        DataType::Int64 => {
            let mut builder = Int64Builder::with_capacity(records.len());
            for record in records {
                match &record.values[field_index] {
                    Value::Int64(v) => builder.append_value(*v),
                    _ => builder.append_null(),
                }
            }
            Ok(Arc::new(builder.finish()))
        }
        DataType::String => {
            let mut builder = StringBuilder::new();
            for record in records {
                match &record.values[field_index] {
                    Value::String(v) => builder.append_value(v),
                    _ => builder.append_null(),
                }
            }
            Ok(Arc::new(builder.finish()))
        }
        other => Err(FrameError::internal(format!(
            "unsupported projected field type {other}"
        ))),
    }
}

#[async_trait]
impl PhysicalOperator for FlattenExec {
    fn name(&self) -> &'static str {
        "FlattenExec"
    }

    fn schema(&self) -> &PhysicalSchema {
        &self.schema
    }

    fn children(&self) -> Vec<&Arc<dyn PhysicalOperator>> {
        vec![&self.input]
    }

    async fn open(&self, ctx: &ExecutionContext) -> FrameResult<()> {
        let mut state = self.state.lock().await;
        *state = FlattenState::Open { dropped: 0 };
        drop(state);
        self.input.open(ctx).await
    }

    async fn next(&self) -> FrameResult<Option<RecordBatch>> {
        let mut state = self.state.lock().await;

        let mut dropped = match &*state {
            FlattenState::Uninitialized => {
                return Err(FrameError::execution("Operator not opened"))
            }
            FlattenState::Open { dropped } => *dropped,
            FlattenState::Exhausted | FlattenState::Closed => return Ok(None),
        };

        loop {
            match self.input.next().await? {
                Some(batch) => {
                    let (out, batch_dropped) = self.flatten_batch(&batch)?;
                    dropped += batch_dropped;
                    if out.num_rows() > 0 {
                        *state = FlattenState::Open { dropped };
                        return Ok(Some(out));
                    }
                }
                None => {
                    if dropped > 0 {
                        tracing::debug!(
                            column = %self.column,
                            dropped,
                            "dropped rows with absent, malformed, or empty nested values"
                        );
                    }
                    *state = FlattenState::Exhausted;
                    return Ok(None);
                }
            }
        }
    }

    async fn close(&self) -> FrameResult<()> {
        let mut state = self.state.lock().await;
        *state = FlattenState::Closed;
        drop(state);
        self.input.close().await
    }

    fn display(&self) -> String {
        format!(
            "FlattenExec({} -> [{}, {}])",
            self.column,
            self.schema.field_names()[self.schema.num_columns() - 2],
            self.schema.field_names()[self.schema.num_columns() - 1]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::TableScanExec;
    use arrow::array::{Int64Array, StringArray};
    use flatframe_storage::Table;

    fn movie_schema() -> Schema {
        Schema::new(vec![
            ColumnDef::new("title", DataType::String),
            ColumnDef::new("genres", DataType::String),
        ])
        .unwrap()
    }

    fn genre_fields() -> Vec<NestedField> {
        vec![
            NestedField::new("id", DataType::Int64),
            NestedField::new("name", DataType::String),
        ]
    }

    fn movie_table(genres: Vec<Option<&str>>) -> Table {
        let titles: Vec<String> = (0..genres.len()).map(|i| format!("film-{i}")).collect();
        let schema = movie_schema();
        let batch = RecordBatch::try_new(
            schema.to_arrow(),
            vec![
                Arc::new(StringArray::from(titles)),
                Arc::new(StringArray::from(genres)),
            ],
        )
        .unwrap();
        Table::try_new(schema, vec![batch]).unwrap()
    }

    fn flatten_genres() -> FrameResult<FlattenExec> {
        let scan: Arc<dyn PhysicalOperator> = Arc::new(TableScanExec::new(movie_schema()));
        FlattenExec::try_new(scan, "genres", genre_fields(), "genre_id", "genre_name")
    }

    async fn run(table: Table) -> RecordBatch {
        let op = flatten_genres().unwrap();
        let ctx = ExecutionContext::new(table);

        op.open(&ctx).await.unwrap();
        let batch = op.next().await.unwrap().unwrap();
        assert!(op.next().await.unwrap().is_none());
        op.close().await.unwrap();
        batch
    }

    #[tokio::test]
    async fn test_flatten_explodes_per_record() {
        let table = movie_table(vec![Some(
            r#"[{"id":28,"name":"Action"},{"id":12,"name":"Adventure"}]"#,
        )]);
        let batch = run(table).await;

        assert_eq!(batch.num_rows(), 2);
        let titles = batch
            .column(0)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        let ids = batch
            .column(1)
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap();
        let names = batch
            .column(2)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();

        assert_eq!(titles.value(0), "film-0");
        assert_eq!(titles.value(1), "film-0");
        assert_eq!(ids.value(0), 28);
        assert_eq!(names.value(0), "Action");
        assert_eq!(ids.value(1), 12);
        assert_eq!(names.value(1), "Adventure");
    }

    #[tokio::test]
    async fn test_flatten_drops_null_empty_and_malformed() {
        let table = movie_table(vec![
            None,
            Some("[]"),
            Some("not json"),
            Some(r#"[{"id":18,"name":"Drama"}]"#),
        ]);
        let batch = run(table).await;

        assert_eq!(batch.num_rows(), 1);
        let titles = batch
            .column(0)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(titles.value(0), "film-3");
    }

    #[tokio::test]
    async fn test_flatten_all_dropped_yields_no_batches() {
        let table = movie_table(vec![None, Some("[]")]);

        let op = flatten_genres().unwrap();
        let ctx = ExecutionContext::new(table);

        op.open(&ctx).await.unwrap();
        assert!(op.next().await.unwrap().is_none());
        op.close().await.unwrap();
    }

    #[test]
    fn test_flatten_unknown_column() {
        let scan: Arc<dyn PhysicalOperator> = Arc::new(TableScanExec::new(movie_schema()));
        let result = FlattenExec::try_new(scan, "keywords", genre_fields(), "a", "b");
        assert!(matches!(result, Err(FrameError::SchemaError(_))));
    }

    #[test]
    fn test_flatten_output_schema() {
        let op = flatten_genres().unwrap();
        assert_eq!(
            op.schema().field_names(),
            vec!["title", "genre_id", "genre_name"]
        );
    }
}
