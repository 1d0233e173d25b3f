//! Hash aggregate execution operator.

use std::collections::HashMap;
use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, Date32Array, Date32Builder, Float32Array, Float32Builder, Float64Array,
    Float64Builder, Int64Array, Int64Builder, StringArray, StringBuilder,
};
use arrow::datatypes::DataType as ArrowDataType;
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;

use common_error::{FrameError, FrameResult};
use flatframe_core::{ColumnDef, DataType, Schema};
use flatframe_logical::{AggExpr, AggFunc};

use crate::executor::ExecutionContext;
use crate::operators::scalar::{downcast, ScalarValue};
use crate::operators::PhysicalOperator;
use crate::physical::PhysicalSchema;

/// A hashable group-key component. Restricted to the groupable types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum KeyValue {
    Null,
    Int64(i64),
    Str(String),
    Date(i32),
}

impl KeyValue {
    fn try_from_array(array: &ArrayRef, row: usize) -> FrameResult<Self> {
        if array.is_null(row) {
            return Ok(Self::Null);
        }

        match array.data_type() {
            ArrowDataType::Int64 => Ok(Self::Int64(downcast::<Int64Array>(array)?.value(row))),
            ArrowDataType::Utf8 => Ok(Self::Str(
                downcast::<StringArray>(array)?.value(row).to_string(),
            )),
            ArrowDataType::Date32 => Ok(Self::Date(downcast::<Date32Array>(array)?.value(row))),
            other => Err(FrameError::type_error(format!(
                "cannot group on values of type {other}"
            ))),
        }
    }

    fn to_scalar(&self) -> ScalarValue {
        match self {
            Self::Null => ScalarValue::Null,
            Self::Int64(v) => ScalarValue::Int64(*v),
            Self::Str(v) => ScalarValue::Str(v.clone()),
            Self::Date(v) => ScalarValue::Date(*v),
        }
    }
}

/// Trait for aggregate accumulators. One accumulator instance per
/// (group, aggregate expression) pair.
trait Accumulator: Send + std::fmt::Debug {
    /// Update the accumulator with the value at `row` of `values`.
    fn update(&mut self, values: &ArrayRef, row: usize) -> FrameResult<()>;

    /// Get the final result.
    fn finalize(&self) -> ScalarValue;
}

/// Count accumulator: counts every row in the group, nulls included.
#[derive(Debug, Default)]
struct CountAccumulator {
    count: i64,
}

impl Accumulator for CountAccumulator {
    fn update(&mut self, _values: &ArrayRef, _row: usize) -> FrameResult<()> {
        self.count += 1;
        Ok(())
    }

    fn finalize(&self) -> ScalarValue {
        ScalarValue::Int64(self.count)
    }
}

/// Max accumulator for Int64, ignoring nulls.
#[derive(Debug, Default)]
struct MaxInt64Accumulator {
    max: Option<i64>,
}

impl Accumulator for MaxInt64Accumulator {
    fn update(&mut self, values: &ArrayRef, row: usize) -> FrameResult<()> {
        let array = downcast::<Int64Array>(values)?;
        if !array.is_null(row) {
            let value = array.value(row);
            self.max = Some(self.max.map_or(value, |current| current.max(value)));
        }
        Ok(())
    }

    fn finalize(&self) -> ScalarValue {
        self.max.map_or(ScalarValue::Null, ScalarValue::Int64)
    }
}

/// Max accumulator for Float32, ignoring nulls.
#[derive(Debug, Default)]
struct MaxFloat32Accumulator {
    max: Option<f32>,
}

impl Accumulator for MaxFloat32Accumulator {
    fn update(&mut self, values: &ArrayRef, row: usize) -> FrameResult<()> {
        let array = downcast::<Float32Array>(values)?;
        if !array.is_null(row) {
            let value = array.value(row);
            self.max = Some(self.max.map_or(value, |current| current.max(value)));
        }
        Ok(())
    }

    fn finalize(&self) -> ScalarValue {
        self.max.map_or(ScalarValue::Null, ScalarValue::Float32)
    }
}

/// Max accumulator for Float64, ignoring nulls.
#[derive(Debug, Default)]
struct MaxFloat64Accumulator {
    max: Option<f64>,
}

impl Accumulator for MaxFloat64Accumulator {
    fn update(&mut self, values: &ArrayRef, row: usize) -> FrameResult<()> {
        let array = downcast::<Float64Array>(values)?;
        if !array.is_null(row) {
            let value = array.value(row);
            self.max = Some(self.max.map_or(value, |current| current.max(value)));
        }
        Ok(())
    }

    fn finalize(&self) -> ScalarValue {
        self.max.map_or(ScalarValue::Null, ScalarValue::Float64)
    }
}

/// First accumulator: keeps the value from the first row of the group in
/// input enumeration order, null or not.
#[derive(Debug, Default)]
struct FirstAccumulator {
    value: Option<ScalarValue>,
}

impl Accumulator for FirstAccumulator {
    fn update(&mut self, values: &ArrayRef, row: usize) -> FrameResult<()> {
        if self.value.is_none() {
            self.value = Some(ScalarValue::try_from_array(values, row)?);
        }
        Ok(())
    }

    fn finalize(&self) -> ScalarValue {
        self.value.clone().unwrap_or(ScalarValue::Null)
    }
}

/// Create an accumulator for the given aggregate function and input type.
fn create_accumulator(
    func: AggFunc,
    input_type: Option<&DataType>,
) -> FrameResult<Box<dyn Accumulator>> {
    match func {
        AggFunc::Count => Ok(Box::new(CountAccumulator::default())),
        AggFunc::Max => match input_type {
            Some(DataType::Int64) => Ok(Box::new(MaxInt64Accumulator::default())),
            Some(DataType::Float32) => Ok(Box::new(MaxFloat32Accumulator::default())),
            Some(DataType::Float64) => Ok(Box::new(MaxFloat64Accumulator::default())),
            other => Err(FrameError::type_error(format!(
                "MAX requires a numeric column, got {}",
                other.map_or_else(|| "*".to_string(), ToString::to_string)
            ))),
        },
        AggFunc::First => Ok(Box::new(FirstAccumulator::default())),
    }
}

/// Build one output column from scalar results.
fn build_column(data_type: &ArrowDataType, values: &[ScalarValue]) -> FrameResult<ArrayRef> {
    match data_type {
        ArrowDataType::Int64 => {
            let mut builder = Int64Builder::with_capacity(values.len());
            for value in values {
                match value {
                    ScalarValue::Int64(v) => builder.append_value(*v),
                    _ => builder.append_null(),
                }
            }
            Ok(Arc::new(builder.finish()))
        }
        ArrowDataType::Float32 => {
            let mut builder = Float32Builder::with_capacity(values.len());
            for value in values {
                match value {
                    ScalarValue::Float32(v) => builder.append_value(*v),
                    _ => builder.append_null(),
                }
            }
            Ok(Arc::new(builder.finish()))
        }
        ArrowDataType::Float64 => {
            let mut builder = Float64Builder::with_capacity(values.len());
            for value in values {
                match value {
                    ScalarValue::Float64(v) => builder.append_value(*v),
                    _ => builder.append_null(),
                }
            }
            Ok(Arc::new(builder.finish()))
        }
        ArrowDataType::Utf8 => {
            let mut builder = StringBuilder::new();
            for value in values {
                match value {
                    ScalarValue::Str(v) => builder.append_value(v),
                    _ => builder.append_null(),
                }
            }
            Ok(Arc::new(builder.finish()))
        }
        ArrowDataType::Date32 => {
            let mut builder = Date32Builder::with_capacity(values.len());
            for value in values {
                match value {
                    ScalarValue::Date(v) => builder.append_value(*v),
                    _ => builder.append_null(),
                }
            }
            Ok(Arc::new(builder.finish()))
        }
        other => Err(FrameError::execution(format!(
            "unsupported output type {other} in aggregation"
        ))),
    }
}

/// Aggregation state.
#[derive(Debug, Default)]
enum AggregateState {
    #[default]
    Uninitialized,
    /// Waiting to consume input.
    Accumulating,
    /// All output emitted.
    Exhausted,
}

/// Hash aggregate execution operator.
///
/// This is a **blocking** operator: it consumes all input before
/// producing its single output batch. Groups are emitted in first-seen
/// key order and `FIRST` takes the first row of the group in input
/// enumeration order, so the output is deterministic for a given input
/// table.
#[derive(Debug)]
pub struct HashAggregateExec {
    /// Input operator.
    input: Arc<dyn PhysicalOperator>,
    /// Resolved group-key column indices.
    key_indices: Vec<usize>,
    /// Aggregate expressions.
    aggs: Vec<AggExpr>,
    /// Resolved input column index per aggregate (`None` for COUNT(*)).
    agg_inputs: Vec<Option<usize>>,
    /// Input column type per aggregate.
    agg_types: Vec<Option<DataType>>,
    /// Output schema.
    schema: PhysicalSchema,
    /// Execution state.
    state: tokio::sync::Mutex<AggregateState>,
}

impl HashAggregateExec {
    /// Create a hash aggregate operator, resolving keys and aggregate
    /// inputs against the input schema before any row is touched.
    pub fn try_new(
        input: Arc<dyn PhysicalOperator>,
        keys: Vec<String>,
        aggs: Vec<AggExpr>,
    ) -> FrameResult<Self> {
        let input_schema = input.schema().logical();

        if keys.is_empty() {
            return Err(FrameError::schema_error(
                "aggregate requires at least one grouping key",
            ));
        }

        let mut key_indices = Vec::with_capacity(keys.len());
        let mut columns = Vec::with_capacity(keys.len() + aggs.len());
        for key in &keys {
            let Some(index) = input_schema.index_of(key) else {
                return Err(FrameError::SchemaError(format!(
                    "grouping key '{key}' not found in input schema"
                )));
            };
            let def = &input_schema.columns()[index];
            if !def.data_type.is_groupable() {
                return Err(FrameError::TypeError(format!(
                    "cannot group on column '{}' of type {}",
                    key, def.data_type
                )));
            }
            key_indices.push(index);
            columns.push(def.clone());
        }

        let mut agg_inputs = Vec::with_capacity(aggs.len());
        let mut agg_types = Vec::with_capacity(aggs.len());
        for agg in &aggs {
            let (input_index, input_type) = match &agg.column {
                Some(name) => {
                    let Some(index) = input_schema.index_of(name) else {
                        return Err(FrameError::SchemaError(format!(
                            "aggregate column '{name}' not found in input schema"
                        )));
                    };
                    let data_type = input_schema.columns()[index].data_type.clone();
                    (Some(index), Some(data_type))
                }
                None => (None, None),
            };

            let Some(result_type) = agg.func.result_type(input_type.as_ref()) else {
                return Err(FrameError::TypeError(format!(
                    "{} is not valid for column '{}'",
                    agg.func,
                    agg.column.as_deref().unwrap_or("*")
                )));
            };

            let nullable = !matches!(agg.func, AggFunc::Count);
            columns.push(ColumnDef::new(agg.output_name(), result_type).with_nullable(nullable));
            agg_inputs.push(input_index);
            agg_types.push(input_type);
        }

        let schema = PhysicalSchema::new(Schema::new(columns)?);

        Ok(Self {
            input,
            key_indices,
            aggs,
            agg_inputs,
            agg_types,
            schema,
            state: tokio::sync::Mutex::new(AggregateState::Uninitialized),
        })
    }

    fn make_accumulators(&self) -> FrameResult<Vec<Box<dyn Accumulator>>> {
        self.aggs
            .iter()
            .zip(&self.agg_types)
            .map(|(agg, input_type)| create_accumulator(agg.func, input_type.as_ref()))
            .collect()
    }

    /// Perform aggregation over all input batches.
    fn aggregate_batches(&self, batches: &[RecordBatch]) -> FrameResult<RecordBatch> {
        let mut group_index: HashMap<Vec<KeyValue>, usize> = HashMap::new();
        let mut group_keys: Vec<Vec<KeyValue>> = Vec::new();
        let mut group_accs: Vec<Vec<Box<dyn Accumulator>>> = Vec::new();

        for batch in batches {
            if batch.num_rows() == 0 {
                continue;
            }

            // Resolve aggregate inputs; COUNT(*) gets a synthesized
            // ones column so accumulators see a uniform interface.
            let agg_arrays: Vec<ArrayRef> = self
                .agg_inputs
                .iter()
                .map(|input| match input {
                    Some(index) => batch.column(*index).clone(),
                    None => {
                        Arc::new(Int64Array::from(vec![1i64; batch.num_rows()])) as ArrayRef
                    }
                })
                .collect();

            for row in 0..batch.num_rows() {
                let key: Vec<KeyValue> = self
                    .key_indices
                    .iter()
                    .map(|&index| KeyValue::try_from_array(batch.column(index), row))
                    .collect::<FrameResult<_>>()?;

                let index = match group_index.get(&key) {
                    Some(&index) => index,
                    None => {
                        let index = group_keys.len();
                        group_index.insert(key.clone(), index);
                        group_keys.push(key);
                        group_accs.push(self.make_accumulators()?);
                        index
                    }
                };

                for (acc, array) in group_accs[index].iter_mut().zip(&agg_arrays) {
                    acc.update(array, row)?;
                }
            }
        }

        // Build the result batch: key columns, then aggregate columns,
        // groups in first-seen order.
        let num_keys = self.key_indices.len();
        let arrow_schema = self.schema.arrow_schema();
        let mut columns: Vec<ArrayRef> = Vec::with_capacity(arrow_schema.fields().len());

        for (position, field) in arrow_schema.fields().iter().enumerate() {
            let values: Vec<ScalarValue> = if position < num_keys {
                group_keys.iter().map(|key| key[position].to_scalar()).collect()
            } else {
                group_accs
                    .iter()
                    .map(|accs| accs[position - num_keys].finalize())
                    .collect()
            };
            columns.push(build_column(field.data_type(), &values)?);
        }

        RecordBatch::try_new(arrow_schema.clone(), columns).map_err(Into::into)
    }
}

#[async_trait]
impl PhysicalOperator for HashAggregateExec {
    fn name(&self) -> &'static str {
        "HashAggregateExec"
    }

    fn schema(&self) -> &PhysicalSchema {
        &self.schema
    }

    fn children(&self) -> Vec<&Arc<dyn PhysicalOperator>> {
        vec![&self.input]
    }

    async fn open(&self, ctx: &ExecutionContext) -> FrameResult<()> {
        let mut state = self.state.lock().await;
        *state = AggregateState::Accumulating;
        drop(state);
        self.input.open(ctx).await
    }

    async fn next(&self) -> FrameResult<Option<RecordBatch>> {
        let mut state = self.state.lock().await;

        match &*state {
            AggregateState::Uninitialized => Err(FrameError::execution("Operator not opened")),
            AggregateState::Accumulating => {
                let mut all_batches = Vec::new();
                while let Some(batch) = self.input.next().await? {
                    all_batches.push(batch);
                }

                let result = self.aggregate_batches(&all_batches)?;
                *state = AggregateState::Exhausted;

                if result.num_rows() == 0 {
                    Ok(None)
                } else {
                    Ok(Some(result))
                }
            }
            AggregateState::Exhausted => Ok(None),
        }
    }

    async fn close(&self) -> FrameResult<()> {
        let mut state = self.state.lock().await;
        *state = AggregateState::Exhausted;
        drop(state);
        self.input.close().await
    }

    fn display(&self) -> String {
        let names = self.schema.field_names();
        let keys = names[..self.key_indices.len()].join(", ");
        let aggs: Vec<String> = self.aggs.iter().map(ToString::to_string).collect();
        format!(
            "HashAggregateExec(group_by=[{keys}], agg=[{}])",
            aggs.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::TableScanExec;
    use flatframe_storage::Table;

    fn movie_schema() -> Schema {
        Schema::new(vec![
            ColumnDef::new("original_language", DataType::String),
            ColumnDef::new("title", DataType::String),
            ColumnDef::new("popularity", DataType::Float64),
        ])
        .unwrap()
    }

    fn movie_table(rows: &[(&str, &str, Option<f64>)]) -> Table {
        let schema = movie_schema();
        let batch = RecordBatch::try_new(
            schema.to_arrow(),
            vec![
                Arc::new(StringArray::from(
                    rows.iter().map(|r| r.0).collect::<Vec<_>>(),
                )),
                Arc::new(StringArray::from(
                    rows.iter().map(|r| r.1).collect::<Vec<_>>(),
                )),
                Arc::new(Float64Array::from(
                    rows.iter().map(|r| r.2).collect::<Vec<_>>(),
                )),
            ],
        )
        .unwrap();
        Table::try_new(schema, vec![batch]).unwrap()
    }

    fn query_a() -> FrameResult<HashAggregateExec> {
        let scan: Arc<dyn PhysicalOperator> = Arc::new(TableScanExec::new(movie_schema()));
        HashAggregateExec::try_new(
            scan,
            vec!["original_language".to_string()],
            vec![
                AggExpr::max("popularity").with_alias("popularity"),
                AggExpr::first("title").with_alias("most_popular_film"),
            ],
        )
    }

    async fn run(op: HashAggregateExec, table: Table) -> RecordBatch {
        let ctx = ExecutionContext::new(table);
        op.open(&ctx).await.unwrap();
        let result = op.next().await.unwrap().unwrap();
        assert!(op.next().await.unwrap().is_none());
        op.close().await.unwrap();
        result
    }

    #[tokio::test]
    async fn test_max_and_first_per_group() {
        let table = movie_table(&[
            ("en", "A", Some(10.0)),
            ("fr", "C", Some(7.5)),
            ("en", "B", Some(55.0)),
        ]);

        let result = run(query_a().unwrap(), table).await;
        assert_eq!(result.num_rows(), 2);

        let languages = result
            .column(0)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        let popularity = result
            .column(1)
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap();
        let first_titles = result
            .column(2)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();

        // Groups come out in first-seen order.
        assert_eq!(languages.value(0), "en");
        assert_eq!(languages.value(1), "fr");
        assert!((popularity.value(0) - 55.0).abs() < f64::EPSILON);
        assert!((popularity.value(1) - 7.5).abs() < f64::EPSILON);
        // FIRST takes the first row per group in input order.
        assert_eq!(first_titles.value(0), "A");
        assert_eq!(first_titles.value(1), "C");
    }

    #[tokio::test]
    async fn test_max_ignores_nulls() {
        let table = movie_table(&[("en", "A", None), ("en", "B", Some(3.0))]);

        let result = run(query_a().unwrap(), table).await;
        let popularity = result
            .column(1)
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap();
        assert!((popularity.value(0) - 3.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_max_all_null_is_null() {
        let table = movie_table(&[("en", "A", None), ("en", "B", None)]);

        let result = run(query_a().unwrap(), table).await;
        let popularity = result
            .column(1)
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap();
        assert!(popularity.is_null(0));
    }

    #[tokio::test]
    async fn test_count_star() {
        let scan: Arc<dyn PhysicalOperator> = Arc::new(TableScanExec::new(movie_schema()));
        let op = HashAggregateExec::try_new(
            scan,
            vec!["original_language".to_string()],
            vec![AggExpr::count_star().with_alias("movies_numbers")],
        )
        .unwrap();

        let table = movie_table(&[
            ("en", "A", Some(1.0)),
            ("en", "B", None),
            ("fr", "C", Some(2.0)),
        ]);

        let result = run(op, table).await;
        let counts = result
            .column(1)
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap();

        // COUNT(*) counts rows, nulls included.
        assert_eq!(counts.value(0), 2);
        assert_eq!(counts.value(1), 1);
    }

    #[tokio::test]
    async fn test_empty_input_yields_no_groups() {
        let op = query_a().unwrap();
        let ctx = ExecutionContext::new(Table::empty(movie_schema()));

        op.open(&ctx).await.unwrap();
        assert!(op.next().await.unwrap().is_none());
        op.close().await.unwrap();
    }

    #[test]
    fn test_unknown_key_is_schema_error() {
        let scan: Arc<dyn PhysicalOperator> = Arc::new(TableScanExec::new(movie_schema()));
        let result = HashAggregateExec::try_new(
            scan,
            vec!["language".to_string()],
            vec![AggExpr::count_star()],
        );
        assert!(matches!(result, Err(FrameError::SchemaError(_))));
    }

    #[test]
    fn test_max_on_string_is_type_error() {
        let scan: Arc<dyn PhysicalOperator> = Arc::new(TableScanExec::new(movie_schema()));
        let result = HashAggregateExec::try_new(
            scan,
            vec!["original_language".to_string()],
            vec![AggExpr::max("title")],
        );
        assert!(matches!(result, Err(FrameError::TypeError(_))));
    }

    #[test]
    fn test_output_schema() {
        let op = query_a().unwrap();
        assert_eq!(
            op.schema().field_names(),
            vec!["original_language", "popularity", "most_popular_film"]
        );
    }
}
