//! Sort execution operator.

use std::cmp::Ordering;
use std::sync::Arc;

use arrow::array::{ArrayRef, UInt32Array};
use arrow::compute::concat_batches;
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;

use common_error::{FrameError, FrameResult};
use flatframe_logical::SortKey;

use crate::executor::ExecutionContext;
use crate::operators::scalar::ScalarValue;
use crate::operators::PhysicalOperator;
use crate::physical::PhysicalSchema;

/// Sort state.
#[derive(Debug, Default)]
enum SortState {
    #[default]
    Uninitialized,
    /// Waiting to consume input.
    Accumulating,
    /// All output emitted.
    Exhausted,
}

/// Sort execution operator.
///
/// A **blocking**, stable sort: it consumes all input, orders the rows
/// by the given keys, and emits a single output batch. Rows equal under
/// every key keep their input order.
#[derive(Debug)]
pub struct SortExec {
    /// Input operator.
    input: Arc<dyn PhysicalOperator>,
    /// Sort keys with resolved column indices.
    keys: Vec<(SortKey, usize)>,
    /// Output schema (same as input; sorting only reorders rows).
    schema: PhysicalSchema,
    /// Execution state.
    state: tokio::sync::Mutex<SortState>,
}

impl SortExec {
    /// Create a sort operator, resolving every key against the input
    /// schema before any row is touched.
    pub fn try_new(input: Arc<dyn PhysicalOperator>, keys: Vec<SortKey>) -> FrameResult<Self> {
        let input_schema = input.schema().logical();

        if keys.is_empty() {
            return Err(FrameError::schema_error("sort requires at least one key"));
        }

        let mut resolved = Vec::with_capacity(keys.len());
        for key in keys {
            let Some(index) = input_schema.index_of(&key.column) else {
                return Err(FrameError::SchemaError(format!(
                    "sort key '{}' not found in input schema",
                    key.column
                )));
            };
            if input_schema.columns()[index].data_type.is_nested() {
                return Err(FrameError::TypeError(format!(
                    "cannot sort on nested column '{}'",
                    key.column
                )));
            }
            resolved.push((key, index));
        }

        let schema = PhysicalSchema::new(input_schema.clone());

        Ok(Self {
            input,
            keys: resolved,
            schema,
            state: tokio::sync::Mutex::new(SortState::Uninitialized),
        })
    }

    /// Sort all collected batches into a single output batch.
    fn sort_batches(&self, batches: &[RecordBatch]) -> FrameResult<Option<RecordBatch>> {
        if batches.iter().all(|b| b.num_rows() == 0) {
            return Ok(None);
        }

        let combined = concat_batches(self.schema.arrow_schema(), batches)?;
        let num_rows = combined.num_rows();

        // Extract the key values once per key column.
        let mut key_values: Vec<Vec<ScalarValue>> = Vec::with_capacity(self.keys.len());
        for (_, index) in &self.keys {
            let column = combined.column(*index);
            let values = (0..num_rows)
                .map(|row| ScalarValue::try_from_array(column, row))
                .collect::<FrameResult<Vec<_>>>()?;
            key_values.push(values);
        }

        let mut indices: Vec<u32> = (0..num_rows as u32).collect();
        indices.sort_by(|&a, &b| {
            for ((key, _), values) in self.keys.iter().zip(&key_values) {
                let left = &values[a as usize];
                let right = &values[b as usize];
                let ordering = compare_with_key(left, right, key);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });

        let take_indices = UInt32Array::from(indices);
        let columns: Vec<ArrayRef> = combined
            .columns()
            .iter()
            .map(|column| arrow::compute::take(column.as_ref(), &take_indices, None))
            .collect::<Result<_, _>>()?;

        let batch = RecordBatch::try_new(self.schema.arrow_schema().clone(), columns)?;
        Ok(Some(batch))
    }
}

/// Compare two key values honoring direction and null placement.
fn compare_with_key(left: &ScalarValue, right: &ScalarValue, key: &SortKey) -> Ordering {
    match (left.is_null(), right.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => {
            if key.nulls_first {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        }
        (false, true) => {
            if key.nulls_first {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        }
        (false, false) => {
            let ordering = left.compare(right);
            if key.ascending {
                ordering
            } else {
                ordering.reverse()
            }
        }
    }
}

#[async_trait]
impl PhysicalOperator for SortExec {
    fn name(&self) -> &'static str {
        "SortExec"
    }

    fn schema(&self) -> &PhysicalSchema {
        &self.schema
    }

    fn children(&self) -> Vec<&Arc<dyn PhysicalOperator>> {
        vec![&self.input]
    }

    async fn open(&self, ctx: &ExecutionContext) -> FrameResult<()> {
        let mut state = self.state.lock().await;
        *state = SortState::Accumulating;
        drop(state);
        self.input.open(ctx).await
    }

    async fn next(&self) -> FrameResult<Option<RecordBatch>> {
        let mut state = self.state.lock().await;

        match &*state {
            SortState::Uninitialized => Err(FrameError::execution("Operator not opened")),
            SortState::Accumulating => {
                let mut all_batches = Vec::new();
                while let Some(batch) = self.input.next().await? {
                    all_batches.push(batch);
                }

                let result = self.sort_batches(&all_batches)?;
                *state = SortState::Exhausted;
                Ok(result)
            }
            SortState::Exhausted => Ok(None),
        }
    }

    async fn close(&self) -> FrameResult<()> {
        let mut state = self.state.lock().await;
        *state = SortState::Exhausted;
        drop(state);
        self.input.close().await
    }

    fn display(&self) -> String {
        let keys: Vec<String> = self.keys.iter().map(|(key, _)| key.to_string()).collect();
        format!("SortExec({})", keys.join(", "))
    }
}
