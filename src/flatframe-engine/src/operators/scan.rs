//! Table scan execution operator.

use std::sync::Arc;

use arrow::record_batch::RecordBatch;
use async_trait::async_trait;

use common_error::{FrameError, FrameResult};
use flatframe_core::Schema;

use crate::executor::ExecutionContext;
use crate::operators::PhysicalOperator;
use crate::physical::PhysicalSchema;

/// Internal state for the scan operator.
#[derive(Debug, Default)]
enum ScanState {
    #[default]
    Uninitialized,
    Open {
        batches: Vec<RecordBatch>,
        next: usize,
    },
    Exhausted,
    Closed,
}

/// Table scan execution operator.
///
/// The leaf of every pipeline: yields the batches of the table bound in
/// the [`ExecutionContext`], in insertion order. The context table's
/// schema must match the scan's declared schema; the mismatch is
/// reported before any batch is produced.
#[derive(Debug)]
pub struct TableScanExec {
    /// Declared source schema.
    schema: PhysicalSchema,
    /// Execution state.
    state: tokio::sync::Mutex<ScanState>,
}

impl TableScanExec {
    /// Create a scan with the declared source schema.
    pub fn new(schema: Schema) -> Self {
        Self {
            schema: PhysicalSchema::new(schema),
            state: tokio::sync::Mutex::new(ScanState::Uninitialized),
        }
    }
}

#[async_trait]
impl PhysicalOperator for TableScanExec {
    fn name(&self) -> &'static str {
        "TableScanExec"
    }

    fn schema(&self) -> &PhysicalSchema {
        &self.schema
    }

    fn children(&self) -> Vec<&Arc<dyn PhysicalOperator>> {
        vec![]
    }

    async fn open(&self, ctx: &ExecutionContext) -> FrameResult<()> {
        if ctx.table.schema() != self.schema.logical() {
            return Err(FrameError::schema_error(
                "row source schema does not match the scan's declared schema",
            ));
        }

        let mut state = self.state.lock().await;
        *state = ScanState::Open {
            batches: ctx.table.batches().to_vec(),
            next: 0,
        };
        Ok(())
    }

    async fn next(&self) -> FrameResult<Option<RecordBatch>> {
        let mut state = self.state.lock().await;

        match &mut *state {
            ScanState::Uninitialized => Err(FrameError::execution("Operator not opened")),
            ScanState::Open { batches, next } => {
                if *next < batches.len() {
                    let batch = batches[*next].clone();
                    *next += 1;
                    Ok(Some(batch))
                } else {
                    *state = ScanState::Exhausted;
                    Ok(None)
                }
            }
            ScanState::Exhausted | ScanState::Closed => Ok(None),
        }
    }

    async fn close(&self) -> FrameResult<()> {
        let mut state = self.state.lock().await;
        *state = ScanState::Closed;
        Ok(())
    }

    fn display(&self) -> String {
        format!("TableScanExec({} columns)", self.schema.num_columns())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::StringArray;
    use flatframe_core::{ColumnDef, DataType};
    use flatframe_storage::Table;

    fn title_schema() -> Schema {
        Schema::new(vec![ColumnDef::new("title", DataType::String)]).unwrap()
    }

    fn title_table() -> Table {
        let schema = title_schema();
        let batch = RecordBatch::try_new(
            schema.to_arrow(),
            vec![Arc::new(StringArray::from(vec!["A", "B"]))],
        )
        .unwrap();
        Table::try_new(schema, vec![batch]).unwrap()
    }

    #[tokio::test]
    async fn test_scan_yields_batches_in_order() {
        let op = TableScanExec::new(title_schema());
        let ctx = ExecutionContext::new(title_table());

        op.open(&ctx).await.unwrap();

        let batch = op.next().await.unwrap().unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert!(op.next().await.unwrap().is_none());

        op.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_scan_empty_table() {
        let op = TableScanExec::new(title_schema());
        let ctx = ExecutionContext::new(Table::empty(title_schema()));

        op.open(&ctx).await.unwrap();
        assert!(op.next().await.unwrap().is_none());
        op.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_scan_schema_mismatch() {
        let other = Schema::new(vec![ColumnDef::new("name", DataType::String)]).unwrap();
        let op = TableScanExec::new(other);
        let ctx = ExecutionContext::new(title_table());

        assert!(matches!(
            op.open(&ctx).await,
            Err(FrameError::SchemaError(_))
        ));
    }

    #[tokio::test]
    async fn test_scan_next_before_open() {
        let op = TableScanExec::new(title_schema());
        assert!(op.next().await.is_err());
    }
}
