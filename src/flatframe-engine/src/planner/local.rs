//! Lowering of logical plans to physical operator pipelines.

use std::sync::Arc;

use common_error::FrameResult;
use flatframe_logical::{LogicalOp, LogicalPlan};

use crate::operators::{FlattenExec, HashAggregateExec, PhysicalOperator, SortExec, TableScanExec};
use crate::physical::PhysicalPlan;

/// Trait for physical planners.
pub trait PhysicalPlanner {
    /// Lower a logical plan to an executable physical plan.
    fn plan(&self, plan: &LogicalPlan) -> FrameResult<PhysicalPlan>;
}

/// Physical planner for local execution.
///
/// Lowers each logical operator to its physical counterpart in chain
/// order; operator constructors re-resolve and re-check every column
/// reference, so a plan that lowers successfully cannot fail on schema
/// grounds at execution time.
#[derive(Debug, Default)]
pub struct LocalPhysicalPlanner;

impl LocalPhysicalPlanner {
    /// Create a new planner.
    pub fn new() -> Self {
        Self
    }

    fn build(&self, op: &LogicalOp) -> FrameResult<Arc<dyn PhysicalOperator>> {
        match op {
            LogicalOp::Scan(scan) => Ok(Arc::new(TableScanExec::new(scan.schema.clone()))),
            LogicalOp::Flatten(flatten) => {
                let input = self.build(&flatten.input)?;
                Ok(Arc::new(FlattenExec::try_new(
                    input,
                    &flatten.column,
                    flatten.fields.clone(),
                    &flatten.id_output,
                    &flatten.name_output,
                )?))
            }
            LogicalOp::Sort(sort) => {
                let input = self.build(&sort.input)?;
                Ok(Arc::new(SortExec::try_new(input, sort.keys.clone())?))
            }
            LogicalOp::Aggregate(aggregate) => {
                let input = self.build(&aggregate.input)?;
                Ok(Arc::new(HashAggregateExec::try_new(
                    input,
                    aggregate.keys.clone(),
                    aggregate.aggs.clone(),
                )?))
            }
        }
    }
}

impl PhysicalPlanner for LocalPhysicalPlanner {
    fn plan(&self, plan: &LogicalPlan) -> FrameResult<PhysicalPlan> {
        let root = self.build(plan.root())?;
        Ok(PhysicalPlan::new(root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flatframe_core::{ColumnDef, DataType, NestedField, Schema};
    use flatframe_logical::{AggExpr, PlanBuilder};

    fn movie_schema() -> Schema {
        Schema::new(vec![
            ColumnDef::new("original_language", DataType::String),
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

    #[test]
    fn test_plan_full_chain() {
        let logical = PlanBuilder::scan(movie_schema())
            .flatten("genres", genre_fields(), "genre_id", "genre_name")
            .aggregate(
                vec!["genre_id".to_string(), "genre_name".to_string()],
                vec![AggExpr::count_star().with_alias("movies_numbers")],
            )
            .build()
            .unwrap();

        let physical = LocalPhysicalPlanner::new().plan(&logical).unwrap();

        assert_eq!(
            physical.schema().field_names(),
            vec!["genre_id", "genre_name", "movies_numbers"]
        );

        let explain = physical.explain();
        assert!(explain.contains("HashAggregateExec"));
        assert!(explain.contains("FlattenExec"));
        assert!(explain.contains("TableScanExec"));
    }
}
