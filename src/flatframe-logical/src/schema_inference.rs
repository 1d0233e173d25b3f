//! Schema inference and validation for logical plans.
//!
//! Every column reference in a plan is resolved and type-checked here,
//! before any row is processed. Failures surface as `SchemaError` or
//! `TypeError` with the offending column named.

use common_error::{ensure, schema_err, type_err, FrameResult};
use flatframe_core::{ColumnDef, DataType, Schema};

use crate::ops::{AggregateOp, FlattenOp, LogicalOp, SortOp};

/// Infer the output schema of an operator chain.
pub fn infer_schema(op: &LogicalOp) -> FrameResult<Schema> {
    match op {
        LogicalOp::Scan(scan) => Ok(scan.schema.clone()),
        LogicalOp::Flatten(flatten) => infer_flatten(flatten),
        LogicalOp::Sort(sort) => infer_sort(sort),
        LogicalOp::Aggregate(aggregate) => infer_aggregate(aggregate),
    }
}

fn infer_sort(op: &SortOp) -> FrameResult<Schema> {
    let input = infer_schema(&op.input)?;

    ensure!(
        !op.keys.is_empty(),
        SchemaError: "sort requires at least one key"
    );
    for key in &op.keys {
        let Some(col) = input.column(&key.column) else {
            schema_err!("sort key '{}' not found in input schema", key.column);
        };
        if col.data_type.is_nested() {
            type_err!("cannot sort on nested column '{}'", key.column);
        }
    }

    // Sorting only reorders rows.
    Ok(input)
}

fn infer_flatten(op: &FlattenOp) -> FrameResult<Schema> {
    let input = infer_schema(&op.input)?;

    let Some(source) = input.column(&op.column) else {
        schema_err!("flatten column '{}' not found in input schema", op.column);
    };

    // The source must be the raw string encoding or a declared nested
    // array matching the requested record shape.
    match &source.data_type {
        DataType::String => {}
        DataType::NestedRecordArray(declared) => {
            ensure!(
                declared == &op.fields,
                SchemaError:
                "flatten column '{}' declares record shape {} but the operator expects a different shape",
                op.column,
                source.data_type
            );
        }
        other => {
            schema_err!(
                "flatten column '{}' has type {}, which cannot hold a nested array",
                op.column,
                other
            );
        }
    }

    ensure!(
        op.fields.len() == 2,
        SchemaError: "flatten of '{}' requires exactly 2 record fields, got {}",
        op.column,
        op.fields.len()
    );
    for field in &op.fields {
        ensure!(
            matches!(field.data_type, DataType::Int64 | DataType::String),
            SchemaError: "flatten field '{}' of '{}' must be Int64 or String",
            field.name,
            op.column
        );
    }

    // Source column removed, the two projected columns appended.
    let mut columns: Vec<ColumnDef> = input
        .columns()
        .iter()
        .filter(|c| c.name != op.column)
        .cloned()
        .collect();
    columns.push(ColumnDef::new(&op.id_output, op.fields[0].data_type.clone()));
    columns.push(ColumnDef::new(
        &op.name_output,
        op.fields[1].data_type.clone(),
    ));

    // Schema::new rejects collisions between the projected names and the
    // surviving columns.
    Schema::new(columns)
}

fn infer_aggregate(op: &AggregateOp) -> FrameResult<Schema> {
    let input = infer_schema(&op.input)?;

    ensure!(
        !op.keys.is_empty(),
        SchemaError: "aggregate requires at least one grouping key"
    );

    let mut columns = Vec::with_capacity(op.keys.len() + op.aggs.len());

    for key in &op.keys {
        let Some(col) = input.column(key) else {
            schema_err!("grouping key '{key}' not found in input schema");
        };
        if !col.data_type.is_groupable() {
            type_err!(
                "cannot group on column '{}' of type {}",
                key,
                col.data_type
            );
        }
        columns.push(col.clone());
    }

    for agg in &op.aggs {
        let input_type = match &agg.column {
            Some(name) => {
                let Some(col) = input.column(name) else {
                    schema_err!("aggregate column '{name}' not found in input schema");
                };
                Some(&col.data_type)
            }
            None => None,
        };

        let Some(result_type) = agg.func.result_type(input_type) else {
            type_err!(
                "{} is not valid for column '{}' of type {}",
                agg.func,
                agg.column.as_deref().unwrap_or("*"),
                input_type.map_or_else(|| "*".to_string(), ToString::to_string)
            );
        };

        let nullable = !matches!(agg.func, crate::expr::AggFunc::Count);
        columns.push(ColumnDef::new(agg.output_name(), result_type).with_nullable(nullable));
    }

    Schema::new(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::AggExpr;
    use crate::ops::ScanOp;
    use common_error::FrameError;
    use flatframe_core::NestedField;

    fn movie_schema() -> Schema {
        Schema::new(vec![
            ColumnDef::new("title", DataType::String),
            ColumnDef::new("original_language", DataType::String),
            ColumnDef::new("popularity", DataType::Float64),
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

    fn flatten_genres(input: LogicalOp) -> LogicalOp {
        LogicalOp::Flatten(FlattenOp::new(
            input,
            "genres",
            genre_fields(),
            "genre_id",
            "genre_name",
        ))
    }

    #[test]
    fn test_flatten_schema() {
        let scan = LogicalOp::scan(ScanOp::new(movie_schema()));
        let schema = infer_schema(&flatten_genres(scan)).unwrap();

        assert_eq!(
            schema.column_names(),
            vec![
                "title",
                "original_language",
                "popularity",
                "genre_id",
                "genre_name"
            ]
        );
        assert_eq!(
            schema.column("genre_id").unwrap().data_type,
            DataType::Int64
        );
    }

    #[test]
    fn test_flatten_unknown_column() {
        let scan = LogicalOp::scan(ScanOp::new(movie_schema()));
        let op = LogicalOp::Flatten(FlattenOp::new(
            scan,
            "keywords",
            genre_fields(),
            "keyword_id",
            "keyword_name",
        ));

        assert!(matches!(
            infer_schema(&op),
            Err(FrameError::SchemaError(_))
        ));
    }

    #[test]
    fn test_flatten_incompatible_type() {
        let scan = LogicalOp::scan(ScanOp::new(movie_schema()));
        let op = LogicalOp::Flatten(FlattenOp::new(
            scan,
            "popularity",
            genre_fields(),
            "id",
            "name",
        ));

        assert!(matches!(
            infer_schema(&op),
            Err(FrameError::SchemaError(_))
        ));
    }

    #[test]
    fn test_flatten_output_collision() {
        let scan = LogicalOp::scan(ScanOp::new(movie_schema()));
        let op = LogicalOp::Flatten(FlattenOp::new(
            scan,
            "genres",
            genre_fields(),
            "title",
            "genre_name",
        ));

        assert!(matches!(
            infer_schema(&op),
            Err(FrameError::SchemaError(_))
        ));
    }

    #[test]
    fn test_aggregate_schema() {
        let scan = LogicalOp::scan(ScanOp::new(movie_schema()));
        let op = LogicalOp::Aggregate(AggregateOp::new(
            scan,
            vec!["original_language".to_string()],
            vec![
                AggExpr::max("popularity").with_alias("popularity"),
                AggExpr::first("title").with_alias("most_popular_film"),
            ],
        ));

        let schema = infer_schema(&op).unwrap();
        assert_eq!(
            schema.column_names(),
            vec!["original_language", "popularity", "most_popular_film"]
        );
        assert_eq!(
            schema.column("popularity").unwrap().data_type,
            DataType::Float64
        );
    }

    #[test]
    fn test_sort_passes_schema_through() {
        let scan = LogicalOp::scan(ScanOp::new(movie_schema()));
        let op = LogicalOp::Sort(crate::ops::SortOp::new(
            scan,
            vec![crate::ops::SortKey::desc("popularity")],
        ));

        let schema = infer_schema(&op).unwrap();
        assert_eq!(schema, movie_schema());
    }

    #[test]
    fn test_sort_unknown_key() {
        let scan = LogicalOp::scan(ScanOp::new(movie_schema()));
        let op = LogicalOp::Sort(crate::ops::SortOp::new(
            scan,
            vec![crate::ops::SortKey::asc("rating")],
        ));

        assert!(matches!(
            infer_schema(&op),
            Err(FrameError::SchemaError(_))
        ));
    }

    #[test]
    fn test_aggregate_unknown_key() {
        let scan = LogicalOp::scan(ScanOp::new(movie_schema()));
        let op = LogicalOp::Aggregate(AggregateOp::new(
            scan,
            vec!["language".to_string()],
            vec![AggExpr::count_star().with_alias("n")],
        ));

        assert!(matches!(
            infer_schema(&op),
            Err(FrameError::SchemaError(_))
        ));
    }

    #[test]
    fn test_aggregate_max_on_string_is_type_error() {
        let scan = LogicalOp::scan(ScanOp::new(movie_schema()));
        let op = LogicalOp::Aggregate(AggregateOp::new(
            scan,
            vec!["original_language".to_string()],
            vec![AggExpr::max("title")],
        ));

        assert!(matches!(infer_schema(&op), Err(FrameError::TypeError(_))));
    }

    #[test]
    fn test_aggregate_float_key_is_type_error() {
        let scan = LogicalOp::scan(ScanOp::new(movie_schema()));
        let op = LogicalOp::Aggregate(AggregateOp::new(
            scan,
            vec!["popularity".to_string()],
            vec![AggExpr::count_star()],
        ));

        assert!(matches!(infer_schema(&op), Err(FrameError::TypeError(_))));
    }
}
