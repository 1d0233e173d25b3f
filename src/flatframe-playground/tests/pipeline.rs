//! End-to-end test of the movie pipeline over the bundled sample rows,
//! including the CSV output boundary.

use arrow::array::{Array, Float64Array, Int64Array, StringArray};

use flatframe_engine::{LocalExecutor, LocalPhysicalPlanner, PhysicalPlanner};
use flatframe_logical::{AggExpr, LogicalPlan, PlanBuilder, SortKey};
use flatframe_storage::{CsvSink, CsvSource, RowSink, RowSource, Table};

use flatframe_playground::data;

async fn execute(plan: &LogicalPlan, table: Table) -> Table {
    let physical = LocalPhysicalPlanner::new().plan(plan).unwrap();
    LocalExecutor::new()
        .execute(&physical, table)
        .await
        .unwrap()
        .into_table()
        .unwrap()
}

async fn flattened_sample() -> Table {
    let plan = PlanBuilder::scan(data::movie_schema())
        .flatten("genres", data::genre_fields(), "genre_id", "genre_name")
        .flatten("keywords", data::keyword_fields(), "keyword_id", "keyword_name")
        .flatten(
            "production_companies",
            data::production_company_fields(),
            "production_company_id",
            "production_company_name",
        )
        .flatten(
            "production_countries",
            data::production_country_fields(),
            "production_country_id",
            "production_country_name",
        )
        .flatten(
            "spoken_languages",
            data::spoken_language_fields(),
            "spoken_language_id",
            "spoken_language_name",
        )
        .build()
        .unwrap();

    execute(&plan, data::sample_movies().unwrap()).await
}

#[tokio::test]
async fn test_flatten_chain_over_sample() {
    let flattened = flattened_sample().await;

    // Per movie: product of the five array lengths; the movie with an
    // empty genres array contributes nothing.
    // Avatar 2*2, The Avengers 2*1, Un film 1*1, Volver 2*2.
    assert_eq!(flattened.num_rows(), 11);

    // 20 input columns, 5 removed, 10 projected.
    assert_eq!(flattened.num_columns(), 25);
}

#[tokio::test]
async fn test_queries_and_csv_outputs() {
    let flattened = flattened_sample().await;

    let query_a = PlanBuilder::scan(flattened.schema().clone())
        .sort(vec![SortKey::desc("popularity")])
        .aggregate(
            vec!["original_language".to_string()],
            vec![
                AggExpr::max("popularity").with_alias("popularity"),
                AggExpr::first("title").with_alias("most_popular_film"),
            ],
        )
        .build()
        .unwrap();
    let query_b = PlanBuilder::scan(flattened.schema().clone())
        .aggregate(
            vec!["genre_id".to_string(), "genre_name".to_string()],
            vec![AggExpr::count_star().with_alias("movies_numbers")],
        )
        .build()
        .unwrap();

    let popular_films = execute(&query_a, flattened.clone()).await;
    let genre_aggregations = execute(&query_b, flattened.clone()).await;

    // One row per surviving language: en, fr, es.
    assert_eq!(popular_films.num_rows(), 3);
    let batch = &popular_films.batches()[0];
    let languages = batch
        .column(0)
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    let popularity = batch
        .column(1)
        .as_any()
        .downcast_ref::<Float64Array>()
        .unwrap();
    let films = batch
        .column(2)
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();

    // Groups surface in sorted-input order, most popular language first.
    assert_eq!(languages.value(0), "en");
    assert!((popularity.value(0) - 150.44).abs() < 1e-9);
    assert_eq!(films.value(0), "Avatar");

    // count(*) totals across genres equal the flattened row count.
    let mut total = 0;
    for batch in genre_aggregations.batches() {
        let counts = batch
            .column(2)
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap();
        for i in 0..counts.len() {
            total += counts.value(i);
        }
    }
    assert_eq!(total as usize, flattened.num_rows());

    // Write both outputs, read one back and check it survived the
    // round-trip (modulo nothing: row order is deterministic).
    let dir = tempfile::tempdir().unwrap();
    let path_a = dir.path().join("popular_film_per_lan.csv");
    let path_b = dir.path().join("Genres_Aggregations.csv");

    CsvSink::new(&path_a).write(&popular_films).unwrap();
    CsvSink::new(&path_b).write(&genre_aggregations).unwrap();

    let reread = CsvSource::new(&path_a, popular_films.schema().clone())
        .read()
        .unwrap();
    assert_eq!(reread.num_rows(), 3);
    let reread_films = reread.batches()[0]
        .column(2)
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert_eq!(reread_films.value(0), "Avatar");
}
