//! The TMDB movie schema and a small in-memory sample dataset.

use std::sync::Arc;

use arrow::array::{Date32Array, Float32Array, Float64Array, Int64Array, StringArray};
use arrow::record_batch::RecordBatch;

use common_error::FrameResult;
use flatframe_core::{ColumnDef, DataType, NestedField, Schema};
use flatframe_storage::Table;

/// The 20-column input schema of the TMDB movies CSV.
///
/// The nested columns (genres, keywords, production companies/countries,
/// spoken languages) arrive as JSON strings and are declared String
/// here; their record shapes are supplied to the flatten stages.
pub fn movie_schema() -> Schema {
    Schema::new(vec![
        ColumnDef::new("budget", DataType::Float64),
        ColumnDef::new("genres", DataType::String),
        ColumnDef::new("homepage", DataType::String),
        ColumnDef::new("id", DataType::String),
        ColumnDef::new("keywords", DataType::String),
        ColumnDef::new("original_language", DataType::String),
        ColumnDef::new("original_title", DataType::String),
        ColumnDef::new("overview", DataType::String),
        ColumnDef::new("popularity", DataType::Float64),
        ColumnDef::new("production_companies", DataType::String),
        ColumnDef::new("production_countries", DataType::String),
        ColumnDef::new("release_date", DataType::Date),
        ColumnDef::new("revenue", DataType::Float32),
        ColumnDef::new("runtime", DataType::Float32),
        ColumnDef::new("spoken_languages", DataType::String),
        ColumnDef::new("status", DataType::String),
        ColumnDef::new("tagline", DataType::String),
        ColumnDef::new("title", DataType::String),
        ColumnDef::new("vote_average", DataType::Float32),
        ColumnDef::new("vote_count", DataType::Int64),
    ])
    // The column list is static and free of duplicates.
    .expect("movie schema is valid")
}

/// Record shape of the `genres` column.
pub fn genre_fields() -> Vec<NestedField> {
    vec![
        NestedField::new("id", DataType::Int64),
        NestedField::new("name", DataType::String),
    ]
}

/// Record shape of the `keywords` column.
pub fn keyword_fields() -> Vec<NestedField> {
    vec![
        NestedField::new("id", DataType::Int64),
        NestedField::new("name", DataType::String),
    ]
}

/// Record shape of the `production_companies` column.
pub fn production_company_fields() -> Vec<NestedField> {
    vec![
        NestedField::new("id", DataType::Int64),
        NestedField::new("name", DataType::String),
    ]
}

/// Record shape of the `production_countries` column.
pub fn production_country_fields() -> Vec<NestedField> {
    vec![
        NestedField::new("iso_3166_1", DataType::String),
        NestedField::new("name", DataType::String),
    ]
}

/// Record shape of the `spoken_languages` column.
pub fn spoken_language_fields() -> Vec<NestedField> {
    vec![
        NestedField::new("iso_639_1", DataType::String),
        NestedField::new("name", DataType::String),
    ]
}

/// A handful of sample movies for running the pipeline without the real
/// dataset. One row carries an empty genres array so the drop semantics
/// are visible in the demo output.
pub fn sample_movies() -> FrameResult<Table> {
    let schema = movie_schema();

    let genres = StringArray::from(vec![
        Some(r#"[{"id":28,"name":"Action"},{"id":12,"name":"Adventure"}]"#),
        Some(r#"[{"id":28,"name":"Action"},{"id":878,"name":"Science Fiction"}]"#),
        Some(r#"[{"id":18,"name":"Drama"}]"#),
        Some("[]"),
        Some(r#"[{"id":35,"name":"Comedy"},{"id":18,"name":"Drama"}]"#),
    ]);
    let keywords = StringArray::from(vec![
        Some(r#"[{"id":1463,"name":"culture clash"},{"id":2964,"name":"future"}]"#),
        Some(r#"[{"id":851,"name":"dual identity"}]"#),
        Some(r#"[{"id":1326,"name":"infidelity"}]"#),
        Some(r#"[{"id":4344,"name":"musical"}]"#),
        Some(r#"[{"id":248,"name":"date"},{"id":699,"name":"fiance"}]"#),
    ]);
    let production_companies = StringArray::from(vec![
        Some(r#"[{"id":289,"name":"Ingenious Film Partners"}]"#),
        Some(r#"[{"id":420,"name":"Marvel Studios"}]"#),
        Some(r#"[{"id":25,"name":"20th Century Fox"}]"#),
        Some(r#"[{"id":5,"name":"Columbia Pictures"}]"#),
        Some(r#"[{"id":4,"name":"Paramount Pictures"}]"#),
    ]);
    let production_countries = StringArray::from(vec![
        Some(r#"[{"iso_3166_1":"US","name":"United States of America"}]"#),
        Some(r#"[{"iso_3166_1":"US","name":"United States of America"}]"#),
        Some(r#"[{"iso_3166_1":"FR","name":"France"}]"#),
        Some(r#"[{"iso_3166_1":"US","name":"United States of America"}]"#),
        Some(r#"[{"iso_3166_1":"ES","name":"Spain"}]"#),
    ]);
    let spoken_languages = StringArray::from(vec![
        Some(r#"[{"iso_639_1":"en","name":"English"}]"#),
        Some(r#"[{"iso_639_1":"en","name":"English"}]"#),
        Some(r#"[{"iso_639_1":"fr","name":"Français"}]"#),
        Some(r#"[{"iso_639_1":"en","name":"English"}]"#),
        Some(r#"[{"iso_639_1":"es","name":"Español"}]"#),
    ]);

    let batch = RecordBatch::try_new(
        schema.to_arrow(),
        vec![
            Arc::new(Float64Array::from(vec![
                237_000_000.0,
                220_000_000.0,
                30_000_000.0,
                11_000_000.0,
                40_000_000.0,
            ])),
            Arc::new(genres),
            Arc::new(StringArray::from(vec![None::<&str>, None, None, None, None])),
            Arc::new(StringArray::from(vec!["19995", "24428", "222", "11036", "4011"])),
            Arc::new(keywords),
            Arc::new(StringArray::from(vec!["en", "en", "fr", "en", "es"])),
            Arc::new(StringArray::from(vec![
                "Avatar",
                "The Avengers",
                "Un film",
                "The Broadway Melody",
                "Volver",
            ])),
            Arc::new(StringArray::from(vec![None::<&str>, None, None, None, None])),
            Arc::new(Float64Array::from(vec![150.44, 144.45, 22.1, 5.92, 38.78])),
            Arc::new(production_companies),
            Arc::new(production_countries),
            Arc::new(Date32Array::from(vec![
                Some(14588),
                Some(15455),
                Some(13200),
                Some(-14900),
                Some(13300),
            ])),
            Arc::new(Float32Array::from(vec![
                2_787_965_000.0,
                1_519_557_900.0,
                12_000_000.0,
                4_358_000.0,
                85_590_000.0,
            ])),
            Arc::new(Float32Array::from(vec![162.0, 143.0, 110.0, 100.0, 121.0])),
            Arc::new(spoken_languages),
            Arc::new(StringArray::from(vec![
                "Released", "Released", "Released", "Released", "Released",
            ])),
            Arc::new(StringArray::from(vec![None::<&str>, None, None, None, None])),
            Arc::new(StringArray::from(vec![
                "Avatar",
                "The Avengers",
                "Un film",
                "The Broadway Melody",
                "Volver",
            ])),
            Arc::new(Float32Array::from(vec![7.2, 7.4, 6.3, 5.8, 7.1])),
            Arc::new(Int64Array::from(vec![11800, 11776, 410, 81, 842])),
        ],
    )?;

    Table::try_new(schema, vec![batch])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_schema_shape() {
        let schema = movie_schema();
        assert_eq!(schema.len(), 20);
        assert_eq!(schema.column("release_date").unwrap().data_type, DataType::Date);
        assert_eq!(schema.column("vote_count").unwrap().data_type, DataType::Int64);
    }

    #[test]
    fn test_sample_movies() {
        let table = sample_movies().unwrap();
        assert_eq!(table.num_rows(), 5);
        assert_eq!(table.num_columns(), 20);
    }
}
