//! Runnable flatframe pipelines.
//!
//! This crate provides the TMDB movie schema, a small in-memory sample
//! dataset, and result-printing helpers, plus the `movie-etl` binary:
//!
//! ```bash
//! # Run against the real dataset
//! cargo run --package flatframe-playground --bin movie-etl -- \
//!     --input tmdb_5000_movies.csv --out-dir data
//!
//! # Run against the bundled sample rows
//! cargo run --package flatframe-playground --bin movie-etl
//! ```

pub mod data;
pub mod utils;

pub use data::{
    genre_fields, keyword_fields, movie_schema, production_company_fields,
    production_country_fields, sample_movies, spoken_language_fields,
};
pub use utils::{format_batch, print_header, print_results};
