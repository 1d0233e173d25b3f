//! Table values and the I/O boundary for flatframe.
//!
//! A [`Table`] is an immutable, materialized dataset: a logical schema
//! plus Arrow record batches. [`RowSource`] and [`RowSink`] are the
//! contracts the engine holds against the outside world; [`CsvSource`]
//! and [`CsvSink`] implement them for header-bearing CSV files.

mod csv;
mod source;
mod table;

pub use csv::{CsvSink, CsvSource};
pub use source::{MemorySource, RowSink, RowSource};
pub use table::Table;
