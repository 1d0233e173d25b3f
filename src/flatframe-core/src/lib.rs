//! Core data model for flatframe.
//!
//! Defines the logical type system ([`DataType`], [`Value`]), schemas
//! validated at construction ([`Schema`], [`ColumnDef`]), and the parser
//! for JSON-encoded nested array-of-record cells.

pub mod schema;
pub mod types;

pub use schema::{parse_nested_cell, ColumnDef, NestedRecord, Schema};
pub use types::{DataType, NestedField, Value};
