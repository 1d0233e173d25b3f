//! Aggregate expressions.

mod agg;

pub use agg::{AggExpr, AggFunc};
