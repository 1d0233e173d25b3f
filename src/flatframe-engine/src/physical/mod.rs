//! Physical plan model.

mod plan;
mod schema;

pub use plan::PhysicalPlan;
pub use schema::PhysicalSchema;
