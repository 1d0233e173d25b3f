//! Physical planning.

mod local;

pub use local::{LocalPhysicalPlanner, PhysicalPlanner};
