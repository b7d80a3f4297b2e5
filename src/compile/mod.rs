//! Turns update blocks into the execution plan an engine iterates.
pub mod matrix;
pub mod plan;

pub use matrix::{MatrixField, PolicyField, VariableField};
pub use plan::{generate_plan, ExecutionPlan, PlanCompiler, PlanShape, Substep};
