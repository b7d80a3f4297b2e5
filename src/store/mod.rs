//! Identifiers, value types and the run registry.
pub mod registry;
pub mod types;

pub use registry::RunRegistry;
pub use types::{Params, RunId, Seeds, Signal, SimulationId, State, Value};
