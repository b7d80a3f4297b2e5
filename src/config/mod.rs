//! Run configurations and the sweep expander that produces them.
pub mod exogenous;
pub mod run;
pub mod sim;
pub mod sweep;

pub use exogenous::{per_timestep, ExogenousFn, ExogenousStates};
pub use run::{RunConfig, SharedModel};
pub use sim::{SimConfig, SimConfigs, SweepSpec};
pub use sweep::{append_configs, ModelSpec};
