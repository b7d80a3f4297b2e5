//! Configuration compiler for a discrete-time simulation engine.
//!
//! A model is declared once as update blocks (policies and state update
//! functions per substep), an initial state and optional exogenous
//! processes. [`append_configs`] expands a sweep of sim configs into
//! independent runs, each carrying its own copy of the settings and an
//! [`ExecutionPlan`] in which every gap has been filled with an identity.

pub mod analysis;
pub mod compile;
pub mod config;
pub mod display;
pub mod error;
pub mod model;
pub mod store;

pub use compile::{generate_plan, ExecutionPlan, PlanCompiler, PlanShape, Substep};
pub use config::{append_configs, ExogenousFn, ModelSpec, RunConfig, SimConfig, SimConfigs, SweepSpec};
pub use error::ConfigError;
pub use model::{Identity, PartialStateUpdates, PolicyFn, PolicyOp, StateUpdateFn, StepContext, UpdateBlock};
pub use store::{RunRegistry, State, Value};
