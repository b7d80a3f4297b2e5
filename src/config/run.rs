//! One fully resolved, independently executable simulation run.
use super::exogenous::ExogenousStates;
use super::sim::SimConfig;
use crate::compile::plan::{ExecutionPlan, PlanCompiler, PlanShape};
use crate::error::ConfigError;
use crate::model::{normalize, Identity, PartialStateUpdates, PolicyOp, StateUpdateFn, UpdateBlock};
use crate::store::{RunId, Seeds, SimulationId, State};

/// Declarations shared by every run of one compilation call. Exogenous
/// processes are already resolved into state updates.
#[derive(Debug, Clone, Default)]
pub struct SharedModel {
    pub initial_state: State,
    pub seeds: Seeds,
    pub env_processes: ExogenousStates,
    pub exogenous_states: Vec<StateUpdateFn>,
    pub partial_state_updates: PartialStateUpdates,
    pub policy_ops: Vec<PolicyOp>,
    pub identity: Identity,
}

/// Read-only after construction. Functions are shared with the other runs
/// of the sweep; `sim_config` and the state data are this run's own copies.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub sim_config: SimConfig,
    pub initial_state: State,
    pub seeds: Seeds,
    pub env_processes: ExogenousStates,
    pub exogenous_states: Vec<StateUpdateFn>,
    /// Canonical blocks, after legacy-shape normalization.
    pub partial_state_updates: Vec<UpdateBlock>,
    pub policy_ops: Vec<PolicyOp>,
    pub plan: ExecutionPlan,
    pub plan_shape: PlanShape,

    pub user_id: String,
    pub session_id: String,
    pub simulation_id: SimulationId,
    pub run_id: RunId,
}

impl RunConfig {
    /// Builds a run from a sim config that already carries its identifiers.
    ///
    /// Normalizer errors are returned as is.
    pub fn new(user_id: &str, sim_config: SimConfig, shared: &SharedModel) -> Result<Self, ConfigError> {
        let simulation_id = sim_config.simulation_id.ok_or(ConfigError::MissingIdentifier { field: "simulation_id" })?;
        let run_id = sim_config.run_id.ok_or(ConfigError::MissingIdentifier { field: "run_id" })?;

        let partial_state_updates = normalize(&shared.partial_state_updates)?;
        let (plan, plan_shape) = PlanCompiler::new(&shared.identity).compile(
            &shared.initial_state,
            &partial_state_updates,
            &shared.exogenous_states,
        );

        Ok(Self {
            sim_config,
            initial_state: shared.initial_state.clone(),
            seeds: shared.seeds.clone(),
            env_processes: shared.env_processes.clone(),
            exogenous_states: shared.exogenous_states.clone(),
            partial_state_updates,
            policy_ops: shared.policy_ops.clone(),
            plan,
            plan_shape,
            user_id: user_id.to_string(),
            session_id: session_id(user_id, simulation_id, run_id),
            simulation_id,
            run_id,
        })
    }

    pub fn plan(&self) -> &ExecutionPlan { &self.plan }
}

/// `"{user_id}={simulation_id}_{run_id}"`
pub fn session_id(user_id: &str, simulation_id: SimulationId, run_id: RunId) -> String {
    format!("{}={}_{}", user_id, simulation_id, run_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LegacyBlock, PolicyFn};
    use crate::store::{Signal, Value};
    use indexmap::IndexMap;

    fn stamped(sim: u32, run: u32) -> SimConfig {
        let mut cfg = SimConfig::new(1, 0..3);
        cfg.simulation_id = Some(SimulationId(sim));
        cfg.run_id = Some(RunId(run));
        cfg
    }

    #[test]
    fn test_run_normalizes_legacy_blocks() {
        let legacy = LegacyBlock {
            behaviors: IndexMap::from([("b".to_string(), PolicyFn::new("b", |_| Signal::new()))]),
            states: IndexMap::from([(
                "s".to_string(),
                StateUpdateFn::new("s", |_, _| ("s".to_string(), Value::Null)),
            )]),
        };
        let shared = SharedModel {
            partial_state_updates: PartialStateUpdates::List(vec![legacy.into()]),
            ..Default::default()
        };

        let run = RunConfig::new("alice", stamped(2, 1), &shared).unwrap();
        assert_eq!(run.session_id, "alice=2_1");
        assert_eq!(run.partial_state_updates.len(), 1);
        assert!(run.partial_state_updates[0].policies().contains_key("b"));
        assert_eq!(run.plan().len(), 1);
        assert_eq!(run.plan_shape, PlanShape::Declared);
    }

    #[test]
    fn test_run_requires_identifiers() {
        let shared = SharedModel::default();
        let err = RunConfig::new("u", SimConfig::new(1, 0..1), &shared).unwrap_err();
        assert_eq!(err, ConfigError::MissingIdentifier { field: "simulation_id" });
    }
}
