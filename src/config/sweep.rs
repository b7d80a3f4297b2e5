//! Expands a model specification into independent runs on a registry.
use super::exogenous::{every_substep, per_timestep, ExogenousStates};
use super::run::{RunConfig, SharedModel};
use super::sim::{SimConfig, SimConfigs};
use crate::error::ConfigError;
use crate::model::{Identity, PartialStateUpdates, PolicyOp};
use crate::store::{RunId, RunRegistry, Seeds, SimulationId, State};

pub const DEFAULT_USER_ID: &str = "stepwise_user";

/// Everything a model author declares once, shared by all runs of a sweep.
///
/// `Default` builds fresh empty containers on every call and a policy
/// operator list of `[sum]`.
#[derive(Debug, Clone)]
pub struct ModelSpec {
    pub user_id: String,
    pub initial_state: State,
    pub seeds: Seeds,
    pub raw_exogenous_states: ExogenousStates,
    pub env_processes: ExogenousStates,
    pub partial_state_update_blocks: PartialStateUpdates,
    pub policy_ops: Vec<PolicyOp>,
    pub identity: Identity,
    /// Wrap exogenous processes to fire once per timestep instead of every substep.
    pub exo_update_per_ts: bool,
}

impl Default for ModelSpec {
    fn default() -> Self {
        Self {
            user_id: DEFAULT_USER_ID.to_string(),
            initial_state: State::new(),
            seeds: Seeds::new(),
            raw_exogenous_states: ExogenousStates::new(),
            env_processes: ExogenousStates::new(),
            partial_state_update_blocks: PartialStateUpdates::default(),
            policy_ops: vec![PolicyOp::sum()],
            identity: Identity::default(),
            exo_update_per_ts: true,
        }
    }
}

impl ModelSpec {
    pub fn new(initial_state: State, blocks: impl Into<PartialStateUpdates>) -> Self {
        Self { initial_state, partial_state_update_blocks: blocks.into(), ..Default::default() }
    }

    fn share(&self) -> SharedModel {
        let exogenous_states = if self.exo_update_per_ts {
            per_timestep(&self.raw_exogenous_states)
        } else {
            every_substep(&self.raw_exogenous_states)
        };
        tracing::debug!(
            processes = exogenous_states.len(),
            per_timestep = self.exo_update_per_ts,
            "resolved exogenous processes"
        );

        SharedModel {
            initial_state: self.initial_state.clone(),
            seeds: self.seeds.clone(),
            env_processes: self.env_processes.clone(),
            exogenous_states,
            partial_state_updates: self.partial_state_update_blocks.clone(),
            policy_ops: self.policy_ops.clone(),
            identity: self.identity.clone(),
        }
    }
}

/// Expands `sim_configs` into runs and appends them to `registry`.
///
/// Every element becomes one replica group sharing a `simulation_id`; the
/// first group continues after the registry's last id. Replicas of a group
/// carry `run_id` 0..N and `N = 1`. Elements are committed one at a time: a
/// failing element appends nothing, but groups before it stay registered.
///
/// Returns the number of runs appended.
pub fn append_configs(
    registry: &mut RunRegistry,
    model: &ModelSpec,
    sim_configs: impl Into<SimConfigs>,
) -> Result<usize, ConfigError> {
    // 1. Resolve exogenous processes once for the whole call
    let shared = model.share();

    // 2. A single config is a one-element batch
    let sim_configs = sim_configs.into().into_vec();

    // 3. Group ids continue after whatever is already registered
    let first_group = registry.next_simulation_id();
    let mut group = first_group;
    let mut appended = 0;

    for (element, sim_config) in sim_configs.iter().enumerate() {
        // 4. Replicate, copying before each replica is stamped
        let replicas = replicate(element, sim_config, group)?;

        // 5. Build every run of the element before any of them is registered
        let runs = replicas
            .into_iter()
            .map(|replica| RunConfig::new(&model.user_id, replica, &shared))
            .collect::<Result<Vec<_>, _>>()?;

        let count = runs.len();
        for run in runs {
            tracing::debug!(session_id = %run.session_id, substeps = run.plan.len(), "registered run");
            registry.push(run);
        }
        appended += count;
        group = SimulationId(group.0 + count as u32);
    }

    tracing::info!(
        user_id = %model.user_id,
        first_simulation_id = %first_group,
        groups = sim_configs.len(),
        runs = appended,
        "expanded sweep into runs"
    );
    Ok(appended)
}

/// Copies of `sim_config`, one per replication, stamped with their ids.
pub fn replicate(element: usize, sim_config: &SimConfig, group: SimulationId) -> Result<Vec<SimConfig>, ConfigError> {
    let n = sim_config.n.ok_or(ConfigError::MissingField { element, field: "N" })?;
    if n == 0 {
        return Err(ConfigError::InvalidReplication { element, n });
    }

    Ok((0..n)
        .map(|run| {
            let mut replica = sim_config.clone();
            replica.simulation_id = Some(group);
            replica.run_id = Some(RunId(run));
            replica.n = Some(1);
            replica
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::plan::PlanShape;
    use crate::config::exogenous::ExogenousFn;
    use crate::model::{StateUpdateFn, UpdateBlock};
    use crate::store::Value;
    use serde_json::json;

    fn model() -> ModelSpec {
        let blocks = vec![UpdateBlock::new().variable(StateUpdateFn::new("x", |ctx, _| {
            let x = ctx.state.get("x").and_then(Value::as_i64).unwrap_or(0);
            ("x".to_string(), json!(x + 1))
        }))];
        ModelSpec::new(State::from([("x".to_string(), json!(0))]), blocks)
    }

    #[test]
    fn test_example_sweep_ids() {
        let mut registry = RunRegistry::new();
        let n = append_configs(&mut registry, &model(), SimConfig::new(3, 0..2)).unwrap();
        assert_eq!(n, 3);

        let ids: Vec<(u32, u32)> = registry.iter().map(|r| (r.simulation_id.0, r.run_id.0)).collect();
        assert_eq!(ids, vec![(0, 0), (0, 1), (0, 2)]);
        assert!(registry.iter().all(|r| r.sim_config.n == Some(1)));

        append_configs(&mut registry, &model(), SimConfig::new(1, 0..2)).unwrap();
        let last = registry.last().unwrap();
        assert_eq!((last.simulation_id, last.run_id), (SimulationId(1), RunId(0)));
        assert_eq!(last.session_id, format!("{}=1_0", DEFAULT_USER_ID));
    }

    #[test]
    fn test_group_counter_advances_by_replicas() {
        let mut registry = RunRegistry::new();
        let batch = vec![SimConfig::new(2, 0..1), SimConfig::new(1, 0..1), SimConfig::new(3, 0..1)];
        append_configs(&mut registry, &model(), batch).unwrap();

        let ids: Vec<u32> = registry.iter().map(|r| r.simulation_id.0).collect();
        assert_eq!(ids, vec![0, 0, 2, 3, 3, 3]);
        assert_eq!(registry.next_simulation_id(), SimulationId(4));
    }

    #[test]
    fn test_missing_n_keeps_earlier_elements() {
        let mut registry = RunRegistry::new();
        let mut broken = SimConfig::new(1, 0..1);
        broken.n = None;
        let batch = vec![SimConfig::new(2, 0..1), broken, SimConfig::new(1, 0..1)];

        let err = append_configs(&mut registry, &model(), batch).unwrap_err();
        assert_eq!(err, ConfigError::MissingField { element: 1, field: "N" });
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_zero_replications_rejected() {
        let mut registry = RunRegistry::new();
        let err = append_configs(&mut registry, &model(), SimConfig::new(0, 0..1)).unwrap_err();
        assert_eq!(err, ConfigError::InvalidReplication { element: 0, n: 0 });
        assert!(registry.is_empty());
    }

    #[test]
    fn test_malformed_block_registers_nothing_for_element() {
        let mut block = UpdateBlock::new();
        block.variables.insert("a".to_string(), StateUpdateFn::new("b", |_, _| ("b".to_string(), Value::Null)));
        let spec = ModelSpec::new(State::new(), vec![block]);

        let mut registry = RunRegistry::new();
        let err = append_configs(&mut registry, &spec, SimConfig::new(3, 0..1)).unwrap_err();
        assert!(matches!(err, ConfigError::MalformedBlock { substep: 0, .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_functions_shared_across_replicas() {
        let mut spec = model();
        spec.raw_exogenous_states.insert("y".to_string(), ExogenousFn::new(|_, v| v.clone()));
        let mut registry = RunRegistry::new();
        append_configs(&mut registry, &spec, SimConfig::new(2, 0..1)).unwrap();

        let a = &registry.get(0).unwrap().plan.substeps[0];
        let b = &registry.get(1).unwrap().plan.substeps[0];
        assert!(a.variables[0].shares_fn(&b.variables[0]));
        // exogenous resolved once per call
        assert!(a.variables[1].shares_fn(&b.variables[1]));
        assert_eq!(registry.get(0).unwrap().plan_shape, PlanShape::PoliciesSynthesized);
    }

    #[test]
    fn test_default_policy_ops_are_fresh_per_spec() {
        let a = ModelSpec::default();
        let mut b = ModelSpec::default();
        b.policy_ops.push(PolicyOp::sum());
        assert_eq!(a.policy_ops.len(), 1);
        assert_eq!(a.policy_ops[0].name(), "sum");
        assert_eq!(b.policy_ops.len(), 2);
    }
}
