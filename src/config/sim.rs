//! Per-run simulation settings and the sweep table that produces them.
//!
//! Field names on the wire follow the model authoring convention: `N`
//! (replications), `T` (timesteps) and `M` (swept parameters).

use crate::error::ConfigError;
use crate::store::{Params, RunId, SimulationId, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Range;

/// The scalar settings of one run. Deep-copied into every replica.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Replication count. Required by the expander, which resets it to 1.
    #[serde(rename = "N", default, skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
    #[serde(rename = "T", with = "timesteps")]
    pub t: Range<u64>,
    #[serde(rename = "M", default)]
    pub m: Params,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulation_id: Option<SimulationId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<RunId>,
}

impl SimConfig {
    pub fn new(n: u32, t: Range<u64>) -> Self {
        Self { n: Some(n), t, m: Params::new(), simulation_id: None, run_id: None }
    }

    pub fn with_params(mut self, m: Params) -> Self {
        self.m = m;
        self
    }

    pub fn timesteps(&self) -> u64 { self.t.end.saturating_sub(self.t.start) }
}

/// One sim config or several; the expander treats both as a sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum SimConfigs {
    Single(SimConfig),
    Batch(Vec<SimConfig>),
}

impl SimConfigs {
    pub fn into_vec(self) -> Vec<SimConfig> {
        match self {
            SimConfigs::Single(c) => vec![c],
            SimConfigs::Batch(v) => v,
        }
    }
}

impl From<SimConfig> for SimConfigs {
    fn from(c: SimConfig) -> Self { SimConfigs::Single(c) }
}

impl From<Vec<SimConfig>> for SimConfigs {
    fn from(v: Vec<SimConfig>) -> Self { SimConfigs::Batch(v) }
}

/// `{N, T, M}` where `M` maps each swept parameter to its candidate values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepSpec {
    #[serde(rename = "N", default, skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
    #[serde(rename = "T", with = "timesteps")]
    pub t: Range<u64>,
    #[serde(rename = "M", default)]
    pub m: BTreeMap<String, Vec<Value>>,
}

impl SweepSpec {
    pub fn from_json(input: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Expands the sweep table into one sim config per sweep index.
    ///
    /// The number of configs is the length of the longest value list;
    /// shorter lists repeat their last value. Without any swept parameter
    /// the result is a single config with an empty `M`.
    pub fn resolve(&self) -> Result<Vec<SimConfig>, ConfigError> {
        if let Some((param, _)) = self.m.iter().find(|(_, values)| values.is_empty()) {
            return Err(ConfigError::EmptySweepValues { param: param.clone() });
        }

        let width = self.m.values().map(Vec::len).max().unwrap_or(1);
        let configs = (0..width)
            .map(|i| {
                let m: Params = self
                    .m
                    .iter()
                    .filter_map(|(k, values)| values.get(i).or_else(|| values.last()).map(|v| (k.clone(), v.clone())))
                    .collect();
                SimConfig { n: self.n, t: self.t.clone(), m, simulation_id: None, run_id: None }
            })
            .collect();
        Ok(configs)
    }
}

/// `T` accepts either a timestep count (`5` means `0..5`) or `{start, end}`.
mod timesteps {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::ops::Range;

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Count(u64),
        Bounds { start: u64, end: u64 },
    }

    pub fn serialize<S: Serializer>(t: &Range<u64>, s: S) -> Result<S::Ok, S::Error> {
        Repr::Bounds { start: t.start, end: t.end }.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Range<u64>, D::Error> {
        Ok(match Repr::deserialize(d)? {
            Repr::Count(n) => 0..n,
            Repr::Bounds { start, end } => start..end,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn test_resolve_pads_short_lists() {
        let spec = SweepSpec::from_json(
            r#"{"N": 2, "T": 5, "M": {"alpha": [1], "beta": [2, 5], "gamma": [3, 4], "omega": [7]}}"#,
        )
        .unwrap();
        let configs = spec.resolve().unwrap();

        assert_eq!(configs.len(), 2);
        assert_eq!(configs[0].m["beta"], json!(2));
        assert_eq!(configs[1].m["beta"], json!(5));
        assert_eq!(configs[1].m["alpha"], json!(1));
        assert_eq!(configs[1].m["omega"], json!(7));
        assert!(configs.iter().all(|c| c.n == Some(2) && c.t == (0..5)));
    }

    #[test]
    fn test_resolve_without_params() {
        let spec = SweepSpec::from_json(r#"{"N": 1, "T": {"start": 2, "end": 4}}"#).unwrap();
        let configs = spec.resolve().unwrap();
        assert_eq!(configs, vec![SimConfig::new(1, 2..4)]);
        assert_eq!(configs[0].timesteps(), 2);
    }

    #[test]
    fn test_resolve_rejects_empty_candidates() {
        let spec = SweepSpec::from_json(r#"{"N": 1, "T": 3, "M": {"alpha": []}}"#).unwrap();
        assert_eq!(spec.resolve(), Err(ConfigError::EmptySweepValues { param: "alpha".into() }));
    }

    #[rstest]
    #[case(r#"{"N": 1}"#)]
    #[case(r#"{"N": "three", "T": 2}"#)]
    #[case(r#"not json"#)]
    fn test_from_json_rejects_bad_input(#[case] input: &str) {
        assert!(matches!(SweepSpec::from_json(input), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_sim_config_wire_format() {
        let mut cfg = SimConfig::new(3, 0..2);
        cfg.simulation_id = Some(SimulationId(4));
        cfg.run_id = Some(RunId(1));
        let v = serde_json::to_value(&cfg).unwrap();
        assert_eq!(v, json!({"N": 3, "T": {"start": 0, "end": 2}, "M": {}, "simulation_id": 4, "run_id": 1}));

        let missing_n: SimConfig = serde_json::from_value(json!({"T": 2})).unwrap();
        assert_eq!(missing_n.n, None);
    }
}
