use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Every state value, signal value and swept parameter is plain JSON data.
/// Cloning one is a full deep copy.
pub type Value = serde_json::Value;

/// The model state at one substep, keyed by state variable name.
pub type State = BTreeMap<String, Value>;

/// A resolved per-run parameter set (one column of the sweep table).
pub type Params = BTreeMap<String, Value>;

/// A policy signal: `signal_name -> value`.
pub type Signal = BTreeMap<String, Value>;

/// Opaque seed material handed through to the engine.
pub type Seeds = BTreeMap<String, u64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimulationId(pub u32);

impl SimulationId {
    #[inline(always)]
    pub fn index(&self) -> usize { self.0 as usize }
    pub fn next(&self) -> Self { Self(self.0 + 1) }
}

impl fmt::Display for SimulationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub u32);

impl RunId {
    #[inline(always)]
    pub fn index(&self) -> usize { self.0 as usize }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}
