//! Neutral fallbacks used to pad the gaps in declared policies and variables.
use super::function::{FnOrigin, PolicyFn, StateUpdateFn};
use crate::store::{Signal, Value};

pub const POLICY_IDENTITY: &str = "p_identity";
pub const NULL_STATE_IDENTITY: &str = "no_state_identity";

/// Produces identity functions. The policy identity returns `policy_signal`
/// (default `{identity: 0}`), which reads as "no additional signal".
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub policy_signal: Signal,
}

impl Default for Identity {
    fn default() -> Self {
        Self { policy_signal: Signal::from([("identity".to_string(), Value::from(0))]) }
    }
}

impl Identity {
    pub fn new(policy_signal: Signal) -> Self { Self { policy_signal } }

    pub fn policy_identity(&self) -> PolicyFn {
        let signal = self.policy_signal.clone();
        PolicyFn::with_origin(POLICY_IDENTITY, FnOrigin::Identity, move |_| signal.clone())
    }

    /// Returns `(key, current_state[key])`. A key absent from the state has
    /// no value to preserve, so nothing is emitted.
    pub fn state_identity(&self, key: &str) -> StateUpdateFn {
        let key = key.to_string();
        StateUpdateFn::with_origin(key.clone(), FnOrigin::Identity, move |ctx, _| {
            ctx.state.get(&key).map(|v| (key.clone(), v.clone()))
        })
    }

    /// Emits no update. Only used when the whole variable category is
    /// synthesized, where there is no column key to preserve.
    pub fn null_state_identity(&self) -> StateUpdateFn {
        StateUpdateFn::with_origin(NULL_STATE_IDENTITY, FnOrigin::NullIdentity, |_, _| None)
    }
}
