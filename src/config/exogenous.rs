//! Exogenous processes and the adapters that turn them into state updates.
//!
//! A raw process maps the current value of its state key to a new value. It
//! ignores policy signals and is appended to the variable list of every
//! substep of the plan.

use crate::model::{FnOrigin, StateUpdateFn};
use crate::store::{Params, Value};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

type ExogenousCallable = dyn Fn(&Params, &Value) -> Value + Send + Sync;

#[derive(Clone)]
pub struct ExogenousFn(Arc<ExogenousCallable>);

impl ExogenousFn {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Params, &Value) -> Value + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    #[inline]
    pub fn call(&self, params: &Params, current: &Value) -> Value {
        (self.0)(params, current)
    }
}

impl fmt::Debug for ExogenousFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("ExogenousFn") }
}

/// `state_key -> process`, in declaration order.
pub type ExogenousStates = IndexMap<String, ExogenousFn>;

/// Adapts each process so it fires once per timestep, at substep 0. On every
/// other substep the key's current value is passed through.
pub fn per_timestep(processes: &ExogenousStates) -> Vec<StateUpdateFn> {
    processes
        .iter()
        .map(|(key, process)| {
            let (key, process) = (key.clone(), process.clone());
            StateUpdateFn::with_origin(key.clone(), FnOrigin::Exogenous, move |ctx, _| {
                let current = ctx.state.get(&key).cloned().unwrap_or(Value::Null);
                let next = if ctx.substep == 0 { process.call(ctx.params, &current) } else { current };
                Some((key.clone(), next))
            })
        })
        .collect()
}

/// Adapts each process to fire on every substep.
pub fn every_substep(processes: &ExogenousStates) -> Vec<StateUpdateFn> {
    processes
        .iter()
        .map(|(key, process)| {
            let (key, process) = (key.clone(), process.clone());
            StateUpdateFn::with_origin(key.clone(), FnOrigin::Exogenous, move |ctx, _| {
                let current = ctx.state.get(&key).cloned().unwrap_or(Value::Null);
                Some((key.clone(), process.call(ctx.params, &current)))
            })
        })
        .collect()
}
