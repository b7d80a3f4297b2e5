//! Callable building blocks of a model: policy functions and state updates.
//!
//! Both are reference-counted so one declaration can sit in every run of a
//! sweep. They must not close over run-specific mutable state, since the
//! engine may step different runs on different threads.

use crate::store::{Params, Signal, State, Value};
use std::fmt;
use std::sync::Arc;

/// Everything a function sees about the substep being executed.
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    pub params: &'a Params,
    /// 0-based position of the substep inside its timestep.
    pub substep: usize,
    /// Completed history of the run, one list of states per timestep.
    pub history: &'a [Vec<State>],
    pub state: &'a State,
}

/// Where a plan cell came from. Used by telemetry and the tensor view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FnOrigin {
    /// Written by the model author in an update block.
    Declared,
    /// Gap filler that changes nothing (policy identity or state identity).
    Identity,
    /// Gap filler that emits no state update at all.
    NullIdentity,
    /// An exogenous process appended to every substep.
    Exogenous,
}

type PolicyCallable = dyn Fn(&StepContext<'_>) -> Signal + Send + Sync;
type UpdateCallable = dyn Fn(&StepContext<'_>, &Signal) -> Option<(String, Value)> + Send + Sync;

/// A policy function together with the name it was declared under.
#[derive(Clone)]
pub struct PolicyFn {
    name: String,
    origin: FnOrigin,
    f: Arc<PolicyCallable>,
}

impl PolicyFn {
    pub fn new<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&StepContext<'_>) -> Signal + Send + Sync + 'static,
    {
        Self::with_origin(name, FnOrigin::Declared, f)
    }

    pub(crate) fn with_origin<F>(name: impl Into<String>, origin: FnOrigin, f: F) -> Self
    where
        F: Fn(&StepContext<'_>) -> Signal + Send + Sync + 'static,
    {
        Self { name: name.into(), origin, f: Arc::new(f) }
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn origin(&self) -> FnOrigin { self.origin }

    #[inline]
    pub fn call(&self, ctx: &StepContext<'_>) -> Signal {
        (self.f)(ctx)
    }

    /// True when both handles point at the same underlying closure.
    pub fn shares_fn(&self, other: &PolicyFn) -> bool {
        Arc::ptr_eq(&self.f, &other.f)
    }
}

impl fmt::Debug for PolicyFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyFn").field("name", &self.name).field("origin", &self.origin).finish()
    }
}

/// A state update function. Declared updates always emit a `(key, value)`
/// pair; only the null identity emits nothing.
#[derive(Clone)]
pub struct StateUpdateFn {
    name: String,
    origin: FnOrigin,
    f: Arc<UpdateCallable>,
}

impl StateUpdateFn {
    pub fn new<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&StepContext<'_>, &Signal) -> (String, Value) + Send + Sync + 'static,
    {
        Self::with_origin(name, FnOrigin::Declared, move |ctx, input| Some(f(ctx, input)))
    }

    pub(crate) fn with_origin<F>(name: impl Into<String>, origin: FnOrigin, f: F) -> Self
    where
        F: Fn(&StepContext<'_>, &Signal) -> Option<(String, Value)> + Send + Sync + 'static,
    {
        Self { name: name.into(), origin, f: Arc::new(f) }
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn origin(&self) -> FnOrigin { self.origin }

    #[inline]
    pub fn call(&self, ctx: &StepContext<'_>, input: &Signal) -> Option<(String, Value)> {
        (self.f)(ctx, input)
    }

    pub fn shares_fn(&self, other: &StateUpdateFn) -> bool {
        Arc::ptr_eq(&self.f, &other.f)
    }
}

impl fmt::Debug for StateUpdateFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateUpdateFn").field("name", &self.name).field("origin", &self.origin).finish()
    }
}
