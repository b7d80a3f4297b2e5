//! Binary operators the engine uses to fold a substep's policy signals.
use crate::store::{Signal, Value};
use serde_json::Number;
use std::fmt;
use std::sync::Arc;

type BinaryOp = dyn Fn(&Value, &Value) -> Option<Value> + Send + Sync;

#[derive(Clone)]
pub struct PolicyOp {
    name: String,
    f: Arc<BinaryOp>,
}

impl PolicyOp {
    pub fn new<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value, &Value) -> Option<Value> + Send + Sync + 'static,
    {
        Self { name: name.into(), f: Arc::new(f) }
    }

    /// Pairwise sum. Integers stay integers when the result fits.
    pub fn sum() -> Self { Self::new("sum", sum_values) }

    pub fn name(&self) -> &str { &self.name }

    #[inline]
    pub fn apply(&self, a: &Value, b: &Value) -> Option<Value> {
        (self.f)(a, b)
    }

    /// Folds signals key by key with this operator, in list order. A key
    /// whose values cannot be combined keeps the last combinable result and
    /// is reported in the second element.
    pub fn aggregate(&self, signals: &[Signal]) -> (Signal, Vec<String>) {
        let mut out = Signal::new();
        let mut conflicts = Vec::new();
        for signal in signals {
            for (key, value) in signal {
                match out.get(key) {
                    None => {
                        out.insert(key.clone(), value.clone());
                    }
                    Some(acc) => match self.apply(acc, value) {
                        Some(v) => {
                            out.insert(key.clone(), v);
                        }
                        None => {
                            if !conflicts.contains(key) {
                                conflicts.push(key.clone());
                            }
                        }
                    },
                }
            }
        }
        (out, conflicts)
    }
}

impl Default for PolicyOp {
    fn default() -> Self { Self::sum() }
}

impl fmt::Debug for PolicyOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PolicyOp").field(&self.name).finish()
    }
}

/// `a + b` over JSON: numbers add, strings and arrays concatenate.
pub fn sum_values(a: &Value, b: &Value) -> Option<Value> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => add_numbers(x, y),
        (Value::String(x), Value::String(y)) => Some(Value::String(format!("{}{}", x, y))),
        (Value::Array(x), Value::Array(y)) => {
            Some(Value::Array(x.iter().chain(y.iter()).cloned().collect()))
        }
        _ => None,
    }
}

fn add_numbers(x: &Number, y: &Number) -> Option<Value> {
    if let (Some(a), Some(b)) = (x.as_i64(), y.as_i64()) {
        if let Some(s) = a.checked_add(b) {
            return Some(Value::from(s));
        }
    }
    let s = x.as_f64()? + y.as_f64()?;
    Number::from_f64(s).map(Value::Number)
}
