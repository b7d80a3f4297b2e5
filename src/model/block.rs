//! Update blocks and the legacy-shape normalizer.
//!
//! Older models named the two categories `behaviors` and `states`, and could
//! hand blocks over as a label-keyed map instead of a list. Both shapes are
//! explicit variants here and are resolved exactly once by [`normalize`].

use super::function::{PolicyFn, StateUpdateFn};
use crate::error::ConfigError;
use indexmap::IndexMap;

/// One substep of the model. Declaration order is preserved in both maps.
#[derive(Debug, Clone, Default)]
pub struct UpdateBlock {
    pub policies: IndexMap<String, PolicyFn>,
    pub variables: IndexMap<String, StateUpdateFn>,
}

impl UpdateBlock {
    pub fn new() -> Self { Self::default() }

    pub fn policy(mut self, f: PolicyFn) -> Self {
        self.policies.insert(f.name().to_string(), f);
        self
    }

    pub fn variable(mut self, f: StateUpdateFn) -> Self {
        self.variables.insert(f.name().to_string(), f);
        self
    }

    pub fn policies(&self) -> &IndexMap<String, PolicyFn> { &self.policies }
    pub fn variables(&self) -> &IndexMap<String, StateUpdateFn> { &self.variables }
}

/// The legacy block layout: `behaviors` are policies, `states` are variables.
#[derive(Debug, Clone, Default)]
pub struct LegacyBlock {
    pub behaviors: IndexMap<String, PolicyFn>,
    pub states: IndexMap<String, StateUpdateFn>,
}

#[derive(Debug, Clone)]
pub enum BlockShape {
    Current(UpdateBlock),
    Legacy(LegacyBlock),
}

impl From<UpdateBlock> for BlockShape {
    fn from(block: UpdateBlock) -> Self { BlockShape::Current(block) }
}

impl From<LegacyBlock> for BlockShape {
    fn from(block: LegacyBlock) -> Self { BlockShape::Legacy(block) }
}

/// The ways a model may hand over its update blocks.
#[derive(Debug, Clone)]
pub enum PartialStateUpdates {
    /// Ordered list; position is the substep index.
    List(Vec<BlockShape>),
    /// Label-keyed map; insertion order is the substep order.
    Labelled(IndexMap<String, BlockShape>),
}

impl Default for PartialStateUpdates {
    fn default() -> Self { PartialStateUpdates::List(Vec::new()) }
}

impl From<Vec<UpdateBlock>> for PartialStateUpdates {
    fn from(blocks: Vec<UpdateBlock>) -> Self {
        PartialStateUpdates::List(blocks.into_iter().map(BlockShape::Current).collect())
    }
}

impl From<Vec<BlockShape>> for PartialStateUpdates {
    fn from(blocks: Vec<BlockShape>) -> Self { PartialStateUpdates::List(blocks) }
}

impl From<IndexMap<String, BlockShape>> for PartialStateUpdates {
    fn from(blocks: IndexMap<String, BlockShape>) -> Self { PartialStateUpdates::Labelled(blocks) }
}

impl PartialStateUpdates {
    pub fn len(&self) -> usize {
        match self {
            PartialStateUpdates::List(v) => v.len(),
            PartialStateUpdates::Labelled(m) => m.len(),
        }
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

/// Converts any accepted block layout into the canonical ordered list.
///
/// Idempotent: canonical input comes back unchanged. Every function must be
/// registered under a non-empty name, and a variable's map key must match the
/// name its update function reports.
pub fn normalize(blocks: &PartialStateUpdates) -> Result<Vec<UpdateBlock>, ConfigError> {
    let shapes: Vec<&BlockShape> = match blocks {
        PartialStateUpdates::List(v) => v.iter().collect(),
        PartialStateUpdates::Labelled(m) => m.values().collect(),
    };

    shapes
        .into_iter()
        .enumerate()
        .map(|(substep, shape)| {
            let block = match shape {
                BlockShape::Current(b) => b.clone(),
                BlockShape::Legacy(b) => UpdateBlock {
                    policies: b.behaviors.clone(),
                    variables: b.states.clone(),
                },
            };
            validate(substep, &block)?;
            Ok(block)
        })
        .collect()
}

fn validate(substep: usize, block: &UpdateBlock) -> Result<(), ConfigError> {
    if block.policies.keys().any(|k| k.is_empty()) {
        return Err(ConfigError::MalformedBlock { substep, reason: "policy with an empty name".into() });
    }
    for (key, f) in &block.variables {
        if key.is_empty() {
            return Err(ConfigError::MalformedBlock { substep, reason: "variable with an empty name".into() });
        }
        if key != f.name() {
            return Err(ConfigError::MalformedBlock {
                substep,
                reason: format!("variable '{}' is registered under key '{}'", f.name(), key),
            });
        }
    }
    Ok(())
}
