//! The (substep, name) -> function table for one category of a model.
//!
//! **Representation:**
//! Only declared cells are stored. Every other cell resolves to the
//! category's identity default through [`MatrixField::get_or_identity`], so
//! no alignment or broadcast rules are involved in filling gaps.

use crate::model::{Identity, PolicyFn, StateUpdateFn, UpdateBlock};
use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;

/// A function type that can occupy a matrix cell.
pub trait Cell: Clone {
    /// Filler for a cell whose block does not declare `name`.
    fn identity_for(identity: &Identity, name: &str) -> Self;
    /// The category mapping of one block.
    fn extract(block: &UpdateBlock) -> &IndexMap<String, Self>;
}

impl Cell for PolicyFn {
    fn identity_for(identity: &Identity, _name: &str) -> Self { identity.policy_identity() }
    fn extract(block: &UpdateBlock) -> &IndexMap<String, Self> { block.policies() }
}

impl Cell for StateUpdateFn {
    fn identity_for(identity: &Identity, name: &str) -> Self { identity.state_identity(name) }
    fn extract(block: &UpdateBlock) -> &IndexMap<String, Self> { block.variables() }
}

#[derive(Debug, Clone)]
pub struct MatrixField<F: Cell> {
    substeps: usize,
    /// Column names in first-seen order across all blocks.
    columns: IndexSet<String>,
    /// Declared cells keyed by (substep, column index).
    cells: HashMap<(usize, usize), F>,
    identity: Identity,
}

pub type PolicyField = MatrixField<PolicyFn>;
pub type VariableField = MatrixField<StateUpdateFn>;

impl<F: Cell> MatrixField<F> {
    pub fn build(blocks: &[UpdateBlock], identity: &Identity) -> Self {
        let mut columns = IndexSet::new();
        let mut cells = HashMap::new();

        for (substep, block) in blocks.iter().enumerate() {
            for (name, f) in F::extract(block) {
                let (col, _) = columns.insert_full(name.clone());
                cells.insert((substep, col), f.clone());
            }
        }

        Self { substeps: blocks.len(), columns, cells, identity: identity.clone() }
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> { self.columns.iter().map(String::as_str) }

    /// Number of table rows. A category nobody declares has no rows at all.
    pub fn row_count(&self) -> usize {
        if self.columns.is_empty() { 0 } else { self.substeps }
    }

    pub fn is_empty(&self) -> bool { self.row_count() == 0 }

    pub fn declared(&self, substep: usize, name: &str) -> Option<&F> {
        let col = self.columns.get_index_of(name)?;
        self.cells.get(&(substep, col))
    }

    pub fn get_or_identity(&self, substep: usize, name: &str) -> F {
        match self.declared(substep, name) {
            Some(f) => f.clone(),
            None => F::identity_for(&self.identity, name),
        }
    }

    /// The table as row-major function lists, one row per substep.
    pub fn to_rows(&self) -> Vec<Vec<F>> {
        (0..self.row_count())
            .map(|substep| self.columns.iter().map(|name| self.get_or_identity(substep, name)).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FnOrigin, StepContext};
    use crate::store::{Params, Signal, State, Value};
    use serde_json::json;

    fn update(name: &str, v: i64) -> StateUpdateFn {
        let key = name.to_string();
        StateUpdateFn::new(name, move |_, _| (key.clone(), json!(v)))
    }

    #[test]
    fn test_gaps_filled_with_state_identity() {
        // m0 declares a, b; m1 declares b, c
        let blocks = vec![
            UpdateBlock::new().variable(update("a", 1)).variable(update("b", 2)),
            UpdateBlock::new().variable(update("b", 3)).variable(update("c", 4)),
        ];
        let field = VariableField::build(&blocks, &Identity::default());
        assert_eq!(field.columns().collect::<Vec<_>>(), vec!["a", "b", "c"]);

        let rows = field.to_rows();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.len() == 3));

        let origins: Vec<Vec<FnOrigin>> = rows.iter().map(|r| r.iter().map(|f| f.origin()).collect()).collect();
        assert_eq!(origins[0], vec![FnOrigin::Declared, FnOrigin::Declared, FnOrigin::Identity]);
        assert_eq!(origins[1], vec![FnOrigin::Identity, FnOrigin::Declared, FnOrigin::Declared]);

        let params = Params::new();
        let state = State::from([("a".to_string(), json!(10)), ("c".to_string(), json!(30))]);
        let ctx = StepContext { params: &params, substep: 1, history: &[], state: &state };
        assert_eq!(rows[1][0].call(&ctx, &Signal::new()), Some(("a".to_string(), json!(10))));
        assert_eq!(rows[0][2].call(&ctx, &Signal::new()), Some(("c".to_string(), json!(30))));
        assert_eq!(rows[1][2].call(&ctx, &Signal::new()), Some(("c".to_string(), Value::from(4))));
    }

    #[test]
    fn test_undeclared_category_has_no_rows() {
        let blocks = vec![UpdateBlock::new().variable(update("a", 1)), UpdateBlock::new()];
        let policies = PolicyField::build(&blocks, &Identity::default());
        assert!(policies.is_empty());
        assert!(policies.to_rows().is_empty());

        // A block with no variables still yields a full identity row.
        let variables = VariableField::build(&blocks, &Identity::default());
        let rows = variables.to_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][0].origin(), FnOrigin::Identity);
    }

    #[test]
    fn test_declared_cells_share_the_declared_closure() {
        let p = PolicyFn::new("p", |_| Signal::new());
        let blocks = vec![UpdateBlock::new().policy(p.clone())];
        let field = PolicyField::build(&blocks, &Identity::default());
        assert!(field.get_or_identity(0, "p").shares_fn(&p));
        assert!(field.declared(0, "q").is_none());
    }
}
