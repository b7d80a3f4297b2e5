//! Assembles the execution plan the engine walks substep by substep.
use super::matrix::{PolicyField, VariableField};
use crate::analysis::telemetry::PlanReport;
use crate::model::{Identity, PolicyFn, StateUpdateFn, UpdateBlock};
use crate::store::State;
use smallvec::SmallVec;

pub type VariableRow = SmallVec<[StateUpdateFn; 8]>;
pub type PolicyRow = SmallVec<[PolicyFn; 4]>;

/// One substep of the plan. The engine runs `policies`, folds their signals
/// with the run's policy operators, then runs `variables`.
#[derive(Debug, Clone, Default)]
pub struct Substep {
    pub variables: VariableRow,
    pub policies: PolicyRow,
}

#[derive(Debug, Clone, Default)]
pub struct ExecutionPlan {
    pub substeps: Vec<Substep>,
}

impl ExecutionPlan {
    pub fn len(&self) -> usize { self.substeps.len() }
    pub fn is_empty(&self) -> bool { self.substeps.is_empty() }
    pub fn iter(&self) -> std::slice::Iter<'_, Substep> { self.substeps.iter() }
}

impl<'a> IntoIterator for &'a ExecutionPlan {
    type Item = &'a Substep;
    type IntoIter = std::slice::Iter<'a, Substep>;
    fn into_iter(self) -> Self::IntoIter { self.substeps.iter() }
}

/// Which branch of the assembler produced a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanShape {
    /// Both categories declared somewhere; tables paired row by row.
    Declared,
    /// No policies anywhere; policy rows synthesized from identities.
    PoliciesSynthesized,
    /// No variables anywhere; variable rows synthesized from null identities.
    VariablesSynthesized,
    /// No usable blocks; one passthrough substep built from the initial state.
    InitialStateOnly,
}

pub struct PlanCompiler<'a> {
    identity: &'a Identity,
}

impl<'a> PlanCompiler<'a> {
    pub fn new(identity: &'a Identity) -> Self {
        Self { identity }
    }

    /// Compiles canonical blocks into an execution plan.
    ///
    /// Blocks are assumed to be normalized already; nothing is re-validated.
    /// `exogenous` is appended to the variable list of every substep.
    pub fn compile(
        &self,
        initial_state: &State,
        blocks: &[UpdateBlock],
        exogenous: &[StateUpdateFn],
    ) -> (ExecutionPlan, PlanShape) {
        let (rows, shape) = self.pair_rows(initial_state, blocks);

        let substeps = rows
            .into_iter()
            .map(|(mut variables, policies)| {
                variables.extend(exogenous.iter().cloned());
                Substep { variables, policies }
            })
            .collect();

        let plan = ExecutionPlan { substeps };
        let report = PlanReport::analyze(&plan);
        tracing::debug!(
            ?shape,
            substeps = report.substeps,
            declared = report.declared_cells(),
            padded = report.padded_cells(),
            exogenous = report.exogenous_updates,
            "assembled execution plan"
        );
        (plan, shape)
    }

    fn pair_rows(&self, initial_state: &State, blocks: &[UpdateBlock]) -> (Vec<(VariableRow, PolicyRow)>, PlanShape) {
        let p_field = PolicyField::build(blocks, self.identity);
        let v_field = VariableField::build(blocks, self.identity);
        let block_count = blocks.len();

        match (p_field.is_empty(), v_field.is_empty()) {
            // Row i of both tables is substep i.
            (false, false) => {
                let rows: Vec<(VariableRow, PolicyRow)> = v_field
                    .to_rows()
                    .into_iter()
                    .zip(p_field.to_rows())
                    .map(|(v, p)| (VariableRow::from_vec(v), PolicyRow::from_vec(p)))
                    .collect();
                (rows, PlanShape::Declared)
            }
            // Policy rows mirror the variable table: one per row, each sized
            // to the block count.
            (true, false) => {
                let rows: Vec<(VariableRow, PolicyRow)> = v_field
                    .to_rows()
                    .into_iter()
                    .map(|v| {
                        let p: PolicyRow = (0..block_count).map(|_| self.identity.policy_identity()).collect();
                        (VariableRow::from_vec(v), p)
                    })
                    .collect();
                (rows, PlanShape::PoliciesSynthesized)
            }
            (false, true) => {
                let rows: Vec<(VariableRow, PolicyRow)> = p_field
                    .to_rows()
                    .into_iter()
                    .map(|p| {
                        let v: VariableRow = (0..block_count).map(|_| self.identity.null_state_identity()).collect();
                        (v, PolicyRow::from_vec(p))
                    })
                    .collect();
                (rows, PlanShape::VariablesSynthesized)
            }
            (true, true) => (vec![self.initial_state_row(initial_state)], PlanShape::InitialStateOnly),
        }
    }

    /// A single substep that carries every initial state key forward.
    fn initial_state_row(&self, initial_state: &State) -> (VariableRow, PolicyRow) {
        let variables: VariableRow = initial_state.keys().map(|k| self.identity.state_identity(k)).collect();
        let mut policies = PolicyRow::new();
        policies.push(self.identity.policy_identity());
        (variables, policies)
    }
}

/// Convenience wrapper around [`PlanCompiler`] with the default identities.
pub fn generate_plan(initial_state: &State, blocks: &[UpdateBlock], exogenous: &[StateUpdateFn]) -> ExecutionPlan {
    let identity = Identity::default();
    PlanCompiler::new(&identity).compile(initial_state, blocks, exogenous).0
}
