use crate::compile::plan::ExecutionPlan;
use crate::model::FnOrigin;
use std::collections::HashMap;

/// Cell counts of a compiled plan, split by where each cell came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanReport {
    pub substeps: usize,
    pub declared_policies: usize,
    pub identity_policies: usize,
    pub declared_updates: usize,
    /// Value-preserving fillers.
    pub identity_updates: usize,
    /// Fillers that emit nothing.
    pub null_updates: usize,
    pub exogenous_updates: usize,
    /// How many substeps declare each function name (declared cells only).
    pub name_counts: HashMap<String, usize>,
}

impl PlanReport {
    pub fn analyze(plan: &ExecutionPlan) -> Self {
        let mut report = Self { substeps: plan.len(), ..Default::default() };

        for substep in plan {
            for p in &substep.policies {
                match p.origin() {
                    FnOrigin::Declared => {
                        report.declared_policies += 1;
                        *report.name_counts.entry(p.name().to_string()).or_insert(0) += 1;
                    }
                    _ => report.identity_policies += 1,
                }
            }
            for v in &substep.variables {
                match v.origin() {
                    FnOrigin::Declared => {
                        report.declared_updates += 1;
                        *report.name_counts.entry(v.name().to_string()).or_insert(0) += 1;
                    }
                    FnOrigin::Identity => report.identity_updates += 1,
                    FnOrigin::NullIdentity => report.null_updates += 1,
                    FnOrigin::Exogenous => report.exogenous_updates += 1,
                }
            }
        }
        report
    }

    pub fn declared_cells(&self) -> usize { self.declared_policies + self.declared_updates }

    pub fn padded_cells(&self) -> usize { self.identity_policies + self.identity_updates + self.null_updates }

    /// Share of non-exogenous cells that had to be filled in. 0.0 for an empty plan.
    pub fn padding_ratio(&self) -> f64 {
        let total = self.declared_cells() + self.padded_cells();
        if total > 0 { self.padded_cells() as f64 / total as f64 } else { 0.0 }
    }
}
