use crate::compile::plan::ExecutionPlan;
use crate::model::FnOrigin;
use std::fmt::Write;

/// Renders a plan as its tensor field: one line per substep listing the
/// policy and variable cells, with padded cells marked.
///
/// `*` marks an identity filler, `-` a null filler, `~` an exogenous process.
pub fn format_tensor_field(plan: &ExecutionPlan) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "TENSOR FIELD ({} substeps):", plan.len());
    let _ = writeln!(output, "--------------------------------------------------");

    for (m, substep) in plan.iter().enumerate() {
        let policies: Vec<String> = substep.policies.iter().map(|p| label(p.name(), p.origin())).collect();
        let variables: Vec<String> = substep.variables.iter().map(|v| label(v.name(), v.origin())).collect();
        let _ = writeln!(
            output,
            "[m{}] policies: [{}] | variables: [{}]",
            m + 1,
            policies.join(", "),
            variables.join(", ")
        );
    }
    output
}

fn label(name: &str, origin: FnOrigin) -> String {
    match origin {
        FnOrigin::Declared => name.to_string(),
        FnOrigin::Identity => format!("{}*", name),
        FnOrigin::NullIdentity => format!("{}-", name),
        FnOrigin::Exogenous => format!("{}~", name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::plan::generate_plan;
    use crate::model::{PolicyFn, StateUpdateFn, UpdateBlock};
    use crate::store::{Signal, State, Value};

    #[test]
    fn test_format_marks_padding() {
        let blocks = vec![
            UpdateBlock::new()
                .policy(PolicyFn::new("gamma", |_| Signal::new()))
                .variable(StateUpdateFn::new("alpha", |_, _| ("alpha".to_string(), Value::Null))),
            UpdateBlock::new().variable(StateUpdateFn::new("beta", |_, _| ("beta".to_string(), Value::Null))),
        ];
        let out = format_tensor_field(&generate_plan(&State::new(), &blocks, &[]));
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], "TENSOR FIELD (2 substeps):");
        assert_eq!(lines[2], "[m1] policies: [gamma] | variables: [alpha, beta*]");
        assert_eq!(lines[3], "[m2] policies: [p_identity*] | variables: [alpha*, beta]");
    }
}
