//! Errors raised while compiling a model into runs.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A sweep element lacks a field the expander cannot do without (e.g. `N`).
    #[error("Sweep element {element} is missing required field '{field}'")]
    MissingField { element: usize, field: &'static str },
    #[error("Sweep element {element} has replication count {n}; N must be at least 1")]
    InvalidReplication { element: usize, n: u32 },
    /// Raised by the block normalizer; passed through untouched by callers.
    #[error("Malformed update block at substep {substep}: {reason}")]
    MalformedBlock { substep: usize, reason: String },
    #[error("Sweep parameter '{param}' has no candidate values")]
    EmptySweepValues { param: String },
    /// A run was built from a sim config that never went through the expander.
    #[error("Sim config has no '{field}' assigned")]
    MissingIdentifier { field: &'static str },
    #[error("Could not parse sweep specification: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}
