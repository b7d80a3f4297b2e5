use super::types::SimulationId;
use crate::config::run::RunConfig;

/// The ordered, append-only list of runs an engine consumes.
///
/// Owned by the caller and threaded through every compilation call, so the
/// id sequence of one engine session is visible in the code that builds it.
#[derive(Debug, Clone, Default)]
pub struct RunRegistry {
    runs: Vec<RunConfig>,
}

impl RunRegistry {
    pub fn new() -> Self { Self::default() }
    pub fn len(&self) -> usize { self.runs.len() }
    pub fn is_empty(&self) -> bool { self.runs.is_empty() }

    /// The id the next replica group will receive: last id + 1, or 0.
    pub fn next_simulation_id(&self) -> SimulationId {
        self.runs.last().map_or(SimulationId(0), |run| run.simulation_id.next())
    }

    pub(crate) fn push(&mut self, run: RunConfig) {
        self.runs.push(run);
    }

    #[inline(always)]
    pub fn get(&self, idx: usize) -> Option<&RunConfig> { self.runs.get(idx) }
    pub fn last(&self) -> Option<&RunConfig> { self.runs.last() }
    pub fn iter(&self) -> std::slice::Iter<'_, RunConfig> { self.runs.iter() }
    pub fn as_slice(&self) -> &[RunConfig] { &self.runs }

    /// Runs belonging to one replica group, in registration order.
    pub fn group(&self, simulation_id: SimulationId) -> impl Iterator<Item = &RunConfig> {
        self.runs.iter().filter(move |r| r.simulation_id == simulation_id)
    }

    /// Hands the runs to the engine, which consumes each exactly once.
    pub fn into_runs(self) -> Vec<RunConfig> { self.runs }
}

impl<'a> IntoIterator for &'a RunRegistry {
    type Item = &'a RunConfig;
    type IntoIter = std::slice::Iter<'a, RunConfig>;
    fn into_iter(self) -> Self::IntoIter { self.runs.iter() }
}
