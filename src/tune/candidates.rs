//! Candidate generation policies.

use crate::config::{Configuration, ParameterSchema, ParameterSpec};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Produces the configurations a tuning run tries after the baseline.
pub trait CandidateGenerator {
    /// Returns up to `count` candidates derived from `baseline`, using
    /// parameters declared in `schema`.
    fn generate(
        &mut self,
        baseline: &Configuration,
        schema: &ParameterSchema,
        count: usize,
    ) -> Vec<Configuration>;
}

/// A caller-supplied list, each entry applied on top of the baseline.
#[derive(Debug, Clone, Default)]
pub struct FixedCandidates {
    candidates: Vec<Configuration>,
}

impl FixedCandidates {
    pub fn new(candidates: Vec<Configuration>) -> Self {
        Self { candidates }
    }
}

impl CandidateGenerator for FixedCandidates {
    fn generate(
        &mut self,
        baseline: &Configuration,
        _schema: &ParameterSchema,
        count: usize,
    ) -> Vec<Configuration> {
        self.candidates
            .iter()
            .take(count)
            .map(|c| baseline.overlay(c))
            .collect()
    }
}

/// Random changes to the schema's tunable parameters.
///
/// Each candidate changes between 1 and `max_changes` distinct parameters
/// of the baseline to one of their tuning values. Candidates equal to the
/// baseline or to an earlier candidate are skipped, so fewer than `count`
/// come back when the space is small.
#[derive(Debug, Clone)]
pub struct RandomCandidates {
    rng: StdRng,
    max_changes: usize,
}

/// Draws per requested candidate before giving up on finding new ones.
const MAX_DRAWS_PER_CANDIDATE: usize = 32;
/// Consecutive repeated draws after which the space counts as exhausted.
const MAX_CONSECUTIVE_REPEATS: usize = 1024;

impl RandomCandidates {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            max_changes: 2,
        }
    }

    pub fn with_max_changes(mut self, n: usize) -> Self {
        self.max_changes = n.max(1);
        self
    }

    fn draw(&mut self, baseline: &Configuration, tunable: &[&ParameterSpec]) -> Configuration {
        let changes = self.rng.random_range(1..=self.max_changes.min(tunable.len()));
        let mut order: Vec<usize> = (0..tunable.len()).collect();
        let mut candidate = baseline.clone();
        for i in 0..changes {
            let j = self.rng.random_range(i..order.len());
            order.swap(i, j);
            let spec = tunable[order[i]];
            let value = &spec.tuning_values[self.rng.random_range(0..spec.tuning_values.len())];
            if let Ok(next) = candidate.with_value(spec.name.clone(), value.clone()) {
                candidate = next;
            }
        }
        candidate
    }
}

impl CandidateGenerator for RandomCandidates {
    fn generate(
        &mut self,
        baseline: &Configuration,
        schema: &ParameterSchema,
        count: usize,
    ) -> Vec<Configuration> {
        let tunable: Vec<&ParameterSpec> = schema.tunable().collect();
        let mut out: Vec<Configuration> = Vec::new();
        if tunable.is_empty() {
            return out;
        }
        let max_draws = count.saturating_mul(MAX_DRAWS_PER_CANDIDATE);
        let mut draws = 0;
        let mut repeats = 0;
        while out.len() < count && draws < max_draws && repeats < MAX_CONSECUTIVE_REPEATS {
            draws += 1;
            let candidate = self.draw(baseline, &tunable);
            if candidate != *baseline && !out.contains(&candidate) {
                out.push(candidate);
                repeats = 0;
            } else {
                repeats += 1;
            }
        }
        out
    }
}
