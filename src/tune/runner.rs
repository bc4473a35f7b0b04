//! Tuning loop.

use super::candidates::CandidateGenerator;
use super::config::TuneConfig;
use super::error::TuneError;
use super::types::{CandidateFailure, Score, TuneState, TuningEntry, TuningResult};
use crate::config::{Configuration, ParamValue, SEED, TIME_LIMIT};
use crate::model::FrozenModel;
use crate::solver::{SolveError, SolveFailure, SolverGateway};
use std::time::{Duration, Instant};

/// Drives repeated solves of one model under candidate configurations and
/// ranks them.
///
/// Candidate 0 is [`TuneConfig::baseline`]; the rest come from the
/// [`CandidateGenerator`]. A failed candidate is recorded and left out of
/// the ranking. The run aborts only when no candidate produced a
/// solution.
///
/// # Examples
///
/// ```
/// use u_optmodel::config::Configuration;
/// use u_optmodel::model::{Model, ObjectiveSense, VarKind};
/// use u_optmodel::solver::GridScanGateway;
/// use u_optmodel::tune::{FixedCandidates, TuneConfig, TuneState, TuningOrchestrator};
///
/// let mut m = Model::new("tiny");
/// let x = m.add_variable(0.0, 1.0, VarKind::Continuous, "x").unwrap();
/// m.set_objective(x, ObjectiveSense::Maximize);
/// let frozen = m.finalize().unwrap();
///
/// let gateway = GridScanGateway::new();
/// let coarse = Configuration::builder().set("ScanPoints", 11).build().unwrap();
/// let mut tuner = TuningOrchestrator::new(
///     &gateway,
///     FixedCandidates::new(vec![coarse]),
///     TuneConfig::default(),
/// );
/// let result = tuner.tune(&frozen, 2, 2).unwrap();
/// assert_eq!(result.len(), 2);
/// assert_eq!(tuner.state(), TuneState::Completed);
/// assert!(tuner.get_result(0).unwrap().is_empty());
/// ```
pub struct TuningOrchestrator<'g, G: SolverGateway + ?Sized, C: CandidateGenerator> {
    gateway: &'g G,
    generator: C,
    config: TuneConfig,
    state: TuneState,
    result: Option<TuningResult>,
}

impl<'g, G: SolverGateway + ?Sized, C: CandidateGenerator> TuningOrchestrator<'g, G, C> {
    pub fn new(gateway: &'g G, generator: C, config: TuneConfig) -> Self {
        Self {
            gateway,
            generator,
            config,
            state: TuneState::Idle,
            result: None,
        }
    }

    pub fn state(&self) -> TuneState {
        self.state
    }

    pub fn config(&self) -> &TuneConfig {
        &self.config
    }

    /// Result of the last run, if any.
    pub fn result(&self) -> Option<&TuningResult> {
        self.result.as_ref()
    }

    /// Configuration at `rank` of the last run: 0 is the baseline, 1 the
    /// best found.
    ///
    /// # Errors
    ///
    /// [`TuneError::IndexOutOfRange`] if `rank` is not below the retained
    /// count, or nothing has been tuned yet.
    pub fn get_result(&self, rank: usize) -> Result<&Configuration, TuneError> {
        match &self.result {
            Some(result) => result.configuration(rank),
            None => Err(TuneError::IndexOutOfRange { rank, retained: 0 }),
        }
    }

    /// Tries `candidate_count` configurations (baseline included) on
    /// `model` and retains at most `max_results_to_retain` ranked entries.
    ///
    /// # Errors
    ///
    /// - [`TuneError::InvalidArgument`] if `candidate_count` is 0,
    ///   `max_results_to_retain` is below 2 or the tune config is invalid.
    /// - [`TuneError::Configuration`] if the baseline is not accepted by
    ///   the gateway's schema.
    /// - [`TuneError::Aborted`] if no candidate produced a solution; the
    ///   baseline stays available at rank 0.
    pub fn tune(
        &mut self,
        model: &FrozenModel,
        candidate_count: usize,
        max_results_to_retain: usize,
    ) -> Result<&TuningResult, TuneError> {
        if candidate_count == 0 {
            return Err(TuneError::InvalidArgument(
                "candidate_count must be at least 1".into(),
            ));
        }
        if max_results_to_retain < 2 {
            return Err(TuneError::InvalidArgument(format!(
                "max_results_to_retain must be at least 2, got {max_results_to_retain}"
            )));
        }
        self.config.validate().map_err(TuneError::InvalidArgument)?;
        self.gateway.schema().validate(&self.config.baseline)?;

        self.state = TuneState::Running;
        self.result = None;
        let start = Instant::now();
        tracing::info!(
            component = "tune",
            operation = "tune",
            status = "started",
            gateway = self.gateway.name(),
            model = %model.id(),
            candidates = candidate_count,
            retain = max_results_to_retain,
            "Tuning started"
        );

        let mut candidates = vec![self.config.baseline.clone()];
        candidates.extend(self.generator.generate(
            &self.config.baseline,
            self.gateway.schema(),
            candidate_count - 1,
        ));

        let evaluator = Evaluator {
            gateway: self.gateway,
            config: &self.config,
        };
        let mut outcomes: Vec<Result<Score, CandidateFailure>> =
            Vec::with_capacity(candidates.len());
        outcomes.push(evaluator.evaluate(model, 0, &candidates[0]));
        let width = evaluator.concurrency();
        let mut next = 1;
        while next < candidates.len() {
            if self
                .config
                .time_limit
                .is_some_and(|limit| start.elapsed() >= limit)
            {
                tracing::info!(
                    component = "tune",
                    operation = "tune",
                    elapsed_ms = start.elapsed().as_secs_f64() * 1e3,
                    remaining = candidates.len() - next,
                    "Tuning time limit reached"
                );
                break;
            }
            let end = (next + width).min(candidates.len());
            outcomes.extend(evaluator.evaluate_batch(model, next, &candidates[next..end]));
            next = end;
        }

        let result = rank(candidates, outcomes, max_results_to_retain);
        let viable = result.entries.len() > 1;
        self.state = if viable {
            TuneState::Completed
        } else {
            TuneState::Aborted
        };
        tracing::info!(
            component = "tune",
            operation = "tune",
            status = if viable { "completed" } else { "aborted" },
            attempted = result.attempted,
            failed = result.failures.len(),
            skipped = result.skipped,
            elapsed_ms = start.elapsed().as_secs_f64() * 1e3,
            "Tuning finished"
        );

        let attempted = result.attempted;
        let result = self.result.insert(result);
        if viable {
            Ok(result)
        } else {
            Err(TuneError::Aborted { attempted })
        }
    }
}

/// Solves candidates for one tuning run.
struct Evaluator<'a, G: SolverGateway + ?Sized> {
    gateway: &'a G,
    config: &'a TuneConfig,
}

impl<G: SolverGateway + ?Sized> Evaluator<'_, G> {
    fn concurrency(&self) -> usize {
        if self.config.parallel && cfg!(feature = "parallel") {
            self.gateway.max_concurrent_solves().max(1)
        } else {
            1
        }
    }

    #[cfg(feature = "parallel")]
    fn evaluate_batch(
        &self,
        model: &FrozenModel,
        first: usize,
        batch: &[Configuration],
    ) -> Vec<Result<Score, CandidateFailure>> {
        use rayon::prelude::*;

        if batch.len() == 1 {
            return vec![self.evaluate(model, first, &batch[0])];
        }
        batch
            .par_iter()
            .enumerate()
            .map(|(i, c)| self.evaluate(model, first + i, c))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn evaluate_batch(
        &self,
        model: &FrozenModel,
        first: usize,
        batch: &[Configuration],
    ) -> Vec<Result<Score, CandidateFailure>> {
        batch
            .iter()
            .enumerate()
            .map(|(i, c)| self.evaluate(model, first + i, c))
            .collect()
    }

    /// Configuration actually submitted for `trial` of `candidate`.
    fn submission(
        &self,
        candidate: &Configuration,
        trial: usize,
    ) -> Result<Configuration, SolveError> {
        let mut submitted = candidate.clone();
        if trial > 0 && self.gateway.schema().contains(SEED) {
            let base = candidate.get_i64(SEED).unwrap_or(0);
            let seed = (base + trial as i64).rem_euclid(i64::from(i32::MAX) + 1);
            submitted = submitted.with_value(SEED, seed)?;
        }
        if let Some(limit) = self.config.candidate_time_limit {
            submitted = submitted.with_value(TIME_LIMIT, ParamValue::Float(limit))?;
        }
        Ok(submitted)
    }

    /// Solves one candidate for every trial, retrying retryable failures.
    fn evaluate(
        &self,
        model: &FrozenModel,
        index: usize,
        candidate: &Configuration,
    ) -> Result<Score, CandidateFailure> {
        let mut objectives = Vec::new();
        let mut runtimes = Vec::new();
        let mut last_error: Option<SolveError> = None;
        let mut attempts = 0;

        for trial in 0..self.config.trials {
            let outcome = self.submission(candidate, trial).and_then(|submitted| {
                let mut retries = 0;
                loop {
                    attempts += 1;
                    match self.gateway.submit(model, &submitted) {
                        Err(e) if e.is_retryable() && retries < self.config.max_retries => {
                            retries += 1;
                            tracing::warn!(
                                component = "tune",
                                operation = "evaluate",
                                candidate = index,
                                trial,
                                retry = retries,
                                error = %e,
                                "Retrying candidate after retryable failure"
                            );
                        }
                        other => break other,
                    }
                }
            });
            match outcome {
                Ok(solution) => match solution.objective_value {
                    Some(objective) => {
                        objectives.push(objective);
                        runtimes.push(solution.runtime);
                    }
                    None => {
                        last_error =
                            Some(SolveFailure::engine("solution without objective value").into())
                    }
                },
                Err(e) => last_error = Some(e),
            }
        }

        if objectives.is_empty() {
            let (kind, message) = match &last_error {
                Some(SolveError::Failure(f)) => (Some(f.kind), f.to_string()),
                Some(e) => (None, e.to_string()),
                None => (None, "no trial ran".to_string()),
            };
            tracing::warn!(
                component = "tune",
                operation = "evaluate",
                status = "failed",
                candidate = index,
                attempts,
                error = %message,
                "Candidate produced no solution"
            );
            return Err(CandidateFailure {
                candidate: index,
                configuration: candidate.clone(),
                kind,
                message,
                attempts,
            });
        }

        let n = objectives.len();
        let objective = objectives.iter().sum::<f64>() / n as f64;
        let runtime =
            Duration::from_secs_f64(runtimes.iter().map(Duration::as_secs_f64).sum::<f64>() / n as f64);
        let score = Score {
            feasible: n == self.config.trials,
            objective,
            normalized_objective: model.objective().sense.normalize(objective),
            runtime,
        };
        tracing::debug!(
            component = "tune",
            operation = "evaluate",
            status = "success",
            candidate = index,
            configuration = %candidate,
            objective,
            feasible = score.feasible,
            runtime_ms = runtime.as_secs_f64() * 1e3,
            "Evaluated candidate"
        );
        Ok(score)
    }
}

fn rank(
    candidates: Vec<Configuration>,
    outcomes: Vec<Result<Score, CandidateFailure>>,
    retain: usize,
) -> TuningResult {
    let attempted = outcomes.len();
    let skipped = candidates.len() - attempted;
    let mut scored = Vec::new();
    let mut failures = Vec::new();
    let mut baseline_score = None;
    for (index, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            Ok(score) => {
                if index == 0 {
                    baseline_score = Some(score);
                }
                scored.push((index, score));
            }
            Err(failure) => failures.push(failure),
        }
    }
    // stable: equal scores keep attempt order
    scored.sort_by(|a, b| a.1.cmp(&b.1));

    let mut entries = Vec::with_capacity(retain.min(scored.len() + 1));
    entries.push(TuningEntry {
        candidate: 0,
        configuration: candidates[0].clone(),
        score: baseline_score,
    });
    entries.extend(
        scored
            .into_iter()
            .take(retain - 1)
            .map(|(index, score)| TuningEntry {
                candidate: index,
                configuration: candidates[index].clone(),
                score: Some(score),
            }),
    );
    TuningResult {
        entries,
        failures,
        attempted,
        skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParameterSchema;
    use crate::model::{Model, ObjectiveSense, PolicyFlag, Relation, VarKind};
    use crate::solver::{FailureKind, GridScanGateway, Solution, SCAN_POINTS};
    use crate::tune::{FixedCandidates, RandomCandidates};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// sin(x) + cos(2x) + 1 with exact functions; coarser grids land
    /// further from the optimum at x = pi/2.
    fn funcnonlinear() -> FrozenModel {
        let mut m = Model::new("funcnonlinear");
        let x = m.add_variable(-1.0, 4.0, VarKind::Continuous, "x").unwrap();
        let twox = m.add_variable(-2.0, 8.0, VarKind::Continuous, "twox").unwrap();
        let sinx = m.add_variable(-1.0, 1.0, VarKind::Continuous, "sinx").unwrap();
        let cos2x = m.add_variable(-1.0, 1.0, VarKind::Continuous, "cos2x").unwrap();
        let expx = m
            .add_variable(0.0, f64::INFINITY, VarKind::Continuous, "expx")
            .unwrap();
        m.set_objective(sinx + cos2x + 1.0, ObjectiveSense::Minimize);
        m.add_constraint(0.25 * expx - x, Relation::LessEqual, 0.0, "l1")
            .unwrap();
        m.add_constraint(2.0 * x - twox, Relation::Equal, 0.0, "l2")
            .unwrap();
        m.add_gen_constr_sin(x, sinx, "gcf1").unwrap();
        m.add_gen_constr_cos(twox, cos2x, "gcf2").unwrap();
        m.add_gen_constr_exp(x, expx, "gcf3").unwrap();
        m.set_policy(PolicyFlag::FuncNonlinear, true);
        m.finalize().unwrap()
    }

    fn points(n: i64) -> Configuration {
        Configuration::builder().set(SCAN_POINTS, n).build().unwrap()
    }

    fn fixed(ns: &[i64]) -> FixedCandidates {
        FixedCandidates::new(ns.iter().map(|&n| points(n)).collect())
    }

    #[test]
    fn test_baseline_at_rank_zero() {
        let gw = GridScanGateway::new();
        let model = funcnonlinear();
        let config = TuneConfig::default().with_baseline(points(51));
        let mut tuner = TuningOrchestrator::new(&gw, fixed(&[11, 101, 201]), config);
        assert_eq!(tuner.state(), TuneState::Idle);

        let result = tuner.tune(&model, 4, 2).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result.attempted(), 4);
        assert_eq!(tuner.state(), TuneState::Completed);
        assert_eq!(tuner.get_result(0).unwrap(), &points(51));
        assert_eq!(tuner.get_result(1).unwrap(), &points(201));
        assert!(matches!(
            tuner.get_result(2),
            Err(TuneError::IndexOutOfRange { rank: 2, retained: 2 })
        ));
    }

    #[test]
    fn test_full_ranking() {
        let gw = GridScanGateway::new();
        let model = funcnonlinear();
        let config = TuneConfig::default().with_baseline(points(51));
        let mut tuner = TuningOrchestrator::new(&gw, fixed(&[11, 101, 201]), config);
        let result = tuner.tune(&model, 4, 10).unwrap();

        let ranked: Vec<usize> = result.entries().iter().map(|e| e.candidate).collect();
        // baseline, then 201, 101, 51 (baseline again), 11
        assert_eq!(ranked, vec![0, 3, 2, 0, 1]);
        let objectives: Vec<f64> = result.entries()[1..]
            .iter()
            .map(|e| e.score.unwrap().objective)
            .collect();
        assert!(objectives.windows(2).all(|w| w[0] <= w[1]));
        assert!(result.failures().is_empty());
    }

    #[test]
    fn test_baseline_can_be_best() {
        let gw = GridScanGateway::new();
        let model = funcnonlinear();
        let config = TuneConfig::default().with_baseline(points(201));
        let mut tuner = TuningOrchestrator::new(&gw, fixed(&[11, 51]), config);
        let result = tuner.tune(&model, 3, 2).unwrap();
        assert_eq!(result.best().unwrap().candidate, 0);
        assert_eq!(tuner.get_result(1).unwrap(), tuner.get_result(0).unwrap());
    }

    #[test]
    fn test_partial_failures_recorded() {
        let gw = GridScanGateway::new();
        let model = funcnonlinear();
        let broken = Configuration::builder()
            .set(SCAN_POINTS, 101)
            .set(TIME_LIMIT, 0.0)
            .build()
            .unwrap();
        let bogus = Configuration::builder().set("NoSuchParam", 1).build().unwrap();
        let mut tuner = TuningOrchestrator::new(
            &gw,
            FixedCandidates::new(vec![broken, points(101), bogus]),
            TuneConfig::default(),
        );
        let result = tuner.tune(&model, 4, 10).unwrap().clone();
        assert_eq!(tuner.state(), TuneState::Completed);
        assert_eq!(result.failures().len(), 2);
        assert_eq!(result.failures()[0].candidate, 1);
        assert_eq!(result.failures()[0].kind, Some(FailureKind::TimedOut));
        assert_eq!(result.failures()[1].kind, None);
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_abort_when_nothing_solves() {
        let gw = GridScanGateway::new();
        let mut m = Model::new("infeasible");
        let x = m.add_variable(0.0, 1.0, VarKind::Continuous, "x").unwrap();
        m.add_constraint(x, Relation::GreaterEqual, 2.0, "c").unwrap();
        let model = m.finalize().unwrap();

        let mut tuner = TuningOrchestrator::new(&gw, fixed(&[11, 51]), TuneConfig::default());
        let err = tuner.tune(&model, 3, 2).unwrap_err();
        assert!(matches!(err, TuneError::Aborted { attempted: 3 }));
        assert_eq!(tuner.state(), TuneState::Aborted);
        assert!(tuner.get_result(0).unwrap().is_empty());
        assert!(tuner.get_result(1).is_err());
        assert_eq!(tuner.result().unwrap().failures().len(), 3);
        assert!(tuner.result().unwrap().baseline().unwrap().score.is_none());
    }

    #[test]
    fn test_invalid_arguments() {
        let gw = GridScanGateway::new();
        let model = funcnonlinear();
        let mut tuner = TuningOrchestrator::new(&gw, fixed(&[]), TuneConfig::default());
        assert!(matches!(
            tuner.tune(&model, 3, 1),
            Err(TuneError::InvalidArgument(_))
        ));
        assert!(matches!(
            tuner.tune(&model, 0, 2),
            Err(TuneError::InvalidArgument(_))
        ));
        assert_eq!(tuner.state(), TuneState::Idle);

        let bad_baseline = Configuration::builder().set("Bogus", 1).build().unwrap();
        let mut tuner = TuningOrchestrator::new(
            &gw,
            fixed(&[]),
            TuneConfig::default().with_baseline(bad_baseline),
        );
        assert!(matches!(
            tuner.tune(&model, 1, 2),
            Err(TuneError::Configuration(_))
        ));
    }

    #[test]
    fn test_get_result_before_tune() {
        let gw = GridScanGateway::new();
        let tuner = TuningOrchestrator::new(&gw, fixed(&[]), TuneConfig::default());
        assert!(matches!(
            tuner.get_result(0),
            Err(TuneError::IndexOutOfRange { rank: 0, retained: 0 })
        ));
    }

    #[test]
    fn test_time_limit_runs_baseline_only() {
        let gw = GridScanGateway::new();
        let model = funcnonlinear();
        let config = TuneConfig::default().with_time_limit(Duration::ZERO);
        let mut tuner = TuningOrchestrator::new(&gw, fixed(&[11, 51, 101]), config);
        let result = tuner.tune(&model, 4, 5).unwrap();
        assert_eq!(result.attempted(), 1);
        assert_eq!(result.skipped(), 3);
        assert_eq!(result.len(), 2);
        assert_eq!(result.best().unwrap().candidate, 0);
    }

    #[test]
    fn test_huge_candidate_count() {
        let gw = GridScanGateway::new();
        let model = funcnonlinear();
        let config = TuneConfig::default().with_baseline(points(51));
        let mut tuner = TuningOrchestrator::new(&gw, fixed(&[101]), config);
        let result = tuner.tune(&model, usize::MAX, 2).unwrap();
        assert_eq!(result.attempted(), 2);
        assert_eq!(tuner.get_result(1).unwrap(), &points(101));
    }

    /// Delegates to a grid scan and records every submitted configuration.
    struct Recording {
        inner: GridScanGateway,
        seen: Mutex<Vec<Configuration>>,
    }

    impl SolverGateway for Recording {
        fn name(&self) -> &str {
            "recording"
        }

        fn schema(&self) -> &ParameterSchema {
            self.inner.schema()
        }

        fn solve(
            &self,
            model: &FrozenModel,
            configuration: &Configuration,
        ) -> Result<Solution, SolveError> {
            self.seen.lock().unwrap().push(configuration.clone());
            self.inner.solve(model, configuration)
        }
    }

    #[test]
    fn test_trials_vary_seed_and_time_limit_applied() {
        let gw = Recording {
            inner: GridScanGateway::new(),
            seen: Mutex::new(Vec::new()),
        };
        let model = funcnonlinear();
        let config = TuneConfig::default()
            .with_trials(3)
            .with_candidate_time_limit(30.0);
        let mut tuner = TuningOrchestrator::new(&gw, fixed(&[]), config);
        let result = tuner.tune(&model, 1, 2).unwrap();
        assert!(result.baseline().unwrap().configuration.is_empty());
        assert!(result.best().unwrap().score.unwrap().feasible);

        // the recorded configuration is the candidate, not the submission
        assert!(!result.best().unwrap().configuration.contains(TIME_LIMIT));

        let seen = gw.seen.lock().unwrap();
        let seeds: Vec<Option<i64>> = seen.iter().map(|c| c.get_i64(SEED)).collect();
        assert_eq!(seeds, vec![None, Some(1), Some(2)]);
        assert!(seen.iter().all(|c| c.get_f64(TIME_LIMIT) == Some(30.0)));
    }

    /// Fails with a retryable error for the first `failures` solves.
    struct Flaky {
        inner: GridScanGateway,
        failures: usize,
        calls: AtomicUsize,
    }

    impl SolverGateway for Flaky {
        fn name(&self) -> &str {
            "flaky"
        }

        fn schema(&self) -> &ParameterSchema {
            self.inner.schema()
        }

        fn solve(
            &self,
            model: &FrozenModel,
            configuration: &Configuration,
        ) -> Result<Solution, SolveError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) < self.failures {
                return Err(SolveFailure::engine("license busy")
                    .with_retryable(true)
                    .into());
            }
            self.inner.solve(model, configuration)
        }
    }

    #[test]
    fn test_retryable_failures_retried() {
        let model = funcnonlinear();
        let gw = Flaky {
            inner: GridScanGateway::new(),
            failures: 2,
            calls: AtomicUsize::new(0),
        };
        let mut tuner = TuningOrchestrator::new(
            &gw,
            fixed(&[]),
            TuneConfig::default().with_max_retries(2),
        );
        assert!(tuner.tune(&model, 1, 2).is_ok());
        assert_eq!(gw.calls.load(Ordering::SeqCst), 3);

        let gw = Flaky {
            inner: GridScanGateway::new(),
            failures: 2,
            calls: AtomicUsize::new(0),
        };
        let mut tuner = TuningOrchestrator::new(
            &gw,
            fixed(&[]),
            TuneConfig::default().with_max_retries(1),
        );
        assert!(matches!(tuner.tune(&model, 1, 2), Err(TuneError::Aborted { .. })));
        let failure = &tuner.result().unwrap().failures()[0];
        assert_eq!(failure.attempts, 2);
        assert_eq!(failure.kind, Some(FailureKind::EngineError));
    }

    #[test]
    fn test_write_best_omits_per_solve_time_limit() {
        let gw = GridScanGateway::new();
        let model = funcnonlinear();
        let config = TuneConfig::default()
            .with_baseline(points(51))
            .with_candidate_time_limit(30.0);
        let mut tuner = TuningOrchestrator::new(&gw, fixed(&[201]), config);
        let result = tuner.tune(&model, 2, 2).unwrap();

        let path = std::env::temp_dir().join(format!("u_optmodel_{}_limit.prm", std::process::id()));
        result.write_best(&path).unwrap();
        let back = Configuration::read_prm_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(back, points(201));
        assert!(!back.contains(TIME_LIMIT));
    }

    #[test]
    fn test_write_best_round_trip() {
        let gw = GridScanGateway::new();
        let model = funcnonlinear();
        let config = TuneConfig::default().with_baseline(points(51));
        let mut tuner = TuningOrchestrator::new(&gw, fixed(&[201]), config);
        let result = tuner.tune(&model, 2, 2).unwrap();

        let path = std::env::temp_dir().join(format!("u_optmodel_{}_tune.prm", std::process::id()));
        result.write_best(&path).unwrap();
        let back = Configuration::read_prm_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(&back, tuner.get_result(1).unwrap());

        // apply the tuned configuration
        let solution = gw.submit(&model, &back).unwrap();
        assert!((solution.objective_value.unwrap() - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_random_candidates_end_to_end() {
        let gw = GridScanGateway::new();
        let model = funcnonlinear();
        let mut tuner = TuningOrchestrator::new(&gw, RandomCandidates::new(3), TuneConfig::default());
        let result = tuner.tune(&model, 6, 3).unwrap();
        assert_eq!(result.len(), 3);
        assert!(result.entries()[1].score <= result.entries()[2].score);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let model = funcnonlinear();
        let gw = GridScanGateway::new().with_max_concurrent_solves(4);
        let base = TuneConfig::default().with_baseline(points(51));

        let mut seq = TuningOrchestrator::new(&gw, fixed(&[11, 101, 201]), base.clone());
        let mut par =
            TuningOrchestrator::new(&gw, fixed(&[11, 101, 201]), base.with_parallel(true));
        let a: Vec<usize> = seq
            .tune(&model, 4, 10)
            .unwrap()
            .entries()
            .iter()
            .map(|e| e.candidate)
            .collect();
        let b: Vec<usize> = par
            .tune(&model, 4, 10)
            .unwrap()
            .entries()
            .iter()
            .map(|e| e.candidate)
            .collect();
        assert_eq!(a, b);
    }
}
