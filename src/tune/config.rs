//! Tuning configuration.

use crate::config::Configuration;
use std::time::Duration;

/// Configuration of a [`TuningOrchestrator`](super::TuningOrchestrator).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_optmodel::config::Configuration;
/// use u_optmodel::tune::TuneConfig;
///
/// let baseline = Configuration::builder().set("TimeLimit", 60.0).build().unwrap();
/// let config = TuneConfig::default()
///     .with_baseline(baseline)
///     .with_trials(3)
///     .with_max_retries(2)
///     .with_time_limit(Duration::from_secs(600));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct TuneConfig {
    /// Configuration of candidate 0. Every generated candidate starts from
    /// it.
    pub baseline: Configuration,

    /// Resubmissions allowed after a retryable failure, per solve.
    pub max_retries: usize,

    /// Solves per candidate. Trials after the first vary `Seed`.
    pub trials: usize,

    /// Overall budget. Checked between candidates; the baseline always
    /// runs.
    pub time_limit: Option<Duration>,

    /// `TimeLimit` (seconds) applied to every solve. Not part of the
    /// recorded candidate configurations.
    pub candidate_time_limit: Option<f64>,

    /// Whether to evaluate candidates in parallel (feature `parallel`),
    /// bounded by the gateway's concurrency limit.
    pub parallel: bool,
}

impl Default for TuneConfig {
    fn default() -> Self {
        Self {
            baseline: Configuration::new(),
            max_retries: 1,
            trials: 1,
            time_limit: None,
            candidate_time_limit: None,
            parallel: false,
        }
    }
}

impl TuneConfig {
    pub fn with_baseline(mut self, baseline: Configuration) -> Self {
        self.baseline = baseline;
        self
    }

    pub fn with_max_retries(mut self, n: usize) -> Self {
        self.max_retries = n;
        self
    }

    pub fn with_trials(mut self, n: usize) -> Self {
        self.trials = n;
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn with_candidate_time_limit(mut self, seconds: f64) -> Self {
        self.candidate_time_limit = Some(seconds);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.trials == 0 {
            return Err("trials must be at least 1".into());
        }
        if let Some(t) = self.candidate_time_limit {
            if !(t >= 0.0) {
                return Err(format!("candidate_time_limit must be non-negative, got {t}"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TuneConfig::default();
        assert_eq!(config.trials, 1);
        assert_eq!(config.max_retries, 1);
        assert!(config.baseline.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_bad_values() {
        assert!(TuneConfig::default().with_trials(0).validate().is_err());
        assert!(TuneConfig::default()
            .with_candidate_time_limit(-1.0)
            .validate()
            .is_err());
        assert!(TuneConfig::default()
            .with_candidate_time_limit(f64::NAN)
            .validate()
            .is_err());
    }
}
