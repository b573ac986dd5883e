//! Null-model driver.
//!
//! Runs a randomizer many times over an observed matrix, evaluates a
//! statistic on every randomized copy and streams the values into a
//! [`RunningStats`].
//!
//! # Determinism
//!
//! Iteration `i` draws from `PamRng::from_seed(derive_seed(base_seed, i))`.
//! Iterations are evaluated in parallel batches, but values are pushed in
//! iteration order, so a run is fully reproducible from its base seed.

use pam_core::BinaryMatrix;
use pam_randomize::{derive_seed, PamRng, RandomizeError, Randomizer};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::NullModelError;
use crate::stats::{Comparison, RunningStats};

/// Iterations evaluated per parallel batch.
pub const DEFAULT_BATCH_SIZE: usize = 64;

/// What to do when a randomization fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ErrorPolicy {
    /// Abort the run on the first failure.
    #[default]
    FailFast,
    /// Skip failed iterations and report them.
    SkipFailed,
}

/// Null-model run settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NullModelConfig {
    /// Number of randomizations.
    pub iterations: usize,
    /// Base seed; drawn from entropy when `None`.
    pub base_seed: Option<u64>,
    /// Failure handling.
    pub error_policy: ErrorPolicy,
    /// Iterations per parallel batch.
    pub batch_size: usize,
}

impl NullModelConfig {
    /// Creates settings for `iterations` randomizations with defaults
    /// otherwise.
    pub fn new(iterations: usize) -> Self {
        Self {
            iterations,
            base_seed: None,
            error_policy: ErrorPolicy::FailFast,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Sets the base seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.base_seed = Some(seed);
        self
    }

    /// Sets the failure handling.
    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    /// Sets the batch size (at least 1).
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }
}

/// An iteration skipped under [`ErrorPolicy::SkipFailed`].
#[derive(Clone, Debug, PartialEq)]
pub struct SkippedIteration {
    /// Zero-based iteration index.
    pub iteration: usize,
    /// Why the randomization failed.
    pub error: RandomizeError,
}

/// Summary of a completed run.
#[derive(Clone, Debug, PartialEq)]
pub struct NullModelReport {
    /// Base seed the iteration seeds were derived from.
    pub base_seed: u64,
    /// Iterations requested.
    pub requested: usize,
    /// Iterations whose value reached the accumulator.
    pub completed: usize,
    /// Iterations skipped, in order.
    pub skipped: Vec<SkippedIteration>,
}

impl NullModelReport {
    /// Returns `true` if no iteration was skipped.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Drives a [`Randomizer`] through a null-model run.
///
/// # Examples
///
/// ```rust
/// use pam_core::BinaryMatrix;
/// use pam_nullmodel::runner::{NullModelConfig, NullModelRunner};
/// use pam_nullmodel::stats::Comparison;
/// use pam_randomize::SwapRandomizer;
///
/// let observed = BinaryMatrix::from_rows(&[
///     [1, 0, 1, 0],
///     [0, 1, 1, 0],
///     [1, 1, 0, 1],
/// ]).unwrap();
///
/// let runner = NullModelRunner::new(
///     SwapRandomizer::new(100).unwrap(),
///     NullModelConfig::new(50).with_seed(7),
/// );
/// // Statistic: number of species present in the first site.
/// let (stats, report) = runner
///     .run_with_observed(&observed, |m| vec![m.row_totals()[0] as f64], Comparison::Signed)
///     .unwrap();
///
/// assert_eq!(report.completed, 50);
/// assert_eq!(stats.mean(), &[2.0]);
/// ```
#[derive(Clone, Debug)]
pub struct NullModelRunner<R> {
    randomizer: R,
    config: NullModelConfig,
}

impl<R: Randomizer> NullModelRunner<R> {
    /// Creates a runner.
    pub fn new(randomizer: R, config: NullModelConfig) -> Self {
        Self { randomizer, config }
    }

    /// Run settings.
    pub fn config(&self) -> &NullModelConfig {
        &self.config
    }

    /// The randomizer being driven.
    pub fn randomizer(&self) -> &R {
        &self.randomizer
    }

    /// Runs the configured number of randomizations and pushes
    /// `statistic(randomized)` for each into `stats`.
    ///
    /// # Errors
    ///
    /// - `Iteration` for the first failed randomization under
    ///   [`ErrorPolicy::FailFast`]
    /// - `Stats` if a statistic value has the wrong length
    pub fn run<F>(
        &self,
        observed: &BinaryMatrix,
        statistic: F,
        stats: &mut RunningStats,
    ) -> Result<NullModelReport, NullModelError>
    where
        F: Fn(&BinaryMatrix) -> Vec<f64> + Sync + Send,
    {
        let base_seed = self.config.base_seed.unwrap_or_else(rand_seed);
        let iterations = self.config.iterations;
        let batch_size = self.config.batch_size.max(1);
        debug!(
            algorithm = self.randomizer.name(),
            iterations,
            base_seed,
            "null model run"
        );

        let mut report = NullModelReport {
            base_seed,
            requested: iterations,
            completed: 0,
            skipped: Vec::new(),
        };

        let mut start = 0;
        while start < iterations {
            let end = (start + batch_size).min(iterations);
            let results: Vec<Result<Vec<f64>, RandomizeError>> = (start..end)
                .into_par_iter()
                .map(|i| {
                    let mut rng = PamRng::from_seed(derive_seed(base_seed, i as u64));
                    self.randomizer
                        .randomize(observed, &mut rng)
                        .map(|randomized| statistic(&randomized))
                })
                .collect();

            for (iteration, result) in (start..end).zip(results) {
                match result {
                    Ok(value) => {
                        stats.push(&value)?;
                        report.completed += 1;
                    }
                    Err(error) => match self.config.error_policy {
                        ErrorPolicy::FailFast => {
                            return Err(NullModelError::Iteration {
                                iteration,
                                source: error,
                            });
                        }
                        ErrorPolicy::SkipFailed => {
                            warn!(iteration, %error, "skipping failed randomization");
                            report.skipped.push(SkippedIteration { iteration, error });
                        }
                    },
                }
            }
            start = end;
        }

        debug!(
            completed = report.completed,
            skipped = report.skipped.len(),
            "null model run finished"
        );
        Ok(report)
    }

    /// Evaluates `statistic` on `observed`, then runs the null model
    /// against it and returns the filled accumulator.
    pub fn run_with_observed<F>(
        &self,
        observed: &BinaryMatrix,
        statistic: F,
        comparison: Comparison,
    ) -> Result<(RunningStats, NullModelReport), NullModelError>
    where
        F: Fn(&BinaryMatrix) -> Vec<f64> + Sync + Send,
    {
        let mut stats = RunningStats::with_observed(statistic(observed), comparison);
        let report = self.run(observed, statistic, &mut stats)?;
        Ok((stats, report))
    }
}

fn rand_seed() -> u64 {
    PamRng::from_entropy().seed()
}
