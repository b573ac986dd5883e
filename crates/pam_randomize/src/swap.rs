//! Swap and trial-swap randomizers.
//!
//! Both draw two distinct rows and two distinct columns uniformly and flip
//! the 2x2 submatrix when it is a checkerboard. A flip keeps every row and
//! column total, so the output always has the input's marginals.
//!
//! - [`SwapRandomizer`] counts successful swaps and bounds the number of
//!   consecutive failures
//! - [`TrialSwapRandomizer`] counts every attempt

use pam_core::BinaryMatrix;
use tracing::debug;

use crate::config::{check_count, RandomizeConfig};
use crate::error::{ConfigError, Degeneracy, RandomizeError};
use crate::randomizer::Randomizer;
use crate::rng::PamRng;
use crate::validate::check_swappable;

/// Attempts one swap on `work`. Returns `true` if the cells were flipped.
#[inline]
pub(crate) fn try_swap(work: &mut BinaryMatrix, rng: &mut PamRng) -> bool {
    let (r1, r2) = rng.gen_distinct_pair(work.n_rows());
    let (c1, c2) = rng.gen_distinct_pair(work.n_cols());

    let a = work.get(r1, c1);
    let b = work.get(r1, c2);
    let c = work.get(r2, c1);
    let d = work.get(r2, c2);

    if a != b && a == d && b == c {
        work.flip(r1, c1);
        work.flip(r1, c2);
        work.flip(r2, c1);
        work.flip(r2, c2);
        true
    } else {
        false
    }
}

/// Performs exactly `num_swaps` successful swaps on `work`.
///
/// `attempts` counts failures since the last success; reaching
/// `max_attempts` ends the search with `AttemptsExhausted`.
pub(crate) fn run_swaps(
    work: &mut BinaryMatrix,
    num_swaps: usize,
    max_attempts: usize,
    rng: &mut PamRng,
) -> Result<(), RandomizeError> {
    let mut completed = 0;
    let mut attempts = 0;
    while completed < num_swaps {
        if attempts >= max_attempts {
            return Err(RandomizeError::DegenerateMatrix(
                Degeneracy::AttemptsExhausted {
                    attempts,
                    completed,
                    requested: num_swaps,
                },
            ));
        }
        if try_swap(work, rng) {
            completed += 1;
            attempts = 0;
        } else {
            attempts += 1;
        }
    }
    Ok(())
}

/// Randomizer performing a fixed number of successful swaps.
///
/// # Examples
///
/// ```rust
/// use pam_core::BinaryMatrix;
/// use pam_randomize::rng::PamRng;
/// use pam_randomize::swap::SwapRandomizer;
///
/// let observed = BinaryMatrix::from_rows(&[
///     [1, 0, 1, 0],
///     [0, 1, 0, 1],
///     [1, 1, 0, 0],
/// ]).unwrap();
///
/// let randomizer = SwapRandomizer::new(100).unwrap();
/// let mut rng = PamRng::from_seed(42);
/// let randomized = randomizer.randomize(&observed, &mut rng).unwrap();
///
/// assert_eq!(randomized.row_totals(), observed.row_totals());
/// assert_eq!(randomized.col_totals(), observed.col_totals());
/// ```
#[derive(Clone, Debug)]
pub struct SwapRandomizer {
    num_swaps: usize,
    config: RandomizeConfig,
}

impl SwapRandomizer {
    /// Creates a randomizer with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidCount` if `num_swaps` exceeds
    /// [`MAX_COUNT`](crate::config::MAX_COUNT).
    pub fn new(num_swaps: usize) -> Result<Self, ConfigError> {
        Self::with_config(num_swaps, RandomizeConfig::default())
    }

    /// Creates a randomizer with an explicit configuration.
    pub fn with_config(num_swaps: usize, config: RandomizeConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            num_swaps: check_count(num_swaps)?,
            config,
        })
    }

    /// Number of successful swaps per call.
    #[inline]
    pub fn num_swaps(&self) -> usize {
        self.num_swaps
    }

    /// Configuration in use.
    #[inline]
    pub fn config(&self) -> &RandomizeConfig {
        &self.config
    }

    /// Returns a randomized copy of `matrix`.
    ///
    /// # Errors
    ///
    /// Returns `DegenerateMatrix` if the matrix fails screening (even for
    /// zero swaps) or the pattern search exhausts its attempt bound.
    pub fn randomize(
        &self,
        matrix: &BinaryMatrix,
        rng: &mut PamRng,
    ) -> Result<BinaryMatrix, RandomizeError> {
        check_swappable(matrix, self.config.degeneracy())?;
        debug!(
            n_rows = matrix.n_rows(),
            n_cols = matrix.n_cols(),
            num_swaps = self.num_swaps,
            "swap randomization"
        );

        let mut work = matrix.clone();
        run_swaps(
            &mut work,
            self.num_swaps,
            self.config.max_attempts_per_swap(),
            rng,
        )?;
        Ok(work)
    }
}

impl Randomizer for SwapRandomizer {
    fn name(&self) -> &'static str {
        "swap"
    }

    fn randomize(
        &self,
        matrix: &BinaryMatrix,
        rng: &mut PamRng,
    ) -> Result<BinaryMatrix, RandomizeError> {
        SwapRandomizer::randomize(self, matrix, rng)
    }
}

/// Randomizes `matrix` with `num_swaps` successful swaps using the default
/// configuration.
pub fn swap_randomize(
    matrix: &BinaryMatrix,
    num_swaps: usize,
    rng: &mut PamRng,
) -> Result<BinaryMatrix, RandomizeError> {
    SwapRandomizer::new(num_swaps)?.randomize(matrix, rng)
}

/// Randomizer performing a fixed number of swap attempts.
///
/// Failed attempts count toward the total, so a call always terminates
/// after `num_trials` draws. Without an explicit count the matrix size
/// `n_rows * n_cols` is used.
#[derive(Clone, Debug)]
pub struct TrialSwapRandomizer {
    num_trials: Option<usize>,
    config: RandomizeConfig,
}

impl TrialSwapRandomizer {
    /// Creates a randomizer with the default configuration.
    pub fn new(num_trials: Option<usize>) -> Result<Self, ConfigError> {
        Self::with_config(num_trials, RandomizeConfig::default())
    }

    /// Creates a randomizer with an explicit configuration.
    pub fn with_config(
        num_trials: Option<usize>,
        config: RandomizeConfig,
    ) -> Result<Self, ConfigError> {
        let num_trials = num_trials.map(check_count).transpose()?;
        Ok(Self { num_trials, config })
    }

    /// Explicit trial count, if any.
    #[inline]
    pub fn num_trials(&self) -> Option<usize> {
        self.num_trials
    }

    /// Trial count used for `matrix`.
    pub fn trials_for(&self, matrix: &BinaryMatrix) -> usize {
        self.num_trials.unwrap_or_else(|| matrix.len())
    }

    /// Returns a randomized copy of `matrix`.
    ///
    /// # Errors
    ///
    /// Returns `DegenerateMatrix` if the matrix fails screening, and
    /// `Config` if the default trial count would exceed the maximum.
    pub fn randomize(
        &self,
        matrix: &BinaryMatrix,
        rng: &mut PamRng,
    ) -> Result<BinaryMatrix, RandomizeError> {
        check_swappable(matrix, self.config.degeneracy())?;
        let num_trials = check_count(self.trials_for(matrix))?;

        let mut work = matrix.clone();
        let swapped = (0..num_trials).filter(|_| try_swap(&mut work, rng)).count();
        debug!(
            n_rows = matrix.n_rows(),
            n_cols = matrix.n_cols(),
            num_trials,
            swapped,
            "trial swap randomization"
        );
        Ok(work)
    }
}

impl Randomizer for TrialSwapRandomizer {
    fn name(&self) -> &'static str {
        "trial_swap"
    }

    fn randomize(
        &self,
        matrix: &BinaryMatrix,
        rng: &mut PamRng,
    ) -> Result<BinaryMatrix, RandomizeError> {
        TrialSwapRandomizer::randomize(self, matrix, rng)
    }
}

/// Randomizes `matrix` with `num_trials` swap attempts (default `N*S`).
pub fn trial_swap(
    matrix: &BinaryMatrix,
    num_trials: Option<usize>,
    rng: &mut PamRng,
) -> Result<BinaryMatrix, RandomizeError> {
    TrialSwapRandomizer::new(num_trials)?.randomize(matrix, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DegeneracyPolicy, MAX_COUNT};

    fn observed() -> BinaryMatrix {
        BinaryMatrix::from_rows(&[
            [1, 0, 1, 0, 1],
            [0, 1, 1, 0, 0],
            [1, 1, 0, 1, 0],
            [0, 0, 1, 1, 1],
        ])
        .unwrap()
    }

    fn identity(n: usize) -> BinaryMatrix {
        let mut m = BinaryMatrix::zeros(n, n);
        for i in 0..n {
            m.set(i, i, true);
        }
        m
    }

    #[test]
    fn test_swap_preserves_marginals() {
        let m = observed();
        let mut rng = PamRng::from_seed(1);
        let out = swap_randomize(&m, 500, &mut rng).unwrap();
        assert_eq!(out.marginals(), m.marginals());
    }

    #[test]
    fn test_zero_swaps_returns_copy() {
        let m = observed();
        let mut rng = PamRng::from_seed(1);
        assert_eq!(swap_randomize(&m, 0, &mut rng).unwrap(), m);
    }

    #[test]
    fn test_zero_swaps_still_screened() {
        let m = BinaryMatrix::from_rows(&[[1, 1], [1, 0]]).unwrap();
        let mut rng = PamRng::from_seed(1);
        assert!(matches!(
            swap_randomize(&m, 0, &mut rng),
            Err(RandomizeError::DegenerateMatrix(_))
        ));
    }

    #[test]
    fn test_single_swap_on_identity_2x2() {
        let m = identity(2);
        let mut rng = PamRng::from_seed(9);
        let out = swap_randomize(&m, 1, &mut rng).unwrap();
        assert_eq!(out, BinaryMatrix::from_rows(&[[0, 1], [1, 0]]).unwrap());
    }

    #[test]
    fn test_same_seed_same_output() {
        let m = observed();
        let a = swap_randomize(&m, 200, &mut PamRng::from_seed(77)).unwrap();
        let b = swap_randomize(&m, 200, &mut PamRng::from_seed(77)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_attempts_exhausted() {
        // Checkerboards are rare in a sparse identity, so one attempt per
        // swap cannot complete a thousand swaps.
        let config = RandomizeConfig::builder()
            .max_attempts_per_swap(1)
            .build()
            .unwrap();
        let randomizer = SwapRandomizer::with_config(1000, config).unwrap();
        let err = randomizer
            .randomize(&identity(20), &mut PamRng::from_seed(3))
            .unwrap_err();
        assert!(matches!(
            err,
            RandomizeError::DegenerateMatrix(Degeneracy::AttemptsExhausted {
                attempts: 1,
                requested: 1000,
                ..
            })
        ));
    }

    fn differing_cells(a: &BinaryMatrix, b: &BinaryMatrix) -> usize {
        a.as_slice()
            .iter()
            .zip(b.as_slice())
            .filter(|(x, y)| x != y)
            .count()
    }

    #[test]
    fn test_failed_trials_count_toward_budget() {
        let config = RandomizeConfig::builder()
            .max_attempts_per_swap(1)
            .build()
            .unwrap();
        let m = identity(20);

        let swaps = SwapRandomizer::with_config(1000, config.clone()).unwrap();
        assert!(matches!(
            swaps.randomize(&m, &mut PamRng::from_seed(3)),
            Err(RandomizeError::DegenerateMatrix(Degeneracy::AttemptsExhausted { .. }))
        ));

        let trials = TrialSwapRandomizer::with_config(Some(1000), config.clone()).unwrap();
        let out = trials.randomize(&m, &mut PamRng::from_seed(3)).unwrap();
        assert_eq!(out.marginals(), m.marginals());
        assert!(differing_cells(&out, &m) <= 4 * 1000);

        // About one trial in 190 hits a checkerboard here, so ten trials
        // leave the identity untouched for almost every seed.
        let few = TrialSwapRandomizer::with_config(Some(10), config).unwrap();
        let mut unchanged = 0;
        for seed in 0..20 {
            let out = few.randomize(&m, &mut PamRng::from_seed(seed)).unwrap();
            assert!(differing_cells(&out, &m) <= 4 * 10);
            if out == m {
                unchanged += 1;
            }
        }
        assert!(unchanged >= 15, "only {unchanged} of 20 runs unchanged");
    }

    #[test]
    fn test_count_above_maximum_rejected() {
        assert_eq!(
            SwapRandomizer::new(MAX_COUNT + 1).unwrap_err(),
            ConfigError::InvalidCount(MAX_COUNT + 1)
        );
        assert!(TrialSwapRandomizer::new(Some(MAX_COUNT + 1)).is_err());
    }

    #[test]
    fn test_lenient_policy_swaps_around_full_row() {
        let m = BinaryMatrix::from_rows(&[[1, 1, 1], [1, 0, 0], [0, 1, 0]]).unwrap();
        let config = RandomizeConfig::builder()
            .degeneracy(DegeneracyPolicy::Lenient)
            .build()
            .unwrap();
        let out = SwapRandomizer::with_config(10, config)
            .unwrap()
            .randomize(&m, &mut PamRng::from_seed(5))
            .unwrap();
        assert_eq!(out.marginals(), m.marginals());
        assert_eq!(out.row(0), &[1, 1, 1]);
    }

    #[test]
    fn test_trial_swap_preserves_marginals() {
        let m = observed();
        let out = trial_swap(&m, Some(1000), &mut PamRng::from_seed(2)).unwrap();
        assert_eq!(out.marginals(), m.marginals());
    }

    #[test]
    fn test_trial_swap_default_count() {
        let m = observed();
        let randomizer = TrialSwapRandomizer::new(None).unwrap();
        assert_eq!(randomizer.trials_for(&m), 20);
        let out = randomizer.randomize(&m, &mut PamRng::from_seed(4)).unwrap();
        assert_eq!(out.marginals(), m.marginals());
    }

    #[test]
    fn test_trial_swap_zero_trials_returns_copy() {
        let m = observed();
        let out = trial_swap(&m, Some(0), &mut PamRng::from_seed(4)).unwrap();
        assert_eq!(out, m);
    }

    #[test]
    fn test_trial_swap_rejects_degenerate() {
        let m = BinaryMatrix::from_rows(&[[0, 0], [1, 0]]).unwrap();
        assert!(trial_swap(&m, Some(10), &mut PamRng::from_seed(4)).is_err());
    }
}
