//! Curveball randomizer.
//!
//! A curveball step picks two rows and trades one column that only the
//! first row occupies for one that only the second occupies. Compared with
//! the checkerboard swap, every row pair with differing sets yields a
//! trade, so far fewer attempts are wasted on sparse matrices.

use pam_core::BinaryMatrix;
use tracing::debug;

use crate::config::{check_count, RandomizeConfig};
use crate::error::{ConfigError, Degeneracy, RandomizeError};
use crate::randomizer::Randomizer;
use crate::rng::PamRng;
use crate::validate::check_swappable;

/// Attempts one trade between two random rows.
fn try_trade(
    work: &mut BinaryMatrix,
    only_first: &mut Vec<usize>,
    only_second: &mut Vec<usize>,
    rng: &mut PamRng,
) -> bool {
    let (r1, r2) = rng.gen_distinct_pair(work.n_rows());

    only_first.clear();
    only_second.clear();
    for (col, (&a, &b)) in work.row(r1).iter().zip(work.row(r2)).enumerate() {
        match (a, b) {
            (1, 0) => only_first.push(col),
            (0, 1) => only_second.push(col),
            _ => {}
        }
    }

    match (rng.choose(only_first.as_slice()), rng.choose(only_second.as_slice())) {
        (Some(&c1), Some(&c2)) => {
            work.set(r1, c1, false);
            work.set(r2, c1, true);
            work.set(r1, c2, true);
            work.set(r2, c2, false);
            true
        }
        _ => false,
    }
}

/// Randomizer performing a fixed number of curveball trades.
///
/// Screening and the consecutive-failure bound behave exactly as for
/// [`SwapRandomizer`](crate::swap::SwapRandomizer).
#[derive(Clone, Debug)]
pub struct CurveballRandomizer {
    num_swaps: usize,
    config: RandomizeConfig,
}

impl CurveballRandomizer {
    /// Creates a randomizer with the default configuration.
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

    /// Number of successful trades per call.
    #[inline]
    pub fn num_swaps(&self) -> usize {
        self.num_swaps
    }

    /// Returns a randomized copy of `matrix`.
    ///
    /// # Errors
    ///
    /// Returns `DegenerateMatrix` if the matrix fails screening or the
    /// search exhausts its attempt bound.
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
            "curveball randomization"
        );

        let mut work = matrix.clone();
        let mut only_first = Vec::with_capacity(matrix.n_cols());
        let mut only_second = Vec::with_capacity(matrix.n_cols());
        let max_attempts = self.config.max_attempts_per_swap();

        let mut completed = 0;
        let mut attempts = 0;
        while completed < self.num_swaps {
            if attempts >= max_attempts {
                return Err(RandomizeError::DegenerateMatrix(
                    Degeneracy::AttemptsExhausted {
                        attempts,
                        completed,
                        requested: self.num_swaps,
                    },
                ));
            }
            if try_trade(&mut work, &mut only_first, &mut only_second, rng) {
                completed += 1;
                attempts = 0;
            } else {
                attempts += 1;
            }
        }
        Ok(work)
    }
}

impl Randomizer for CurveballRandomizer {
    fn name(&self) -> &'static str {
        "curveball"
    }

    fn randomize(
        &self,
        matrix: &BinaryMatrix,
        rng: &mut PamRng,
    ) -> Result<BinaryMatrix, RandomizeError> {
        CurveballRandomizer::randomize(self, matrix, rng)
    }
}

/// Randomizes `matrix` with `num_swaps` curveball trades using the default
/// configuration.
pub fn curveball_randomize(
    matrix: &BinaryMatrix,
    num_swaps: usize,
    rng: &mut PamRng,
) -> Result<BinaryMatrix, RandomizeError> {
    CurveballRandomizer::new(num_swaps)?.randomize(matrix, rng)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curveball_preserves_marginals() {
        let m = BinaryMatrix::from_rows(&[
            [1, 1, 0, 0, 1, 0],
            [0, 1, 1, 0, 0, 1],
            [1, 0, 0, 1, 1, 0],
            [0, 0, 1, 1, 0, 1],
        ])
        .unwrap();
        let out = curveball_randomize(&m, 300, &mut PamRng::from_seed(11)).unwrap();
        assert_eq!(out.marginals(), m.marginals());
    }

    #[test]
    fn test_curveball_identity_trades() {
        let m = BinaryMatrix::from_rows(&[[1, 0], [0, 1]]).unwrap();
        let out = curveball_randomize(&m, 1, &mut PamRng::from_seed(0)).unwrap();
        assert_eq!(out, BinaryMatrix::from_rows(&[[0, 1], [1, 0]]).unwrap());
    }

    #[test]
    fn test_curveball_rejects_degenerate() {
        let m = BinaryMatrix::from_rows(&[[1, 1, 1], [1, 0, 0], [0, 1, 0]]).unwrap();
        assert!(matches!(
            curveball_randomize(&m, 5, &mut PamRng::from_seed(0)),
            Err(RandomizeError::DegenerateMatrix(Degeneracy::ConstantRows(_)))
        ));
    }

    #[test]
    fn test_curveball_deterministic() {
        let m = BinaryMatrix::from_rows(&[[1, 0, 1], [0, 1, 0], [1, 1, 0]]).unwrap();
        let a = curveball_randomize(&m, 50, &mut PamRng::from_seed(8)).unwrap();
        let b = curveball_randomize(&m, 50, &mut PamRng::from_seed(8)).unwrap();
        assert_eq!(a, b);
    }
}
