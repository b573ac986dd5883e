//! Heuristic-fill randomizer.
//!
//! Builds a random matrix from marginal totals alone, without ever reading
//! observed cells, so no trace of the starting configuration survives:
//!
//! 1. **Approximate fill**: each cell is drawn present with the
//!    probability a [`FillHeuristic`] assigns to it. Disjoint row blocks are
//!    filled in parallel from per-block generators.
//! 2. **Correction** ([`correction`]): surplus presences are trimmed, then
//!    deficits are closed by greedy fill, random three-cell exchanges and,
//!    when those stall, augmenting paths.
//!
//! # Examples
//!
//! ```rust
//! use pam_core::Marginals;
//! use pam_randomize::grady::heuristic_fill_randomize;
//! use pam_randomize::heuristic::GlobalFill;
//! use pam_randomize::rng::PamRng;
//!
//! let marginals = Marginals::new(vec![2, 1, 3], vec![2, 2, 1, 1]).unwrap();
//! let mut rng = PamRng::from_seed(42);
//!
//! let randomized = heuristic_fill_randomize(&marginals, &GlobalFill, &mut rng).unwrap();
//! assert!(marginals.matches(&randomized));
//! ```

pub mod correction;
mod fill;

use pam_core::{BinaryMatrix, Marginals, MarginalsError};
use rand::RngCore;
use tracing::debug;

use crate::config::RandomizeConfig;
use crate::error::RandomizeError;
use crate::heuristic::{FillHeuristic, HeuristicKind};
use crate::randomizer::Randomizer;
use crate::rng::PamRng;

pub use correction::CorrectionStats;

use correction::{Corrector, Grid};

/// Heuristic-fill randomizer over a fill heuristic `H`.
#[derive(Clone, Debug, Default)]
pub struct HeuristicFillRandomizer<H = HeuristicKind> {
    heuristic: H,
    config: RandomizeConfig,
}

impl<H: FillHeuristic> HeuristicFillRandomizer<H> {
    /// Creates a randomizer with the default configuration.
    pub fn new(heuristic: H) -> Self {
        Self::with_config(heuristic, RandomizeConfig::default())
    }

    /// Creates a randomizer with an explicit configuration.
    pub fn with_config(heuristic: H, config: RandomizeConfig) -> Self {
        Self { heuristic, config }
    }

    /// The fill heuristic.
    #[inline]
    pub fn heuristic(&self) -> &H {
        &self.heuristic
    }

    /// Configuration in use.
    #[inline]
    pub fn config(&self) -> &RandomizeConfig {
        &self.config
    }

    /// Builds a random matrix with exactly `marginals`.
    ///
    /// # Errors
    ///
    /// - `InvalidMarginals` for an empty target
    /// - `InvalidParameter` for unrealizable targets or a heuristic that
    ///   returns a non-finite probability
    /// - `NonConvergence` when correction exceeds its iteration bound
    pub fn randomize_marginals(
        &self,
        marginals: &Marginals,
        rng: &mut PamRng,
    ) -> Result<BinaryMatrix, RandomizeError> {
        self.randomize_with_stats(marginals, rng)
            .map(|(matrix, _)| matrix)
    }

    /// Like [`randomize_marginals`](Self::randomize_marginals), also
    /// returning what the correction had to do.
    pub fn randomize_with_stats(
        &self,
        marginals: &Marginals,
        rng: &mut PamRng,
    ) -> Result<(BinaryMatrix, CorrectionStats), RandomizeError> {
        let (n_rows, n_cols) = marginals.shape();
        if n_rows == 0 || n_cols == 0 {
            return Err(MarginalsError::Empty { n_rows, n_cols }.into());
        }
        if !marginals.is_realizable() {
            return Err(RandomizeError::InvalidParameter {
                name: "marginals",
                value: "no binary matrix has these row and column totals".to_string(),
            });
        }
        debug!(
            n_rows,
            n_cols,
            fill = marginals.fill(),
            heuristic = self.heuristic.name(),
            "heuristic fill randomization"
        );

        let block_seed = rng.next_u64();
        let cells =
            fill::approximate_fill(marginals, &self.heuristic, self.config.block_rows(), block_seed)?;

        let mut grid = Grid::new(cells, marginals.row_totals(), marginals.col_totals());
        let corrector = Corrector::new(
            self.config.correction_bound(n_rows, n_cols),
            self.config.exchange_search_limit(),
        );
        let stats = corrector.run(&mut grid, rng)?;

        let matrix = BinaryMatrix::from_vec(n_rows, n_cols, grid.into_cells())?;
        debug_assert!(marginals.matches(&matrix));
        Ok((matrix, stats))
    }
}

impl<H: FillHeuristic> Randomizer for HeuristicFillRandomizer<H> {
    fn name(&self) -> &'static str {
        "heuristic_fill"
    }

    /// Uses only the marginals of `matrix`.
    fn randomize(
        &self,
        matrix: &BinaryMatrix,
        rng: &mut PamRng,
    ) -> Result<BinaryMatrix, RandomizeError> {
        self.randomize_marginals(&matrix.marginals(), rng)
    }
}

/// Builds a random matrix with exactly `marginals` using the default
/// configuration.
pub fn heuristic_fill_randomize<H: FillHeuristic + ?Sized>(
    marginals: &Marginals,
    heuristic: &H,
    rng: &mut PamRng,
) -> Result<BinaryMatrix, RandomizeError> {
    heuristic_fill_randomize_with(marginals, heuristic, &RandomizeConfig::default(), rng)
}

/// Builds a random matrix with exactly `marginals` under `config`.
pub fn heuristic_fill_randomize_with<H: FillHeuristic + ?Sized>(
    marginals: &Marginals,
    heuristic: &H,
    config: &RandomizeConfig,
    rng: &mut PamRng,
) -> Result<BinaryMatrix, RandomizeError> {
    HeuristicFillRandomizer::with_config(heuristic, config.clone()).randomize_marginals(marginals, rng)
}
