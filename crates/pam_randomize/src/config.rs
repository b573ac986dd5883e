//! Randomizer configuration.
//!
//! This module provides [`RandomizeConfig`] and its builder. A configuration
//! is immutable once built and is shared by every call a randomizer makes.

use crate::error::ConfigError;
use crate::rng::PamRng;

/// Maximum swap, trial or curveball count accepted by any randomizer.
pub const MAX_COUNT: usize = 1_000_000_000;

/// Default bound on consecutive failed swap attempts.
pub const DEFAULT_MAX_ATTEMPTS_PER_SWAP: usize = 1_000_000;

/// Default number of random draws when searching for a correction exchange
/// before falling back to an exhaustive path search.
pub const DEFAULT_EXCHANGE_SEARCH_LIMIT: usize = 100_000;

/// Default number of rows per heuristic-fill work block.
pub const DEFAULT_BLOCK_ROWS: usize = 64;

/// How strictly the swap family screens input matrices.
///
/// - `Strict`: every row and column must be neither empty nor full
/// - `Lenient`: empty or full lines are allowed (they simply never take
///   part in a swap) as long as some checkerboard exists
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DegeneracyPolicy {
    /// Reject matrices with any constant row or column.
    #[default]
    Strict,
    /// Reject only matrices without any checkerboard.
    Lenient,
}

impl std::str::FromStr for DegeneracyPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lenient" => Ok(Self::Lenient),
            _ => Err(ConfigError::InvalidParameter {
                name: "degeneracy",
                value: format!("unknown policy '{}': expected strict or lenient", s),
            }),
        }
    }
}

/// Randomizer configuration.
///
/// Use [`RandomizeConfigBuilder`] to construct instances.
///
/// # Examples
///
/// ```rust
/// use pam_randomize::config::{DegeneracyPolicy, RandomizeConfig};
///
/// let config = RandomizeConfig::builder()
///     .seed(42)
///     .max_attempts_per_swap(10_000)
///     .degeneracy(DegeneracyPolicy::Lenient)
///     .build()
///     .expect("valid configuration");
///
/// assert_eq!(config.seed(), Some(42));
/// assert_eq!(config.max_attempts_per_swap(), 10_000);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RandomizeConfig {
    seed: Option<u64>,
    max_attempts_per_swap: usize,
    max_correction_iterations: Option<usize>,
    exchange_search_limit: usize,
    block_rows: usize,
    degeneracy: DegeneracyPolicy,
}

impl Default for RandomizeConfig {
    fn default() -> Self {
        Self {
            seed: None,
            max_attempts_per_swap: DEFAULT_MAX_ATTEMPTS_PER_SWAP,
            max_correction_iterations: None,
            exchange_search_limit: DEFAULT_EXCHANGE_SEARCH_LIMIT,
            block_rows: DEFAULT_BLOCK_ROWS,
            degeneracy: DegeneracyPolicy::Strict,
        }
    }
}

impl RandomizeConfig {
    /// Creates a new configuration builder.
    #[inline]
    pub fn builder() -> RandomizeConfigBuilder {
        RandomizeConfigBuilder::default()
    }

    /// Optional seed for reproducibility.
    #[inline]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Bound on consecutive failed swap attempts.
    #[inline]
    pub fn max_attempts_per_swap(&self) -> usize {
        self.max_attempts_per_swap
    }

    /// Explicit bound on correction iterations, if any.
    #[inline]
    pub fn max_correction_iterations(&self) -> Option<usize> {
        self.max_correction_iterations
    }

    /// Correction bound for an `n_rows` × `n_cols` target.
    ///
    /// Without an explicit bound this is the cell count, which is never
    /// smaller than the largest deficit the correction can face.
    pub fn correction_bound(&self, n_rows: usize, n_cols: usize) -> usize {
        self.max_correction_iterations
            .unwrap_or_else(|| n_rows.saturating_mul(n_cols))
    }

    /// Random draws per exchange search.
    #[inline]
    pub fn exchange_search_limit(&self) -> usize {
        self.exchange_search_limit
    }

    /// Rows per heuristic-fill work block.
    #[inline]
    pub fn block_rows(&self) -> usize {
        self.block_rows
    }

    /// Input screening policy for the swap family.
    #[inline]
    pub fn degeneracy(&self) -> DegeneracyPolicy {
        self.degeneracy
    }

    /// Creates the generator for a call: seeded when a seed is configured,
    /// otherwise from entropy.
    pub fn rng(&self) -> PamRng {
        match self.seed {
            Some(seed) => PamRng::from_seed(seed),
            None => PamRng::from_entropy(),
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `max_attempts_per_swap`,
    /// `exchange_search_limit` or `block_rows` is 0.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts_per_swap == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "max_attempts_per_swap",
                value: "must be positive".to_string(),
            });
        }
        if self.exchange_search_limit == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "exchange_search_limit",
                value: "must be positive".to_string(),
            });
        }
        if self.block_rows == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "block_rows",
                value: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Builder for [`RandomizeConfig`].
///
/// Unset fields keep their defaults; validation happens in
/// [`build`](RandomizeConfigBuilder::build).
#[derive(Clone, Debug, Default)]
pub struct RandomizeConfigBuilder {
    seed: Option<u64>,
    max_attempts_per_swap: Option<usize>,
    max_correction_iterations: Option<usize>,
    exchange_search_limit: Option<usize>,
    block_rows: Option<usize>,
    degeneracy: DegeneracyPolicy,
}

impl RandomizeConfigBuilder {
    /// Sets the seed for reproducibility.
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the bound on consecutive failed swap attempts.
    #[inline]
    pub fn max_attempts_per_swap(mut self, attempts: usize) -> Self {
        self.max_attempts_per_swap = Some(attempts);
        self
    }

    /// Sets an explicit bound on correction iterations.
    ///
    /// A bound of 0 makes every correction with a non-zero deficit fail.
    #[inline]
    pub fn max_correction_iterations(mut self, iterations: usize) -> Self {
        self.max_correction_iterations = Some(iterations);
        self
    }

    /// Sets the number of random draws per exchange search.
    #[inline]
    pub fn exchange_search_limit(mut self, limit: usize) -> Self {
        self.exchange_search_limit = Some(limit);
        self
    }

    /// Sets the rows per heuristic-fill work block.
    #[inline]
    pub fn block_rows(mut self, rows: usize) -> Self {
        self.block_rows = Some(rows);
        self
    }

    /// Sets the swap-family screening policy.
    #[inline]
    pub fn degeneracy(mut self, policy: DegeneracyPolicy) -> Self {
        self.degeneracy = policy;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any bound is zero.
    pub fn build(self) -> Result<RandomizeConfig, ConfigError> {
        let config = RandomizeConfig {
            seed: self.seed,
            max_attempts_per_swap: self
                .max_attempts_per_swap
                .unwrap_or(DEFAULT_MAX_ATTEMPTS_PER_SWAP),
            max_correction_iterations: self.max_correction_iterations,
            exchange_search_limit: self
                .exchange_search_limit
                .unwrap_or(DEFAULT_EXCHANGE_SEARCH_LIMIT),
            block_rows: self.block_rows.unwrap_or(DEFAULT_BLOCK_ROWS),
            degeneracy: self.degeneracy,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Checks a swap, trial or curveball count against [`MAX_COUNT`].
pub(crate) fn check_count(count: usize) -> Result<usize, ConfigError> {
    if count > MAX_COUNT {
        return Err(ConfigError::InvalidCount(count));
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = RandomizeConfig::builder().build().unwrap();
        assert_eq!(config, RandomizeConfig::default());
        assert_eq!(config.seed(), None);
        assert_eq!(config.max_attempts_per_swap(), DEFAULT_MAX_ATTEMPTS_PER_SWAP);
        assert_eq!(config.max_correction_iterations(), None);
        assert_eq!(config.block_rows(), DEFAULT_BLOCK_ROWS);
        assert_eq!(config.degeneracy(), DegeneracyPolicy::Strict);
    }

    #[test]
    fn test_config_builder_with_seed() {
        let config = RandomizeConfig::builder().seed(7).build().unwrap();
        assert_eq!(config.seed(), Some(7));
        assert_eq!(config.rng().seed(), 7);
    }

    #[test]
    fn test_config_zero_attempts_rejected() {
        let result = RandomizeConfig::builder().max_attempts_per_swap(0).build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidParameter {
                name: "max_attempts_per_swap",
                ..
            })
        ));
    }

    #[test]
    fn test_config_zero_block_rows_rejected() {
        let result = RandomizeConfig::builder().block_rows(0).build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidParameter {
                name: "block_rows",
                ..
            })
        ));
    }

    #[test]
    fn test_correction_bound() {
        let config = RandomizeConfig::default();
        assert_eq!(config.correction_bound(10, 20), 200);

        let config = RandomizeConfig::builder()
            .max_correction_iterations(0)
            .build()
            .unwrap();
        assert_eq!(config.correction_bound(10, 20), 0);
    }

    #[test]
    fn test_degeneracy_parsing() {
        assert_eq!(
            "STRICT".parse::<DegeneracyPolicy>().unwrap(),
            DegeneracyPolicy::Strict
        );
        assert_eq!(
            "lenient".parse::<DegeneracyPolicy>().unwrap(),
            DegeneracyPolicy::Lenient
        );
        assert!("loose".parse::<DegeneracyPolicy>().is_err());
    }

    #[test]
    fn test_check_count() {
        assert_eq!(check_count(0), Ok(0));
        assert_eq!(check_count(MAX_COUNT), Ok(MAX_COUNT));
        assert_eq!(
            check_count(MAX_COUNT + 1),
            Err(ConfigError::InvalidCount(MAX_COUNT + 1))
        );
    }
}
