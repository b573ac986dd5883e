//! Common randomizer interface and static dispatch over the algorithms.
//!
//! [`Randomizer`] is the seam the null-model driver and the CLI work
//! against. [`Algorithm`] wraps every built-in randomizer in an enum so
//! callers that pick the algorithm at runtime avoid trait objects.

use std::fmt;
use std::str::FromStr;

use pam_core::BinaryMatrix;
use tracing::warn;

use crate::config::RandomizeConfig;
use crate::curveball::CurveballRandomizer;
use crate::error::{ConfigError, RandomizeError};
use crate::grady::HeuristicFillRandomizer;
use crate::heuristic::HeuristicKind;
use crate::rng::PamRng;
use crate::swap::{SwapRandomizer, TrialSwapRandomizer};

/// Produces randomized copies of a matrix.
///
/// Implementations never modify `matrix`; every call returns a new matrix
/// owned by the caller. All built-in randomizers keep the row and column
/// totals of `matrix`.
pub trait Randomizer: Send + Sync {
    /// Algorithm identifier (`swap`, `trial_swap`, ...).
    fn name(&self) -> &'static str;

    /// Returns a randomized copy of `matrix` drawing from `rng`.
    fn randomize(
        &self,
        matrix: &BinaryMatrix,
        rng: &mut PamRng,
    ) -> Result<BinaryMatrix, RandomizeError>;
}

impl<R: Randomizer + ?Sized> Randomizer for &R {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn randomize(
        &self,
        matrix: &BinaryMatrix,
        rng: &mut PamRng,
    ) -> Result<BinaryMatrix, RandomizeError> {
        (**self).randomize(matrix, rng)
    }
}

impl<R: Randomizer + ?Sized> Randomizer for Box<R> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn randomize(
        &self,
        matrix: &BinaryMatrix,
        rng: &mut PamRng,
    ) -> Result<BinaryMatrix, RandomizeError> {
        (**self).randomize(matrix, rng)
    }
}

/// Algorithm identifier, as used in configuration and on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AlgorithmKind {
    /// Counted successful swaps.
    Swap,
    /// Counted swap attempts.
    TrialSwap,
    /// Counted curveball trades.
    Curveball,
    /// Heuristic fill with correction.
    HeuristicFill,
}

impl AlgorithmKind {
    /// All algorithms.
    pub const ALL: [AlgorithmKind; 4] = [
        AlgorithmKind::Swap,
        AlgorithmKind::TrialSwap,
        AlgorithmKind::Curveball,
        AlgorithmKind::HeuristicFill,
    ];

    /// Identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            AlgorithmKind::Swap => "swap",
            AlgorithmKind::TrialSwap => "trial_swap",
            AlgorithmKind::Curveball => "curveball",
            AlgorithmKind::HeuristicFill => "heuristic_fill",
        }
    }

    /// Returns `true` if the algorithm needs an explicit count.
    pub fn requires_count(&self) -> bool {
        matches!(self, AlgorithmKind::Swap | AlgorithmKind::Curveball)
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlgorithmKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        match normalized.as_str() {
            "grady" => Ok(AlgorithmKind::HeuristicFill),
            other => AlgorithmKind::ALL
                .into_iter()
                .find(|kind| kind.as_str() == other)
                .ok_or_else(|| ConfigError::InvalidParameter {
                    name: "algorithm",
                    value: format!(
                        "unknown algorithm '{}': expected swap, trial_swap, curveball or heuristic_fill",
                        s
                    ),
                }),
        }
    }
}

/// Static dispatch over the built-in randomizers.
///
/// # Examples
///
/// ```rust
/// use pam_core::BinaryMatrix;
/// use pam_randomize::config::RandomizeConfig;
/// use pam_randomize::heuristic::HeuristicKind;
/// use pam_randomize::randomizer::{Algorithm, AlgorithmKind, Randomizer};
/// use pam_randomize::rng::PamRng;
///
/// let algorithm = Algorithm::build(
///     AlgorithmKind::Curveball,
///     Some(50),
///     HeuristicKind::default(),
///     RandomizeConfig::default(),
/// ).unwrap();
/// assert_eq!(algorithm.name(), "curveball");
///
/// let observed = BinaryMatrix::from_rows(&[[1, 0, 1], [0, 1, 1], [1, 1, 0]]).unwrap();
/// let out = algorithm.randomize(&observed, &mut PamRng::from_seed(1)).unwrap();
/// assert_eq!(out.marginals(), observed.marginals());
/// ```
#[derive(Clone, Debug)]
pub enum Algorithm {
    /// See [`SwapRandomizer`].
    Swap(SwapRandomizer),
    /// See [`TrialSwapRandomizer`].
    TrialSwap(TrialSwapRandomizer),
    /// See [`CurveballRandomizer`].
    Curveball(CurveballRandomizer),
    /// See [`HeuristicFillRandomizer`].
    HeuristicFill(HeuristicFillRandomizer<HeuristicKind>),
}

impl Algorithm {
    /// Builds the randomizer for `kind`.
    ///
    /// `count` is the number of swaps (swap, curveball) or trials (trial
    /// swap, defaulting to the matrix size); heuristic fill ignores it and
    /// logs a warning when one is given.
    /// `heuristic` is only used by heuristic fill.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required count is missing or a count
    /// exceeds the maximum.
    pub fn build(
        kind: AlgorithmKind,
        count: Option<usize>,
        heuristic: HeuristicKind,
        config: RandomizeConfig,
    ) -> Result<Self, ConfigError> {
        let required = || {
            count.ok_or(ConfigError::InvalidParameter {
                name: "count",
                value: format!("{} needs an explicit swap count", kind),
            })
        };
        Ok(match kind {
            AlgorithmKind::Swap => Algorithm::Swap(SwapRandomizer::with_config(required()?, config)?),
            AlgorithmKind::TrialSwap => {
                Algorithm::TrialSwap(TrialSwapRandomizer::with_config(count, config)?)
            }
            AlgorithmKind::Curveball => {
                Algorithm::Curveball(CurveballRandomizer::with_config(required()?, config)?)
            }
            AlgorithmKind::HeuristicFill => {
                if let Some(count) = count {
                    warn!(count, "heuristic_fill takes no swap count; ignoring it");
                }
                Algorithm::HeuristicFill(HeuristicFillRandomizer::with_config(heuristic, config))
            }
        })
    }

    /// Algorithm identifier.
    pub fn kind(&self) -> AlgorithmKind {
        match self {
            Algorithm::Swap(_) => AlgorithmKind::Swap,
            Algorithm::TrialSwap(_) => AlgorithmKind::TrialSwap,
            Algorithm::Curveball(_) => AlgorithmKind::Curveball,
            Algorithm::HeuristicFill(_) => AlgorithmKind::HeuristicFill,
        }
    }
}

impl Randomizer for Algorithm {
    fn name(&self) -> &'static str {
        self.kind().as_str()
    }

    fn randomize(
        &self,
        matrix: &BinaryMatrix,
        rng: &mut PamRng,
    ) -> Result<BinaryMatrix, RandomizeError> {
        match self {
            Algorithm::Swap(r) => r.randomize(matrix, rng),
            Algorithm::TrialSwap(r) => r.randomize(matrix, rng),
            Algorithm::Curveball(r) => r.randomize(matrix, rng),
            Algorithm::HeuristicFill(r) => Randomizer::randomize(r, matrix, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observed() -> BinaryMatrix {
        BinaryMatrix::from_rows(&[
            [1, 0, 1, 0],
            [0, 1, 1, 0],
            [1, 1, 0, 1],
            [0, 0, 1, 1],
        ])
        .unwrap()
    }

    #[test]
    fn test_kind_parsing() {
        for kind in AlgorithmKind::ALL {
            assert_eq!(kind.to_string().parse::<AlgorithmKind>().unwrap(), kind);
        }
        assert_eq!(
            "trial-swap".parse::<AlgorithmKind>().unwrap(),
            AlgorithmKind::TrialSwap
        );
        assert_eq!(
            "Grady".parse::<AlgorithmKind>().unwrap(),
            AlgorithmKind::HeuristicFill
        );
        assert!("shuffle".parse::<AlgorithmKind>().is_err());
    }

    #[test]
    fn test_every_algorithm_preserves_marginals() {
        let m = observed();
        for kind in AlgorithmKind::ALL {
            let algorithm =
                Algorithm::build(kind, Some(100), HeuristicKind::default(), RandomizeConfig::default())
                    .unwrap();
            assert_eq!(algorithm.kind(), kind);
            let out = algorithm.randomize(&m, &mut PamRng::from_seed(2)).unwrap();
            assert_eq!(out.marginals(), m.marginals(), "{kind}");
        }
    }

    #[test]
    fn test_swap_requires_count() {
        let err = Algorithm::build(
            AlgorithmKind::Swap,
            None,
            HeuristicKind::default(),
            RandomizeConfig::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("swap needs an explicit swap count"));
        assert!(AlgorithmKind::Curveball.requires_count());
        assert!(!AlgorithmKind::TrialSwap.requires_count());
    }

    #[test]
    fn test_boxed_dispatch() {
        let randomizers: Vec<Box<dyn Randomizer>> = vec![
            Box::new(SwapRandomizer::new(10).unwrap()),
            Box::new(HeuristicFillRandomizer::new(HeuristicKind::AllAbsent)),
        ];
        let names: Vec<&str> = randomizers.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["swap", "heuristic_fill"]);
    }

    #[test]
    fn test_heuristic_fill_ignores_count() {
        let m = observed();
        let build = |count| {
            Algorithm::build(
                AlgorithmKind::HeuristicFill,
                count,
                HeuristicKind::default(),
                RandomizeConfig::default(),
            )
            .unwrap()
        };
        let with_count = build(Some(50)).randomize(&m, &mut PamRng::from_seed(6)).unwrap();
        let without = build(None).randomize(&m, &mut PamRng::from_seed(6)).unwrap();
        assert_eq!(with_count, without);
    }
}
