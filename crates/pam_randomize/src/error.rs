//! Error types for the randomization engine.
//!
//! This module defines structured error types for configuration validation
//! and the runtime failure modes of every randomizer:
//! - `ConfigError`: rejected configuration or call parameters
//! - `RandomizeError`: invalid input, degenerate matrices and
//!   non-converging correction

use std::fmt;

use pam_core::{MarginalsError, MatrixError};
use thiserror::Error;

/// Configuration error for randomizers.
///
/// These errors occur at construction time when invalid parameters are
/// provided.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Swap, trial or curveball count above [`MAX_COUNT`](crate::config::MAX_COUNT).
    #[error("Invalid count {0}: must be at most 1_000_000_000")]
    InvalidCount(usize),

    /// Invalid parameter value with name and description.
    #[error("Invalid parameter '{name}': {value}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Description of the invalid value.
        value: String,
    },
}

/// Why a matrix cannot be randomized by the swap family.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Degeneracy {
    /// Fewer than two rows or two columns.
    TooSmall {
        /// Number of rows.
        n_rows: usize,
        /// Number of columns.
        n_cols: usize,
    },
    /// Rows whose total is 0 or equal to the number of columns.
    ConstantRows(Vec<usize>),
    /// Columns whose total is 0 or equal to the number of rows.
    ConstantColumns(Vec<usize>),
    /// Rows are nested by inclusion, so no checkerboard exists anywhere.
    NoCheckerboard,
    /// The pattern search ran out of attempts.
    AttemptsExhausted {
        /// Consecutive attempts without a successful swap.
        attempts: usize,
        /// Swaps completed before giving up.
        completed: usize,
        /// Swaps requested.
        requested: usize,
    },
}

impl fmt::Display for Degeneracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooSmall { n_rows, n_cols } => {
                write!(
                    f,
                    "{}x{} matrix is too small: swaps need at least 2 rows and 2 columns",
                    n_rows, n_cols
                )
            }
            Self::ConstantRows(rows) => {
                write!(f, "rows {:?} are empty or full", rows)
            }
            Self::ConstantColumns(cols) => {
                write!(f, "columns {:?} are empty or full", cols)
            }
            Self::NoCheckerboard => {
                write!(f, "no swappable 2x2 checkerboard exists in the matrix")
            }
            Self::AttemptsExhausted {
                attempts,
                completed,
                requested,
            } => {
                write!(
                    f,
                    "reached {} attempts without a swap after {} of {} swaps",
                    attempts, completed, requested
                )
            }
        }
    }
}

/// Runtime error for randomizers.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum RandomizeError {
    /// The input matrix is malformed.
    #[error("Invalid matrix: {0}")]
    InvalidMatrix(#[from] MatrixError),

    /// The target marginals are malformed.
    #[error("Invalid marginals: {0}")]
    InvalidMarginals(#[from] MarginalsError),

    /// The matrix admits no marginal-preserving swap.
    #[error("Degenerate matrix: {0}")]
    DegenerateMatrix(Degeneracy),

    /// Heuristic-fill correction exceeded its iteration bound.
    #[error(
        "Correction did not converge after {iterations} iterations: \
         {} rows and {} columns still short of their totals",
        .row_deficits.len(),
        .col_deficits.len()
    )]
    NonConvergence {
        /// Correction iterations performed.
        iterations: usize,
        /// `(row, missing presences)` for every unfinished row.
        row_deficits: Vec<(usize, usize)>,
        /// `(column, missing presences)` for every unfinished column.
        col_deficits: Vec<(usize, usize)>,
    },

    /// A call parameter was rejected.
    #[error("Invalid parameter '{name}': {value}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Description of the invalid value.
        value: String,
    },

    /// Configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl RandomizeError {
    /// Returns `true` for errors a caller may retry with another seed or
    /// heuristic.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NonConvergence { .. }
                | Self::DegenerateMatrix(Degeneracy::AttemptsExhausted { .. })
        )
    }

    /// Total number of presences still missing, for `NonConvergence`.
    pub fn remaining_deficit(&self) -> Option<usize> {
        match self {
            Self::NonConvergence { row_deficits, .. } => {
                Some(row_deficits.iter().map(|&(_, d)| d).sum())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidCount(2_000_000_000);
        assert!(err.to_string().contains("Invalid count 2000000000"));

        let err = ConfigError::InvalidParameter {
            name: "block_rows",
            value: "must be positive".to_string(),
        };
        assert!(err.to_string().contains("block_rows"));
    }

    #[test]
    fn test_degeneracy_display() {
        let err = RandomizeError::DegenerateMatrix(Degeneracy::ConstantRows(vec![1, 3]));
        assert_eq!(err.to_string(), "Degenerate matrix: rows [1, 3] are empty or full");

        let err = RandomizeError::DegenerateMatrix(Degeneracy::AttemptsExhausted {
            attempts: 10,
            completed: 2,
            requested: 5,
        });
        assert!(err.to_string().contains("2 of 5"));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_non_convergence_display() {
        let err = RandomizeError::NonConvergence {
            iterations: 0,
            row_deficits: vec![(0, 2), (4, 1)],
            col_deficits: vec![(1, 3)],
        };
        let msg = err.to_string();
        assert!(msg.contains("after 0 iterations"));
        assert!(msg.contains("2 rows and 1 columns"));
        assert_eq!(err.remaining_deficit(), Some(3));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_from_matrix_error() {
        let err: RandomizeError = MatrixError::DimensionMismatch {
            expected: 4,
            actual: 3,
        }
        .into();
        assert!(matches!(err, RandomizeError::InvalidMatrix(_)));
        assert!(!err.is_retryable());
    }
}
