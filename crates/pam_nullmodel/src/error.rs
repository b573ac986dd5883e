//! Error types for null-model runs.

use pam_randomize::RandomizeError;
use thiserror::Error;

/// Accumulator error.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StatsError {
    /// A pushed value has a different length than earlier values or the
    /// observed value.
    #[error("Shape mismatch: expected {expected} values, got {actual}")]
    ShapeMismatch {
        /// Established length.
        expected: usize,
        /// Length of the rejected value.
        actual: usize,
    },

    /// P-values were requested without an observed value.
    #[error("P-values need an observed value")]
    NoObserved,

    /// P-values were requested before any value was pushed.
    #[error("No values have been pushed")]
    Empty,
}

/// Null-model driver error.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum NullModelError {
    /// A randomization failed under the fail-fast policy.
    #[error("Iteration {iteration} failed: {source}")]
    Iteration {
        /// Zero-based iteration index.
        iteration: usize,
        /// Underlying randomizer error.
        #[source]
        source: RandomizeError,
    },

    /// The accumulator rejected a statistic value.
    #[error(transparent)]
    Stats(#[from] StatsError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pam_randomize::Degeneracy;

    #[test]
    fn test_iteration_error_display() {
        let err = NullModelError::Iteration {
            iteration: 7,
            source: RandomizeError::DegenerateMatrix(Degeneracy::NoCheckerboard),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Iteration 7 failed"));
        assert!(msg.contains("checkerboard"));
    }

    #[test]
    fn test_stats_error_is_transparent() {
        let err: NullModelError = StatsError::ShapeMismatch {
            expected: 3,
            actual: 2,
        }
        .into();
        assert_eq!(err.to_string(), "Shape mismatch: expected 3 values, got 2");
    }
}
