//! Error types for the matrix model.
//!
//! This module provides:
//! - `MatrixError`: Construction and labelling errors for binary matrices
//! - `MarginalsError`: Validation errors for marginal total vectors

use thiserror::Error;

use crate::pam::Axis;

/// Binary matrix construction errors.
///
/// # Variants
/// - `InvalidValue`: A cell value outside {0, 1}
/// - `DimensionMismatch`: Buffer length does not match the declared shape
/// - `RaggedRows`: Rows of unequal length supplied to a row constructor
/// - `LabelMismatch`: Header labels do not match the matrix shape
///
/// # Examples
/// ```
/// use pam_core::{BinaryMatrix, MatrixError};
///
/// let err = BinaryMatrix::from_values(1, 2, &[1.0, 2.0]).unwrap_err();
/// assert!(matches!(err, MatrixError::InvalidValue { row: 0, col: 1, .. }));
/// ```
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MatrixError {
    /// A cell holds a value other than 0 or 1.
    #[error("Invalid matrix value {value} at ({row}, {col}): expected 0 or 1")]
    InvalidValue {
        /// Row index of the offending cell
        row: usize,
        /// Column index of the offending cell
        col: usize,
        /// The offending value
        value: f64,
    },

    /// The flat buffer length differs from `n_rows * n_cols`.
    #[error("Dimension mismatch: expected {expected} cells, got {actual}")]
    DimensionMismatch {
        /// Expected number of cells
        expected: usize,
        /// Actual number of cells
        actual: usize,
    },

    /// A row of different length than the first row.
    #[error("Ragged rows: row {row} has {actual} cells, expected {expected}")]
    RaggedRows {
        /// Index of the ragged row
        row: usize,
        /// Expected row length
        expected: usize,
        /// Actual row length
        actual: usize,
    },

    /// Header labels along an axis do not match the matrix shape.
    #[error("Label mismatch on {axis} axis: expected {expected} labels, got {actual}")]
    LabelMismatch {
        /// Axis the labels belong to
        axis: Axis,
        /// Expected number of labels
        expected: usize,
        /// Actual number of labels
        actual: usize,
    },
}

/// Marginal total validation errors.
///
/// Raised by [`Marginals::new`](crate::Marginals::new) when the supplied
/// vectors cannot describe any binary matrix.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MarginalsError {
    /// One of the vectors is empty.
    #[error("Marginal vectors must be non-empty (rows: {n_rows}, columns: {n_cols})")]
    Empty {
        /// Length of the row totals vector
        n_rows: usize,
        /// Length of the column totals vector
        n_cols: usize,
    },

    /// Row totals and column totals sum to different grand totals.
    #[error("Marginal totals disagree: rows sum to {row_sum}, columns sum to {col_sum}")]
    TotalMismatch {
        /// Sum of row totals
        row_sum: usize,
        /// Sum of column totals
        col_sum: usize,
    },

    /// A row total exceeds the number of columns.
    #[error("Row {row} total {total} exceeds column count {max}")]
    RowTotalOutOfRange {
        /// Row index
        row: usize,
        /// Offending total
        total: usize,
        /// Maximum allowed total
        max: usize,
    },

    /// A column total exceeds the number of rows.
    #[error("Column {col} total {total} exceeds row count {max}")]
    ColumnTotalOutOfRange {
        /// Column index
        col: usize,
        /// Offending total
        total: usize,
        /// Maximum allowed total
        max: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_error_display() {
        let err = MatrixError::InvalidValue {
            row: 2,
            col: 3,
            value: 0.5,
        };
        assert!(err.to_string().contains("0.5"));
        assert!(err.to_string().contains("(2, 3)"));

        let err = MatrixError::DimensionMismatch {
            expected: 6,
            actual: 5,
        };
        assert!(err.to_string().contains("expected 6"));

        let err = MatrixError::LabelMismatch {
            axis: Axis::Column,
            expected: 4,
            actual: 3,
        };
        assert!(err.to_string().contains("column"));
    }

    #[test]
    fn test_marginals_error_display() {
        let err = MarginalsError::TotalMismatch {
            row_sum: 5,
            col_sum: 4,
        };
        assert!(err.to_string().contains("rows sum to 5"));

        let err = MarginalsError::RowTotalOutOfRange {
            row: 1,
            total: 9,
            max: 3,
        };
        assert!(err.to_string().contains("Row 1"));
    }
}
