//! Input screening for the swap family.
//!
//! A swap needs two rows and two columns forming a checkerboard. Matrices
//! where no such pattern can exist would make the pattern search spin until
//! its attempt bound, so they are rejected up front.

use pam_core::BinaryMatrix;

use crate::config::DegeneracyPolicy;
use crate::error::{Degeneracy, RandomizeError};

/// Screens `matrix` under `policy`.
///
/// # Errors
///
/// Returns `RandomizeError::DegenerateMatrix` with the reason when the
/// matrix is smaller than 2x2, or (strict) has an empty or full line, or
/// (lenient) contains no checkerboard at all.
pub fn check_swappable(
    matrix: &BinaryMatrix,
    policy: DegeneracyPolicy,
) -> Result<(), RandomizeError> {
    let (n_rows, n_cols) = matrix.shape();
    if n_rows < 2 || n_cols < 2 {
        return Err(RandomizeError::DegenerateMatrix(Degeneracy::TooSmall {
            n_rows,
            n_cols,
        }));
    }

    match policy {
        DegeneracyPolicy::Strict => {
            let marginals = matrix.marginals();
            let rows = marginals.constant_rows();
            if !rows.is_empty() {
                return Err(RandomizeError::DegenerateMatrix(Degeneracy::ConstantRows(
                    rows,
                )));
            }
            let cols = marginals.constant_cols();
            if !cols.is_empty() {
                return Err(RandomizeError::DegenerateMatrix(
                    Degeneracy::ConstantColumns(cols),
                ));
            }
            Ok(())
        }
        DegeneracyPolicy::Lenient => {
            if has_checkerboard(matrix) {
                Ok(())
            } else {
                Err(RandomizeError::DegenerateMatrix(Degeneracy::NoCheckerboard))
            }
        }
    }
}

/// Returns `true` if some pair of rows and pair of columns forms a
/// `[[1,0],[0,1]]` or `[[0,1],[1,0]]` submatrix.
///
/// No checkerboard exists exactly when the row sets are totally ordered by
/// inclusion. Rows are sorted by total, largest first, and each row is
/// checked to be a subset of its predecessor.
pub fn has_checkerboard(matrix: &BinaryMatrix) -> bool {
    let totals = matrix.row_totals();
    let mut order: Vec<usize> = (0..matrix.n_rows()).collect();
    order.sort_by(|&a, &b| totals[b].cmp(&totals[a]));

    order.windows(2).any(|pair| {
        let larger = matrix.row(pair[0]);
        let smaller = matrix.row(pair[1]);
        smaller.iter().zip(larger).any(|(&s, &l)| s > l)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: &[&[u8]]) -> BinaryMatrix {
        BinaryMatrix::from_rows(rows).unwrap()
    }

    #[test]
    fn test_strict_rejects_full_row() {
        let m = matrix(&[&[1, 1, 1], &[1, 0, 0], &[0, 1, 0]]);
        let err = check_swappable(&m, DegeneracyPolicy::Strict).unwrap_err();
        assert_eq!(
            err,
            RandomizeError::DegenerateMatrix(Degeneracy::ConstantRows(vec![0]))
        );
    }

    #[test]
    fn test_strict_rejects_empty_column() {
        let m = matrix(&[&[1, 0, 0], &[0, 1, 0]]);
        let err = check_swappable(&m, DegeneracyPolicy::Strict).unwrap_err();
        assert_eq!(
            err,
            RandomizeError::DegenerateMatrix(Degeneracy::ConstantColumns(vec![2]))
        );
    }

    #[test]
    fn test_too_small_under_both_policies() {
        let m = matrix(&[&[1, 0, 1]]);
        for policy in [DegeneracyPolicy::Strict, DegeneracyPolicy::Lenient] {
            assert!(matches!(
                check_swappable(&m, policy),
                Err(RandomizeError::DegenerateMatrix(Degeneracy::TooSmall {
                    n_rows: 1,
                    n_cols: 3
                }))
            ));
        }
    }

    #[test]
    fn test_lenient_accepts_constant_lines_around_checkerboard() {
        let m = matrix(&[&[1, 1, 1], &[1, 0, 0], &[0, 1, 0]]);
        assert!(check_swappable(&m, DegeneracyPolicy::Lenient).is_ok());
    }

    #[test]
    fn test_lenient_rejects_nested_rows() {
        // Staircase: every row contains the next one.
        let m = matrix(&[&[1, 1, 1], &[1, 1, 0], &[1, 0, 0]]);
        assert!(!has_checkerboard(&m));
        assert_eq!(
            check_swappable(&m, DegeneracyPolicy::Lenient),
            Err(RandomizeError::DegenerateMatrix(Degeneracy::NoCheckerboard))
        );
    }

    #[test]
    fn test_has_checkerboard_identity() {
        let m = matrix(&[&[1, 0], &[0, 1]]);
        assert!(has_checkerboard(&m));
        assert!(check_swappable(&m, DegeneracyPolicy::Strict).is_ok());
    }

    #[test]
    fn test_equal_rows_have_no_checkerboard() {
        let m = matrix(&[&[1, 0, 1], &[1, 0, 1]]);
        assert!(!has_checkerboard(&m));
    }
}
