//! Matrix consumption trait.
//!
//! The randomization engine reads observed matrices only through
//! [`PresenceAbsence`], so host containers with their own storage or
//! metadata can be randomized without conversion.

/// Read-only view of a presence-absence matrix.
///
/// Implementors expose their shape and cell values; the total accessors have
/// default implementations that scan every cell and may be overridden with
/// cached or vectorised versions.
///
/// # Examples
///
/// ```rust
/// use pam_core::{BinaryMatrix, PresenceAbsence};
///
/// struct Diagonal(usize);
///
/// impl PresenceAbsence for Diagonal {
///     fn n_rows(&self) -> usize { self.0 }
///     fn n_cols(&self) -> usize { self.0 }
///     fn is_present(&self, row: usize, col: usize) -> bool { row == col }
/// }
///
/// let copy = BinaryMatrix::from_source(&Diagonal(3));
/// assert_eq!(copy.row_totals(), vec![1, 1, 1]);
/// ```
pub trait PresenceAbsence {
    /// Number of rows (sites).
    fn n_rows(&self) -> usize;

    /// Number of columns (species).
    fn n_cols(&self) -> usize;

    /// Whether the cell at `(row, col)` is a presence.
    fn is_present(&self, row: usize, col: usize) -> bool;

    /// Row sums.
    fn row_totals(&self) -> Vec<usize> {
        (0..self.n_rows())
            .map(|i| (0..self.n_cols()).filter(|&j| self.is_present(i, j)).count())
            .collect()
    }

    /// Column sums.
    fn col_totals(&self) -> Vec<usize> {
        (0..self.n_cols())
            .map(|j| (0..self.n_rows()).filter(|&i| self.is_present(i, j)).count())
            .collect()
    }
}

impl<T: PresenceAbsence + ?Sized> PresenceAbsence for &T {
    fn n_rows(&self) -> usize {
        (**self).n_rows()
    }

    fn n_cols(&self) -> usize {
        (**self).n_cols()
    }

    fn is_present(&self, row: usize, col: usize) -> bool {
        (**self).is_present(row, col)
    }

    fn row_totals(&self) -> Vec<usize> {
        (**self).row_totals()
    }

    fn col_totals(&self) -> Vec<usize> {
        (**self).col_totals()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Checkerboard {
        n: usize,
    }

    impl PresenceAbsence for Checkerboard {
        fn n_rows(&self) -> usize {
            self.n
        }

        fn n_cols(&self) -> usize {
            self.n
        }

        fn is_present(&self, row: usize, col: usize) -> bool {
            (row + col) % 2 == 0
        }
    }

    #[test]
    fn test_default_totals() {
        let board = Checkerboard { n: 3 };
        assert_eq!(board.row_totals(), vec![2, 1, 2]);
        assert_eq!(board.col_totals(), vec![2, 1, 2]);
    }

    #[test]
    fn test_reference_forwarding() {
        let board = Checkerboard { n: 4 };
        let by_ref = &board;
        assert_eq!(PresenceAbsence::row_totals(&by_ref), vec![2, 2, 2, 2]);
    }
}
