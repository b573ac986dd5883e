//! Row and column marginal totals.
//!
//! [`Marginals`] is the only input of the heuristic-fill randomizer and the
//! invariant every swap-family randomizer preserves. Once constructed it is
//! immutable and can be shared across threads.

use serde::{Deserialize, Serialize};

use crate::error::MarginalsError;
use crate::source::PresenceAbsence;

/// Immutable pair of row totals and column totals.
///
/// # Examples
///
/// ```rust
/// use pam_core::Marginals;
///
/// let marginals = Marginals::new(vec![2, 1], vec![1, 1, 1]).unwrap();
/// assert_eq!(marginals.shape(), (2, 3));
/// assert_eq!(marginals.fill(), 3);
/// assert!(marginals.is_realizable());
///
/// // Grand totals must agree
/// assert!(Marginals::new(vec![2, 2], vec![1, 1]).is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawMarginals")]
pub struct Marginals {
    row_totals: Vec<usize>,
    col_totals: Vec<usize>,
}

#[derive(Deserialize)]
struct RawMarginals {
    row_totals: Vec<usize>,
    col_totals: Vec<usize>,
}

impl TryFrom<RawMarginals> for Marginals {
    type Error = MarginalsError;

    fn try_from(raw: RawMarginals) -> Result<Self, Self::Error> {
        Self::new(raw.row_totals, raw.col_totals)
    }
}

impl Marginals {
    /// Creates marginals from raw total vectors.
    ///
    /// # Errors
    ///
    /// Returns `MarginalsError` if:
    /// - either vector is empty
    /// - a row total exceeds the number of columns
    /// - a column total exceeds the number of rows
    /// - the two vectors sum to different grand totals
    pub fn new(row_totals: Vec<usize>, col_totals: Vec<usize>) -> Result<Self, MarginalsError> {
        let n_rows = row_totals.len();
        let n_cols = col_totals.len();
        if n_rows == 0 || n_cols == 0 {
            return Err(MarginalsError::Empty { n_rows, n_cols });
        }
        if let Some((row, &total)) = row_totals.iter().enumerate().find(|(_, &t)| t > n_cols) {
            return Err(MarginalsError::RowTotalOutOfRange {
                row,
                total,
                max: n_cols,
            });
        }
        if let Some((col, &total)) = col_totals.iter().enumerate().find(|(_, &t)| t > n_rows) {
            return Err(MarginalsError::ColumnTotalOutOfRange {
                col,
                total,
                max: n_rows,
            });
        }
        let row_sum: usize = row_totals.iter().sum();
        let col_sum: usize = col_totals.iter().sum();
        if row_sum != col_sum {
            return Err(MarginalsError::TotalMismatch { row_sum, col_sum });
        }
        Ok(Self {
            row_totals,
            col_totals,
        })
    }

    /// Computes the marginals of a matrix.
    pub fn of<M: PresenceAbsence + ?Sized>(matrix: &M) -> Self {
        Self {
            row_totals: matrix.row_totals(),
            col_totals: matrix.col_totals(),
        }
    }

    /// Row totals (site richness).
    #[inline]
    pub fn row_totals(&self) -> &[usize] {
        &self.row_totals
    }

    /// Column totals (species range sizes).
    #[inline]
    pub fn col_totals(&self) -> &[usize] {
        &self.col_totals
    }

    /// Number of rows described.
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.row_totals.len()
    }

    /// Number of columns described.
    #[inline]
    pub fn n_cols(&self) -> usize {
        self.col_totals.len()
    }

    /// Returns `(n_rows, n_cols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows(), self.n_cols())
    }

    /// Grand total of presences.
    pub fn fill(&self) -> usize {
        self.row_totals.iter().sum()
    }

    /// Proportion of cells that must be presences.
    pub fn fill_ratio(&self) -> f64 {
        let cells = self.n_rows() * self.n_cols();
        if cells == 0 {
            0.0
        } else {
            self.fill() as f64 / cells as f64
        }
    }

    /// Returns `true` if `matrix` has exactly these marginals.
    pub fn matches<M: PresenceAbsence + ?Sized>(&self, matrix: &M) -> bool {
        matrix.n_rows() == self.n_rows()
            && matrix.n_cols() == self.n_cols()
            && matrix.row_totals() == self.row_totals
            && matrix.col_totals() == self.col_totals
    }

    /// Indices of rows whose total is 0 or equal to the column count.
    pub fn constant_rows(&self) -> Vec<usize> {
        let n_cols = self.n_cols();
        constant_indices(&self.row_totals, n_cols)
    }

    /// Indices of columns whose total is 0 or equal to the row count.
    pub fn constant_cols(&self) -> Vec<usize> {
        let n_rows = self.n_rows();
        constant_indices(&self.col_totals, n_rows)
    }

    /// Gale–Ryser test: `true` if at least one binary matrix has these totals.
    ///
    /// With row totals sorted in decreasing order `r_1 >= r_2 >= ...`, the
    /// totals are realizable iff for every `k`,
    /// `sum_{i<=k} r_i <= sum_j min(c_j, k)`. The right-hand side is
    /// accumulated from the conjugate of the column totals.
    pub fn is_realizable(&self) -> bool {
        let n_rows = self.n_rows();
        let mut rows = self.row_totals.clone();
        rows.sort_unstable_by(|a, b| b.cmp(a));

        // conjugate[k] = number of columns with total > k
        let mut conjugate = vec![0usize; n_rows + 1];
        for &c in &self.col_totals {
            // totals are bounded by n_rows in `new`; `of` derives them from a real matrix
            for slot in conjugate.iter_mut().take(c.min(n_rows)) {
                *slot += 1;
            }
        }

        let mut lhs = 0usize;
        let mut rhs = 0usize;
        for k in 0..n_rows {
            lhs += rows[k];
            rhs += conjugate[k];
            if lhs > rhs {
                return false;
            }
        }
        lhs == self.col_totals.iter().sum::<usize>()
    }
}

fn constant_indices(totals: &[usize], full: usize) -> Vec<usize> {
    totals
        .iter()
        .enumerate()
        .filter(|(_, &t)| t == 0 || t == full)
        .map(|(i, _)| i)
        .collect()
}
