//! Dense binary matrix buffer.
//!
//! [`BinaryMatrix`] stores an N×S grid of presence (1) and absence (0)
//! values in row-major order. The {0, 1} invariant is checked by every
//! constructor and preserved by every mutator, so downstream code never
//! re-validates cell values.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::MatrixError;
use crate::marginals::Marginals;
use crate::source::PresenceAbsence;

/// Dense row-major presence-absence matrix (rows = sites, columns = species).
///
/// # Examples
///
/// ```rust
/// use pam_core::BinaryMatrix;
///
/// let mut pam = BinaryMatrix::zeros(2, 3);
/// pam.set(0, 2, true);
/// pam.set(1, 0, true);
///
/// assert!(pam.is_present(0, 2));
/// assert_eq!(pam.row_totals(), vec![1, 1]);
/// assert_eq!(pam.col_totals(), vec![1, 0, 1]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawBinaryMatrix")]
pub struct BinaryMatrix {
    n_rows: usize,
    n_cols: usize,
    data: Vec<u8>,
}

/// Unchecked wire form; deserialization goes through [`BinaryMatrix::from_vec`].
#[derive(Deserialize)]
struct RawBinaryMatrix {
    n_rows: usize,
    n_cols: usize,
    data: Vec<u8>,
}

impl TryFrom<RawBinaryMatrix> for BinaryMatrix {
    type Error = MatrixError;

    fn try_from(raw: RawBinaryMatrix) -> Result<Self, Self::Error> {
        Self::from_vec(raw.n_rows, raw.n_cols, raw.data)
    }
}

impl BinaryMatrix {
    /// Creates an all-absent matrix of the given shape.
    pub fn zeros(n_rows: usize, n_cols: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            data: vec![0; n_rows * n_cols],
        }
    }

    /// Creates a matrix from a row-major buffer of 0/1 bytes.
    ///
    /// # Errors
    ///
    /// - `DimensionMismatch` if `data.len() != n_rows * n_cols`
    /// - `InvalidValue` if any byte is not 0 or 1
    pub fn from_vec(n_rows: usize, n_cols: usize, data: Vec<u8>) -> Result<Self, MatrixError> {
        check_len(n_rows, n_cols, data.len())?;
        if let Some(idx) = data.iter().position(|&v| v > 1) {
            return Err(MatrixError::InvalidValue {
                row: idx / n_cols,
                col: idx % n_cols,
                value: f64::from(data[idx]),
            });
        }
        Ok(Self {
            n_rows,
            n_cols,
            data,
        })
    }

    /// Creates a matrix from row-major numeric values.
    ///
    /// Only exact `0.0` and `1.0` are accepted; this is the entry point for
    /// values read from text or numeric files.
    ///
    /// # Errors
    ///
    /// - `DimensionMismatch` if `values.len() != n_rows * n_cols`
    /// - `InvalidValue` for any other value, including NaN
    pub fn from_values(n_rows: usize, n_cols: usize, values: &[f64]) -> Result<Self, MatrixError> {
        check_len(n_rows, n_cols, values.len())?;
        let mut data = Vec::with_capacity(values.len());
        for (idx, &value) in values.iter().enumerate() {
            let cell = if value == 0.0 {
                0
            } else if value == 1.0 {
                1
            } else {
                return Err(MatrixError::InvalidValue {
                    row: idx / n_cols,
                    col: idx % n_cols,
                    value,
                });
            };
            data.push(cell);
        }
        Ok(Self {
            n_rows,
            n_cols,
            data,
        })
    }

    /// Creates a matrix from a slice of rows.
    ///
    /// # Errors
    ///
    /// - `RaggedRows` if rows differ in length
    /// - `InvalidValue` if any value is not 0 or 1
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self, MatrixError> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, |r| r.as_ref().len());
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for (row, values) in rows.iter().enumerate() {
            let values = values.as_ref();
            if values.len() != n_cols {
                return Err(MatrixError::RaggedRows {
                    row,
                    expected: n_cols,
                    actual: values.len(),
                });
            }
            data.extend_from_slice(values);
        }
        Self::from_vec(n_rows, n_cols, data)
    }

    /// Copies any [`PresenceAbsence`] source into an owned matrix.
    pub fn from_source<M: PresenceAbsence + ?Sized>(source: &M) -> Self {
        let n_rows = source.n_rows();
        let n_cols = source.n_cols();
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for i in 0..n_rows {
            for j in 0..n_cols {
                data.push(u8::from(source.is_present(i, j)));
            }
        }
        Self {
            n_rows,
            n_cols,
            data,
        }
    }

    /// Returns the number of rows (sites).
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Returns the number of columns (species).
    #[inline]
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Returns `(n_rows, n_cols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    /// Returns the number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the matrix has no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the cell value (0 or 1).
    ///
    /// # Panics
    ///
    /// Panics if `row` or `col` is out of bounds.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u8 {
        assert!(col < self.n_cols, "column index {col} out of bounds");
        self.data[row * self.n_cols + col]
    }

    /// Returns `true` if the cell is a presence.
    #[inline]
    pub fn is_present(&self, row: usize, col: usize) -> bool {
        self.get(row, col) == 1
    }

    /// Sets a cell to presence (`true`) or absence (`false`).
    ///
    /// # Panics
    ///
    /// Panics if `row` or `col` is out of bounds.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, present: bool) {
        assert!(col < self.n_cols, "column index {col} out of bounds");
        self.data[row * self.n_cols + col] = u8::from(present);
    }

    /// Flips a cell between presence and absence.
    #[inline]
    pub fn flip(&mut self, row: usize, col: usize) {
        assert!(col < self.n_cols, "column index {col} out of bounds");
        self.data[row * self.n_cols + col] ^= 1;
    }

    /// Returns a row as a slice of 0/1 bytes.
    #[inline]
    pub fn row(&self, row: usize) -> &[u8] {
        let start = row * self.n_cols;
        &self.data[start..start + self.n_cols]
    }

    /// Iterates over rows.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        (0..self.n_rows).map(move |i| self.row(i))
    }

    /// Returns the row-major cell buffer.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the matrix and returns its row-major buffer.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Row sums (site richness).
    pub fn row_totals(&self) -> Vec<usize> {
        self.rows()
            .map(|r| r.iter().map(|&v| usize::from(v)).sum())
            .collect()
    }

    /// Column sums (species range sizes).
    pub fn col_totals(&self) -> Vec<usize> {
        let mut totals = vec![0; self.n_cols];
        for row in self.rows() {
            for (total, &v) in totals.iter_mut().zip(row) {
                *total += usize::from(v);
            }
        }
        totals
    }

    /// Total number of presences.
    pub fn fill(&self) -> usize {
        self.data.iter().map(|&v| usize::from(v)).sum()
    }

    /// Proportion of cells that are presences; 0 for an empty matrix.
    pub fn fill_ratio(&self) -> f64 {
        if self.data.is_empty() {
            0.0
        } else {
            self.fill() as f64 / self.data.len() as f64
        }
    }

    /// Marginal totals of this matrix.
    pub fn marginals(&self) -> Marginals {
        Marginals::of(self)
    }
}

fn check_len(n_rows: usize, n_cols: usize, actual: usize) -> Result<(), MatrixError> {
    match n_rows.checked_mul(n_cols) {
        Some(expected) if expected == actual => {}
        expected => {
            return Err(MatrixError::DimensionMismatch {
                expected: expected.unwrap_or(usize::MAX),
                actual,
            })
        }
    }
    Ok(())
}

impl PresenceAbsence for BinaryMatrix {
    #[inline]
    fn n_rows(&self) -> usize {
        self.n_rows
    }

    #[inline]
    fn n_cols(&self) -> usize {
        self.n_cols
    }

    #[inline]
    fn is_present(&self, row: usize, col: usize) -> bool {
        BinaryMatrix::is_present(self, row, col)
    }

    fn row_totals(&self) -> Vec<usize> {
        BinaryMatrix::row_totals(self)
    }

    fn col_totals(&self) -> Vec<usize> {
        BinaryMatrix::col_totals(self)
    }
}

impl fmt::Display for BinaryMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for (j, v) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", v)?;
            }
        }
        Ok(())
    }
}
