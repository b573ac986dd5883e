//! Labelled presence-absence matrices.
//!
//! A [`Pam`] keeps the cell buffer, the axis headers and free-form metadata
//! as independent fields. Randomizers only ever see the buffer; the headers
//! and metadata are carried over to the randomized copy by
//! [`Pam::with_matrix`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::MatrixError;
use crate::matrix::BinaryMatrix;
use crate::source::PresenceAbsence;

/// Matrix axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Rows (sites).
    Row,
    /// Columns (species).
    Column,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Row => write!(f, "row"),
            Axis::Column => write!(f, "column"),
        }
    }
}

/// Row and column labels.
///
/// An empty label vector means the axis is unlabelled.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headers {
    /// Site labels.
    pub rows: Vec<String>,
    /// Species labels.
    pub columns: Vec<String>,
}

impl Headers {
    /// Creates headers from row and column labels.
    pub fn new(rows: Vec<String>, columns: Vec<String>) -> Self {
        Self { rows, columns }
    }

    /// Labels along `axis`.
    pub fn labels(&self, axis: Axis) -> &[String] {
        match axis {
            Axis::Row => &self.rows,
            Axis::Column => &self.columns,
        }
    }

    fn check(&self, n_rows: usize, n_cols: usize) -> Result<(), MatrixError> {
        for (axis, expected) in [(Axis::Row, n_rows), (Axis::Column, n_cols)] {
            let actual = self.labels(axis).len();
            if actual != 0 && actual != expected {
                return Err(MatrixError::LabelMismatch {
                    axis,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }
}

/// A binary matrix with headers and metadata.
///
/// # Examples
///
/// ```rust
/// use pam_core::{BinaryMatrix, Headers, Pam};
///
/// let matrix = BinaryMatrix::from_rows(&[[1, 0], [0, 1]]).unwrap();
/// let headers = Headers::new(
///     vec!["site_a".into(), "site_b".into()],
///     vec!["sp_1".into(), "sp_2".into()],
/// );
/// let mut pam = Pam::new(matrix).with_headers(headers).unwrap();
/// pam.metadata_mut().insert("source".into(), "survey-2024".into());
///
/// let flipped = BinaryMatrix::from_rows(&[[0, 1], [1, 0]]).unwrap();
/// let randomized = pam.with_matrix(flipped).unwrap();
/// assert_eq!(randomized.headers().rows[0], "site_a");
/// assert_eq!(randomized.metadata()["source"], "survey-2024");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPam")]
pub struct Pam {
    matrix: BinaryMatrix,
    headers: Headers,
    metadata: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct RawPam {
    matrix: BinaryMatrix,
    #[serde(default)]
    headers: Headers,
    #[serde(default)]
    metadata: BTreeMap<String, String>,
}

impl TryFrom<RawPam> for Pam {
    type Error = MatrixError;

    fn try_from(raw: RawPam) -> Result<Self, Self::Error> {
        let mut pam = Pam::new(raw.matrix).with_headers(raw.headers)?;
        pam.metadata = raw.metadata;
        Ok(pam)
    }
}

impl Pam {
    /// Wraps a matrix with empty headers and metadata.
    pub fn new(matrix: BinaryMatrix) -> Self {
        Self {
            matrix,
            headers: Headers::default(),
            metadata: BTreeMap::new(),
        }
    }

    /// Attaches headers.
    ///
    /// # Errors
    ///
    /// Returns `LabelMismatch` if a non-empty label vector does not match the
    /// matrix shape.
    pub fn with_headers(mut self, headers: Headers) -> Result<Self, MatrixError> {
        headers.check(self.matrix.n_rows(), self.matrix.n_cols())?;
        self.headers = headers;
        Ok(self)
    }

    /// Returns a new `Pam` holding `matrix` with this PAM's headers and
    /// metadata.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if `matrix` has a different shape.
    pub fn with_matrix(&self, matrix: BinaryMatrix) -> Result<Self, MatrixError> {
        if matrix.shape() != self.matrix.shape() {
            return Err(MatrixError::DimensionMismatch {
                expected: self.matrix.len(),
                actual: matrix.len(),
            });
        }
        Ok(Self {
            matrix,
            headers: self.headers.clone(),
            metadata: self.metadata.clone(),
        })
    }

    /// The cell buffer.
    #[inline]
    pub fn matrix(&self) -> &BinaryMatrix {
        &self.matrix
    }

    /// Consumes the PAM and returns the cell buffer.
    pub fn into_matrix(self) -> BinaryMatrix {
        self.matrix
    }

    /// Axis labels.
    #[inline]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Replaces the axis labels.
    ///
    /// # Errors
    ///
    /// Returns `LabelMismatch` on a shape mismatch; the current headers are
    /// kept in that case.
    pub fn set_headers(&mut self, headers: Headers) -> Result<(), MatrixError> {
        headers.check(self.matrix.n_rows(), self.matrix.n_cols())?;
        self.headers = headers;
        Ok(())
    }

    /// Metadata entries.
    #[inline]
    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    /// Mutable metadata entries.
    #[inline]
    pub fn metadata_mut(&mut self) -> &mut BTreeMap<String, String> {
        &mut self.metadata
    }
}

impl PresenceAbsence for Pam {
    fn n_rows(&self) -> usize {
        self.matrix.n_rows()
    }

    fn n_cols(&self) -> usize {
        self.matrix.n_cols()
    }

    fn is_present(&self, row: usize, col: usize) -> bool {
        self.matrix.is_present(row, col)
    }

    fn row_totals(&self) -> Vec<usize> {
        self.matrix.row_totals()
    }

    fn col_totals(&self) -> Vec<usize> {
        self.matrix.col_totals()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(prefix: &str, n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{prefix}{i}")).collect()
    }

    #[test]
    fn test_headers_checked() {
        let pam = Pam::new(BinaryMatrix::zeros(2, 3));
        let err = pam
            .with_headers(Headers::new(labels("s", 2), labels("sp", 2)))
            .unwrap_err();
        assert_eq!(
            err,
            MatrixError::LabelMismatch {
                axis: Axis::Column,
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn test_partial_headers_allowed() {
        let pam = Pam::new(BinaryMatrix::zeros(2, 3))
            .with_headers(Headers::new(Vec::new(), labels("sp", 3)))
            .unwrap();
        assert!(pam.headers().rows.is_empty());
        assert_eq!(pam.headers().labels(Axis::Column).len(), 3);
    }

    #[test]
    fn test_with_matrix_shape_checked() {
        let pam = Pam::new(BinaryMatrix::zeros(2, 2));
        assert!(pam.with_matrix(BinaryMatrix::zeros(2, 3)).is_err());
        assert!(pam.with_matrix(BinaryMatrix::zeros(2, 2)).is_ok());
    }

    #[test]
    fn test_set_headers_keeps_old_on_error() {
        let mut pam = Pam::new(BinaryMatrix::zeros(1, 1))
            .with_headers(Headers::new(labels("s", 1), labels("sp", 1)))
            .unwrap();
        assert!(pam
            .set_headers(Headers::new(labels("x", 2), Vec::new()))
            .is_err());
        assert_eq!(pam.headers().rows, vec!["s0".to_string()]);
    }

    #[test]
    fn test_axis_display() {
        assert_eq!(Axis::Row.to_string(), "row");
        assert_eq!(Axis::Column.to_string(), "column");
    }

    #[test]
    fn test_deserialize_checks_headers() {
        let pam = Pam::new(BinaryMatrix::zeros(2, 1))
            .with_headers(Headers::new(labels("s", 2), labels("sp", 1)))
            .unwrap();
        let json = serde_json::to_string(&pam).unwrap();
        let back: Pam = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pam);

        let bad = json.replace(r#""s1""#, r#""s1","s2""#);
        assert!(serde_json::from_str::<Pam>(&bad).is_err());
    }
}
