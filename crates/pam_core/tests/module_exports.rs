//! Integration tests for module exports.
//!
//! Verify that public modules and types are reachable both through the
//! crate root re-exports and through their module paths.

use pam_core::{BinaryMatrix, Marginals, PresenceAbsence};

#[test]
fn test_matrix_module_exports() {
    use pam_core::matrix::BinaryMatrix as ByPath;

    let m: ByPath = BinaryMatrix::zeros(2, 2);
    assert_eq!(m.shape(), (2, 2));
}

#[test]
fn test_error_module_exports() {
    use pam_core::error::{MarginalsError, MatrixError};

    let matrix_err: MatrixError = BinaryMatrix::from_vec(1, 1, vec![3]).unwrap_err();
    assert!(matrix_err.to_string().contains("expected 0 or 1"));

    let marginals_err: MarginalsError = Marginals::new(vec![1], vec![]).unwrap_err();
    assert!(matches!(marginals_err, MarginalsError::Empty { .. }));
}

#[test]
fn test_pam_module_exports() {
    use pam_core::pam::{Axis, Headers, Pam};

    let pam = Pam::new(BinaryMatrix::zeros(1, 2))
        .with_headers(Headers::new(vec!["site".into()], vec!["a".into(), "b".into()]))
        .unwrap();
    assert_eq!(pam.headers().labels(Axis::Row), &["site".to_string()]);
    assert_eq!(PresenceAbsence::n_cols(&pam), 2);
}

#[test]
fn test_marginals_of_generic_source() {
    fn totals<M: PresenceAbsence>(m: &M) -> Marginals {
        Marginals::of(m)
    }

    let m = BinaryMatrix::from_rows(&[[1, 0, 1], [1, 1, 0]]).unwrap();
    let marginals = totals(&m);
    assert_eq!(marginals.row_totals(), &[2, 2]);
    assert_eq!(marginals.col_totals(), &[2, 1, 1]);
}
