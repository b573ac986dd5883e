//! # pam_core: Presence-Absence Matrix Model
//!
//! ## Layer 1 (Foundation) Role
//!
//! pam_core is the bottom layer of the randomization workspace, providing:
//! - The dense binary matrix buffer (`matrix::BinaryMatrix`)
//! - Row and column marginal totals (`marginals::Marginals`)
//! - Labelled matrices with headers and metadata (`pam::Pam`)
//! - The consumption trait used by the engine (`source::PresenceAbsence`)
//! - Error types: `MatrixError`, `MarginalsError` (`error`)
//!
//! ## Orientation
//!
//! Rows are **sites** and columns are **species**. Every API in the workspace
//! follows this convention; `row_totals` are site richness values and
//! `col_totals` are species range sizes.
//!
//! ## Usage Examples
//!
//! ```rust
//! use pam_core::{BinaryMatrix, Marginals};
//!
//! let pam = BinaryMatrix::from_rows(&[
//!     [1, 0, 1],
//!     [0, 1, 1],
//! ])
//! .unwrap();
//!
//! assert_eq!(pam.row_totals(), vec![2, 2]);
//! assert_eq!(pam.col_totals(), vec![1, 1, 2]);
//!
//! let marginals = Marginals::of(&pam);
//! assert_eq!(marginals.fill(), 4);
//! assert!(marginals.is_realizable());
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod error;
pub mod marginals;
pub mod matrix;
pub mod pam;
pub mod source;

pub use error::{MarginalsError, MatrixError};
pub use marginals::Marginals;
pub use matrix::BinaryMatrix;
pub use pam::{Axis, Headers, Pam};
pub use source::PresenceAbsence;
