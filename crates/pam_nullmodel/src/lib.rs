//! # pam_nullmodel: Null-Model Distributions
//!
//! ## Layer 3 Role
//!
//! pam_nullmodel turns a randomizer into a null-model distribution:
//! - `runner`: parallel, reproducible batches of randomizations with
//!   fail-fast or skip-on-error handling
//! - `stats`: a streaming accumulator reporting mean, standard deviation and
//!   p-values against an observed statistic
//!
//! The statistic itself is any `Fn(&BinaryMatrix) -> Vec<f64>`; this crate
//! does not define biodiversity metrics.
//!
//! ## Usage Example
//!
//! ```rust
//! use pam_core::BinaryMatrix;
//! use pam_nullmodel::{Comparison, NullModelConfig, NullModelRunner};
//! use pam_randomize::{HeuristicFillRandomizer, HeuristicKind};
//!
//! let observed = BinaryMatrix::from_rows(&[
//!     [1, 1, 0, 0],
//!     [0, 1, 1, 0],
//!     [0, 0, 1, 1],
//! ])
//! .unwrap();
//!
//! // Number of site pairs sharing a species.
//! let shared_pairs = |m: &BinaryMatrix| {
//!     let mut pairs = 0.0;
//!     for a in 0..m.n_rows() {
//!         for b in a + 1..m.n_rows() {
//!             if (0..m.n_cols()).any(|c| m.is_present(a, c) && m.is_present(b, c)) {
//!                 pairs += 1.0;
//!             }
//!         }
//!     }
//!     vec![pairs]
//! };
//!
//! let runner = NullModelRunner::new(
//!     HeuristicFillRandomizer::new(HeuristicKind::GlobalFill),
//!     NullModelConfig::new(200).with_seed(11),
//! );
//! let (stats, report) = runner
//!     .run_with_observed(&observed, shared_pairs, Comparison::Signed)
//!     .unwrap();
//!
//! assert!(report.is_complete());
//! assert_eq!(stats.count(), 200);
//! let p = stats.p_values().unwrap()[0];
//! assert!((0.0..=1.0).contains(&p));
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod error;
pub mod runner;
pub mod stats;

pub use error::{NullModelError, StatsError};
pub use runner::{
    ErrorPolicy, NullModelConfig, NullModelReport, NullModelRunner, SkippedIteration,
    DEFAULT_BATCH_SIZE,
};
pub use stats::{Comparison, RunningStats};
