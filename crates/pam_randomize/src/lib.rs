//! # pam_randomize: Marginal-Preserving Randomization Engine
//!
//! ## Layer 2 Role
//!
//! pam_randomize builds randomized copies of a presence-absence matrix that
//! keep its row and column totals:
//! - Swap family: counted swaps, counted trials and curveball trades
//!   (`swap`, `curveball`)
//! - Heuristic fill with exact correction (`grady`), driven by pluggable
//!   fill heuristics (`heuristic`)
//! - Seeded, reproducible random streams (`rng`)
//! - Configuration with validated bounds (`config`)
//! - A common `Randomizer` trait and `Algorithm` enum (`randomizer`)
//!
//! ## Determinism
//!
//! Every randomizer draws only from the `PamRng` it is handed. The same seed
//! gives the same output, also for the parallel heuristic fill, whose work
//! blocks derive their generators from the block index.
//!
//! ## Usage Example
//!
//! ```rust
//! use pam_core::BinaryMatrix;
//! use pam_randomize::{swap_randomize, trial_swap, PamRng};
//!
//! let observed = BinaryMatrix::from_rows(&[
//!     [1, 0, 1, 0],
//!     [0, 1, 1, 0],
//!     [1, 1, 0, 1],
//! ])
//! .unwrap();
//!
//! let mut rng = PamRng::from_seed(2024);
//! let swapped = swap_randomize(&observed, 250, &mut rng).unwrap();
//! let trialled = trial_swap(&observed, None, &mut rng).unwrap();
//!
//! assert_eq!(swapped.marginals(), observed.marginals());
//! assert_eq!(trialled.marginals(), observed.marginals());
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod config;
pub mod curveball;
pub mod error;
pub mod grady;
pub mod heuristic;
pub mod randomizer;
pub mod rng;
pub mod swap;
pub mod validate;

pub use config::{DegeneracyPolicy, RandomizeConfig, RandomizeConfigBuilder, MAX_COUNT};
pub use curveball::{curveball_randomize, CurveballRandomizer};
pub use error::{ConfigError, Degeneracy, RandomizeError};
pub use grady::{
    heuristic_fill_randomize, heuristic_fill_randomize_with, CorrectionStats,
    HeuristicFillRandomizer,
};
pub use heuristic::{CellContext, FillHeuristic, HeuristicKind};
pub use randomizer::{Algorithm, AlgorithmKind, Randomizer};
pub use rng::{derive_seed, PamRng};
pub use swap::{swap_randomize, trial_swap, SwapRandomizer, TrialSwapRandomizer};
