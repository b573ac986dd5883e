//! CLI error types.

use std::path::PathBuf;

use pam_core::MatrixError;
use pam_nullmodel::NullModelError;
use pam_randomize::RandomizeError;
use thiserror::Error;

use crate::config::ConfigError;

/// Result alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors surfaced by `pamrand` commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Input file does not exist.
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// A cell could not be read as a number.
    #[error("{}: cannot parse cell '{value}' at site {row}, species {col}", .path.display())]
    Parse {
        /// File being read.
        path: PathBuf,
        /// Zero-based data row.
        row: usize,
        /// Zero-based data column.
        col: usize,
        /// Raw cell text.
        value: String,
    },

    /// CSV reading or writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Matrix construction or labelling failed.
    #[error(transparent)]
    Matrix(#[from] MatrixError),

    /// A randomization failed.
    #[error(transparent)]
    Randomize(#[from] RandomizeError),

    /// Randomizer parameters were rejected.
    #[error(transparent)]
    RandomizeConfig(#[from] pam_randomize::ConfigError),

    /// A batch run failed.
    #[error(transparent)]
    NullModel(#[from] NullModelError),

    /// CLI configuration was rejected.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// JSON output failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The global thread pool could not be configured.
    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    /// Invalid argument combination.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
