//! Check command implementation
//!
//! Validates a matrix file and reports its shape, fill, degeneracy under
//! both screening policies and whether its marginals are realizable.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use pam_core::BinaryMatrix;
use pam_randomize::validate::{check_swappable, has_checkerboard};
use pam_randomize::{DegeneracyPolicy, RandomizeError};
use serde::Serialize;
use tracing::info;

use crate::{io, Result};

/// Output format of the check report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table.
    #[default]
    Table,
    /// JSON object.
    Json,
}

/// What `pamrand check` reports about a matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckReport {
    pub path: PathBuf,
    pub n_rows: usize,
    pub n_cols: usize,
    pub fill: usize,
    pub fill_ratio: f64,
    pub row_total_range: (usize, usize),
    pub col_total_range: (usize, usize),
    pub constant_rows: Vec<usize>,
    pub constant_cols: Vec<usize>,
    pub has_checkerboard: bool,
    pub realizable: bool,
    /// Why the strict policy rejects the matrix, if it does.
    pub strict_rejection: Option<String>,
    /// Why the lenient policy rejects the matrix, if it does.
    pub lenient_rejection: Option<String>,
}

impl CheckReport {
    /// Builds the report for `matrix`.
    pub fn new(path: &Path, matrix: &BinaryMatrix) -> Self {
        let marginals = matrix.marginals();
        let range = |totals: &[usize]| {
            let min = totals.iter().copied().min().unwrap_or(0);
            let max = totals.iter().copied().max().unwrap_or(0);
            (min, max)
        };
        let rejection = |policy| match check_swappable(matrix, policy) {
            Ok(()) => None,
            Err(RandomizeError::DegenerateMatrix(reason)) => Some(reason.to_string()),
            Err(other) => Some(other.to_string()),
        };

        Self {
            path: path.to_path_buf(),
            n_rows: matrix.n_rows(),
            n_cols: matrix.n_cols(),
            fill: matrix.fill(),
            fill_ratio: matrix.fill_ratio(),
            row_total_range: range(marginals.row_totals()),
            col_total_range: range(marginals.col_totals()),
            constant_rows: marginals.constant_rows(),
            constant_cols: marginals.constant_cols(),
            has_checkerboard: has_checkerboard(matrix),
            realizable: marginals.is_realizable(),
            strict_rejection: rejection(DegeneracyPolicy::Strict),
            lenient_rejection: rejection(DegeneracyPolicy::Lenient),
        }
    }

    fn print_table(&self) {
        let verdict = |rejection: &Option<String>| match rejection {
            None => "swappable".to_string(),
            Some(reason) => format!("rejected ({})", reason),
        };
        let rows = [
            ("File", self.path.display().to_string()),
            ("Shape", format!("{} sites x {} species", self.n_rows, self.n_cols)),
            ("Fill", format!("{} ({:.4})", self.fill, self.fill_ratio)),
            (
                "Row totals",
                format!("{}..={}", self.row_total_range.0, self.row_total_range.1),
            ),
            (
                "Column totals",
                format!("{}..={}", self.col_total_range.0, self.col_total_range.1),
            ),
            ("Checkerboard", self.has_checkerboard.to_string()),
            ("Realizable", self.realizable.to_string()),
            ("Strict policy", verdict(&self.strict_rejection)),
            ("Lenient policy", verdict(&self.lenient_rejection)),
        ];

        println!("\n┌────────────────┬──────────────────────────────────────────");
        for (name, value) in rows {
            println!("│ {:<14} │ {}", name, value);
        }
        println!("└────────────────┴──────────────────────────────────────────");
    }
}

/// Run the check command
pub fn run(input: &Path, format: OutputFormat) -> Result<()> {
    info!("Checking {}", input.display());
    let pam = io::read_pam(input)?;
    let report = CheckReport::new(input, pam.matrix());

    match format {
        OutputFormat::Table => report.print_table(),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}
