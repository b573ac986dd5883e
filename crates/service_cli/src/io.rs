//! Matrix CSV files.
//!
//! Layout: a header row holding a corner cell and then the species labels,
//! followed by one row per site holding the site label and then its 0/1
//! cells. The corner cell is kept in the metadata under [`CORNER_KEY`].

use std::path::{Path, PathBuf};

use pam_core::{BinaryMatrix, Headers, Pam};
use tracing::debug;

use crate::{CliError, Result};

/// Metadata key holding the header row's corner cell.
pub const CORNER_KEY: &str = "corner";

/// Reads a labelled matrix from a CSV file.
pub fn read_pam(path: &Path) -> Result<Pam> {
    if !path.is_file() {
        return Err(CliError::FileNotFound(path.to_path_buf()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let header = reader.headers()?.clone();
    let corner = header.get(0).unwrap_or_default().to_string();
    let columns: Vec<String> = header.iter().skip(1).map(str::to_string).collect();

    let mut rows = Vec::new();
    let mut values = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        rows.push(record.get(0).unwrap_or_default().to_string());
        for (col, cell) in record.iter().skip(1).enumerate() {
            let value: f64 = cell.parse().map_err(|_| CliError::Parse {
                path: path.to_path_buf(),
                row,
                col,
                value: cell.to_string(),
            })?;
            values.push(value);
        }
    }

    let matrix = BinaryMatrix::from_values(rows.len(), columns.len(), &values)?;
    debug!(
        path = %path.display(),
        n_rows = matrix.n_rows(),
        n_cols = matrix.n_cols(),
        "read matrix"
    );

    let mut pam = Pam::new(matrix).with_headers(Headers::new(rows, columns))?;
    if !corner.is_empty() {
        pam.metadata_mut().insert(CORNER_KEY.to_string(), corner);
    }
    Ok(pam)
}

/// Writes a labelled matrix as CSV, generating `site_i` / `species_j`
/// labels for unlabelled axes.
pub fn write_pam(path: &Path, pam: &Pam) -> Result<()> {
    let matrix = pam.matrix();
    let headers = pam.headers();
    let mut writer = csv::Writer::from_path(path)?;

    let corner = pam.metadata().get(CORNER_KEY).map_or("", String::as_str);
    let mut header = Vec::with_capacity(matrix.n_cols() + 1);
    header.push(corner.to_string());
    if headers.columns.is_empty() {
        header.extend((0..matrix.n_cols()).map(|j| format!("species_{}", j)));
    } else {
        header.extend(headers.columns.iter().cloned());
    }
    writer.write_record(&header)?;

    let mut record = Vec::with_capacity(matrix.n_cols() + 1);
    for (i, cells) in matrix.rows().enumerate() {
        record.clear();
        record.push(
            headers
                .rows
                .get(i)
                .cloned()
                .unwrap_or_else(|| format!("site_{}", i)),
        );
        record.extend(cells.iter().map(|c| c.to_string()));
        writer.write_record(&record)?;
    }
    writer.flush().map_err(csv::Error::from)?;

    debug!(path = %path.display(), "wrote matrix");
    Ok(())
}

/// `out.csv` becomes `out_3.csv` for iteration 3.
pub fn numbered_path(path: &Path, iteration: usize) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}_{}.{}", stem, iteration, ext.to_string_lossy()),
        None => format!("{}_{}", stem, iteration),
    };
    path.with_file_name(name)
}
