//! Fill heuristics for the heuristic-fill randomizer.
//!
//! A heuristic scores each cell with the probability that it starts out
//! present. Only marginal information reaches the heuristic through
//! [`CellContext`], never observed cell values.
//!
//! ## Available heuristics
//!
//! | Name | Probability |
//! |---|---|
//! | `global_fill` | `fill / (N * S)` |
//! | `row_column_product` | `row_total * col_total / fill` |
//! | `max_row_or_column` | `max(row_total / S, col_total / N)` |
//! | `min_row_or_column` | `min(row_total / S, col_total / N)` |
//! | `all_absent` | `0` |
//! | `all_present` | `1` |
//!
//! [`HeuristicKind`] dispatches statically over the built-in heuristics and
//! parses their names; custom heuristics implement [`FillHeuristic`].

use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigError, RandomizeError};

/// Marginal information for one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellContext {
    /// Row (site) index.
    pub row: usize,
    /// Column (species) index.
    pub col: usize,
    /// Target total of the row.
    pub row_total: usize,
    /// Target total of the column.
    pub col_total: usize,
    /// Number of rows `N`.
    pub n_rows: usize,
    /// Number of columns `S`.
    pub n_cols: usize,
    /// Grand total of presences.
    pub fill: usize,
}

impl CellContext {
    /// Fraction of the row's cells that are present in the target.
    #[inline]
    pub fn row_ratio(&self) -> f64 {
        ratio(self.row_total, self.n_cols)
    }

    /// Fraction of the column's cells that are present in the target.
    #[inline]
    pub fn col_ratio(&self) -> f64 {
        ratio(self.col_total, self.n_rows)
    }

    /// Fraction of all cells that are present in the target.
    #[inline]
    pub fn fill_ratio(&self) -> f64 {
        ratio(self.fill, self.n_rows * self.n_cols)
    }
}

#[inline]
fn ratio(count: usize, of: usize) -> f64 {
    if of == 0 {
        0.0
    } else {
        count as f64 / of as f64
    }
}

/// Scores cells for the initial fill.
///
/// Implementations must be `Send + Sync`: the fill is evaluated on many
/// rayon workers at once. Returned values are clamped to [0, 1]; non-finite
/// values abort the randomization with `InvalidParameter`.
pub trait FillHeuristic: Send + Sync {
    /// Short identifier used in logs and configuration.
    fn name(&self) -> &str;

    /// Probability that the cell starts out present.
    fn presence_probability(&self, cell: &CellContext) -> f64;
}

impl<H: FillHeuristic + ?Sized> FillHeuristic for &H {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn presence_probability(&self, cell: &CellContext) -> f64 {
        (**self).presence_probability(cell)
    }
}

impl<H: FillHeuristic + ?Sized> FillHeuristic for Box<H> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn presence_probability(&self, cell: &CellContext) -> f64 {
        (**self).presence_probability(cell)
    }
}

/// Evaluates `heuristic` on `cell`, clamping to [0, 1].
pub(crate) fn checked_probability<H: FillHeuristic + ?Sized>(
    heuristic: &H,
    cell: &CellContext,
) -> Result<f64, RandomizeError> {
    let p = heuristic.presence_probability(cell);
    if !p.is_finite() {
        return Err(RandomizeError::InvalidParameter {
            name: "heuristic",
            value: format!(
                "'{}' returned {} for cell ({}, {})",
                heuristic.name(),
                p,
                cell.row,
                cell.col
            ),
        });
    }
    Ok(p.clamp(0.0, 1.0))
}

/// Every cell present with the matrix's overall fill ratio.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GlobalFill;

impl FillHeuristic for GlobalFill {
    fn name(&self) -> &str {
        "global_fill"
    }

    fn presence_probability(&self, cell: &CellContext) -> f64 {
        cell.fill_ratio()
    }
}

/// Product of row and column totals over the grand total, the expected cell
/// value when presences are placed independently per row and column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RowColumnProduct;

impl FillHeuristic for RowColumnProduct {
    fn name(&self) -> &str {
        "row_column_product"
    }

    fn presence_probability(&self, cell: &CellContext) -> f64 {
        ratio(cell.row_total * cell.col_total, cell.fill)
    }
}

/// The larger of the row and column ratios.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MaxRowOrColumn;

impl FillHeuristic for MaxRowOrColumn {
    fn name(&self) -> &str {
        "max_row_or_column"
    }

    fn presence_probability(&self, cell: &CellContext) -> f64 {
        cell.row_ratio().max(cell.col_ratio())
    }
}

/// The smaller of the row and column ratios.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MinRowOrColumn;

impl FillHeuristic for MinRowOrColumn {
    fn name(&self) -> &str {
        "min_row_or_column"
    }

    fn presence_probability(&self, cell: &CellContext) -> f64 {
        cell.row_ratio().min(cell.col_ratio())
    }
}

/// Starts from an empty matrix; correction does all the work.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AllAbsent;

impl FillHeuristic for AllAbsent {
    fn name(&self) -> &str {
        "all_absent"
    }

    fn presence_probability(&self, _cell: &CellContext) -> f64 {
        0.0
    }
}

/// Starts from a full matrix; trimming does most of the work.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AllPresent;

impl FillHeuristic for AllPresent {
    fn name(&self) -> &str {
        "all_present"
    }

    fn presence_probability(&self, _cell: &CellContext) -> f64 {
        1.0
    }
}

/// Static dispatch over the built-in heuristics.
///
/// # Examples
///
/// ```rust
/// use pam_randomize::heuristic::{FillHeuristic, HeuristicKind};
///
/// let kind: HeuristicKind = "row_column_product".parse().unwrap();
/// assert_eq!(kind, HeuristicKind::RowColumnProduct);
/// assert_eq!(kind.name(), "row_column_product");
/// assert_eq!(HeuristicKind::default(), HeuristicKind::GlobalFill);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum HeuristicKind {
    /// See [`GlobalFill`].
    #[default]
    GlobalFill,
    /// See [`RowColumnProduct`].
    RowColumnProduct,
    /// See [`MaxRowOrColumn`].
    MaxRowOrColumn,
    /// See [`MinRowOrColumn`].
    MinRowOrColumn,
    /// See [`AllAbsent`].
    AllAbsent,
    /// See [`AllPresent`].
    AllPresent,
}

impl HeuristicKind {
    /// All built-in heuristics.
    pub const ALL: [HeuristicKind; 6] = [
        HeuristicKind::GlobalFill,
        HeuristicKind::RowColumnProduct,
        HeuristicKind::MaxRowOrColumn,
        HeuristicKind::MinRowOrColumn,
        HeuristicKind::AllAbsent,
        HeuristicKind::AllPresent,
    ];
}

impl FillHeuristic for HeuristicKind {
    fn name(&self) -> &str {
        match self {
            HeuristicKind::GlobalFill => GlobalFill.name(),
            HeuristicKind::RowColumnProduct => RowColumnProduct.name(),
            HeuristicKind::MaxRowOrColumn => MaxRowOrColumn.name(),
            HeuristicKind::MinRowOrColumn => MinRowOrColumn.name(),
            HeuristicKind::AllAbsent => AllAbsent.name(),
            HeuristicKind::AllPresent => AllPresent.name(),
        }
    }

    #[inline]
    fn presence_probability(&self, cell: &CellContext) -> f64 {
        match self {
            HeuristicKind::GlobalFill => GlobalFill.presence_probability(cell),
            HeuristicKind::RowColumnProduct => RowColumnProduct.presence_probability(cell),
            HeuristicKind::MaxRowOrColumn => MaxRowOrColumn.presence_probability(cell),
            HeuristicKind::MinRowOrColumn => MinRowOrColumn.presence_probability(cell),
            HeuristicKind::AllAbsent => AllAbsent.presence_probability(cell),
            HeuristicKind::AllPresent => AllPresent.presence_probability(cell),
        }
    }
}

impl fmt::Display for HeuristicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HeuristicKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        HeuristicKind::ALL
            .into_iter()
            .find(|kind| kind.name() == normalized)
            .ok_or_else(|| ConfigError::InvalidParameter {
                name: "heuristic",
                value: format!("unknown heuristic '{}'", s),
            })
    }
}
