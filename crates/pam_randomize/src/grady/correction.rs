//! Phase 2: exact marginal correction.
//!
//! After the approximate fill, rows and columns may hold too many or too few
//! presences. Correction runs in four steps:
//!
//! 1. trim surplus rows (parallel, rows are disjoint) then surplus columns
//! 2. greedy fill of deficient rows from deficient columns
//! 3. random three-cell exchanges for the remaining deficit
//! 4. an augmenting path search when no exchange is found
//!
//! After step 1 every line is at or below its target, and steps 2 to 4
//! only ever raise a deficient row and a deficient column by one, so the
//! correction terminates after exactly the remaining deficit.

use std::collections::VecDeque;

use rand::RngCore;
use rayon::prelude::*;
use tracing::trace;

use crate::error::RandomizeError;
use crate::rng::{derive_seed, PamRng};

/// Counters describing one correction run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CorrectionStats {
    /// Presences removed while trimming rows and columns.
    pub trimmed: usize,
    /// Presences added directly (greedy fill or a free target cell).
    pub filled: usize,
    /// Three-cell exchanges performed.
    pub exchanges: usize,
    /// Augmenting paths flipped.
    pub augmenting_paths: usize,
    /// Correction iterations charged against the bound.
    pub iterations: usize,
}

/// Working buffer with running sums and targets.
pub(crate) struct Grid<'a> {
    n_rows: usize,
    n_cols: usize,
    cells: Vec<u8>,
    row_sums: Vec<usize>,
    col_sums: Vec<usize>,
    row_targets: &'a [usize],
    col_targets: &'a [usize],
}

impl<'a> Grid<'a> {
    pub(crate) fn new(cells: Vec<u8>, row_targets: &'a [usize], col_targets: &'a [usize]) -> Self {
        let mut grid = Self {
            n_rows: row_targets.len(),
            n_cols: col_targets.len(),
            cells,
            row_sums: Vec::new(),
            col_sums: Vec::new(),
            row_targets,
            col_targets,
        };
        grid.recount();
        grid
    }

    pub(crate) fn into_cells(self) -> Vec<u8> {
        self.cells
    }

    #[inline]
    fn get(&self, row: usize, col: usize) -> u8 {
        self.cells[row * self.n_cols + col]
    }

    #[inline]
    fn set(&mut self, row: usize, col: usize, value: u8) {
        self.cells[row * self.n_cols + col] = value;
    }

    fn recount(&mut self) {
        let n_cols = self.n_cols;
        self.row_sums = self
            .cells
            .chunks_exact(n_cols)
            .map(|row| row.iter().map(|&v| usize::from(v)).sum())
            .collect();
        self.col_sums = vec![0; n_cols];
        for row in self.cells.chunks_exact(n_cols) {
            for (sum, &v) in self.col_sums.iter_mut().zip(row) {
                *sum += usize::from(v);
            }
        }
    }

    fn deficient_rows(&self) -> Vec<usize> {
        deficient(&self.row_sums, self.row_targets)
    }

    fn deficient_cols(&self) -> Vec<usize> {
        deficient(&self.col_sums, self.col_targets)
    }

    #[inline]
    fn col_open(&self, col: usize) -> bool {
        self.col_sums[col] < self.col_targets[col]
    }

    /// Clears random surplus presences in every overfull row.
    fn trim_rows(&mut self, seed: u64) -> usize {
        let n_cols = self.n_cols;
        let trimmed: usize = self
            .cells
            .par_chunks_mut(n_cols)
            .zip(self.row_targets.par_iter())
            .enumerate()
            .map(|(row, (cells, &target))| {
                let present: Vec<usize> = (0..cells.len()).filter(|&c| cells[c] == 1).collect();
                if present.len() <= target {
                    return 0;
                }
                let surplus = present.len() - target;
                let mut rng = PamRng::from_seed(derive_seed(seed, row as u64));
                for idx in rng.sample_indices(present.len(), surplus) {
                    cells[present[idx]] = 0;
                }
                surplus
            })
            .sum();
        self.recount();
        trimmed
    }

    /// Clears random surplus presences in every overfull column.
    fn trim_cols(&mut self, rng: &mut PamRng) -> usize {
        let mut trimmed = 0;
        for col in 0..self.n_cols {
            let target = self.col_targets[col];
            if self.col_sums[col] <= target {
                continue;
            }
            let present: Vec<usize> = (0..self.n_rows).filter(|&r| self.get(r, col) == 1).collect();
            let surplus = present.len() - target;
            for idx in rng.sample_indices(present.len(), surplus) {
                let row = present[idx];
                self.set(row, col, 0);
                self.row_sums[row] -= 1;
            }
            self.col_sums[col] = target;
            trimmed += surplus;
        }
        trimmed
    }

    fn fill_cell(&mut self, row: usize, col: usize) {
        self.set(row, col, 1);
        self.row_sums[row] += 1;
        self.col_sums[col] += 1;
    }

    /// Tries `(r,c2)←1, (r2,c2)←0, (r2,c)←1` for random `r2` and `c2`.
    ///
    /// Requires `(row, col)` to be present.
    fn try_exchange(&mut self, row: usize, col: usize, limit: usize, rng: &mut PamRng) -> bool {
        let rows: Vec<usize> = (0..self.n_rows).filter(|&r| self.get(r, col) == 0).collect();
        let cols: Vec<usize> = (0..self.n_cols).filter(|&c| self.get(row, c) == 0).collect();
        if rows.is_empty() || cols.is_empty() {
            return false;
        }
        for _ in 0..limit {
            let r2 = rows[rng.gen_index(rows.len())];
            let c2 = cols[rng.gen_index(cols.len())];
            if self.get(r2, c2) == 1 {
                self.set(row, c2, 1);
                self.set(r2, c2, 0);
                self.set(r2, col, 1);
                self.row_sums[row] += 1;
                self.col_sums[col] += 1;
                return true;
            }
        }
        false
    }

    /// Breadth-first search for an alternating path from any deficient row
    /// to any deficient column, moving row→column over absences and
    /// column→row over presences. Flipping the path raises its two ends by
    /// one and leaves every interior line unchanged.
    ///
    /// Returns `false` if no such path exists, which means the targets are
    /// not reachable from the current grid.
    fn augment(&mut self) -> bool {
        let mut row_seen = vec![false; self.n_rows];
        let mut col_seen = vec![false; self.n_cols];
        let mut row_from: Vec<Option<usize>> = vec![None; self.n_rows];
        let mut col_from = vec![0usize; self.n_cols];
        let mut queue = VecDeque::new();

        for row in self.deficient_rows() {
            row_seen[row] = true;
            queue.push_back(row);
        }

        let mut end = None;
        'search: while let Some(row) = queue.pop_front() {
            for col in 0..self.n_cols {
                if col_seen[col] || self.get(row, col) == 1 {
                    continue;
                }
                col_seen[col] = true;
                col_from[col] = row;
                if self.col_open(col) {
                    end = Some(col);
                    break 'search;
                }
                for next in 0..self.n_rows {
                    if !row_seen[next] && self.get(next, col) == 1 {
                        row_seen[next] = true;
                        row_from[next] = Some(col);
                        queue.push_back(next);
                    }
                }
            }
        }

        let Some(end) = end else {
            return false;
        };

        let mut col = end;
        self.col_sums[end] += 1;
        loop {
            let row = col_from[col];
            self.set(row, col, 1);
            match row_from[row] {
                Some(prev) => {
                    self.set(row, prev, 0);
                    col = prev;
                }
                None => {
                    self.row_sums[row] += 1;
                    break;
                }
            }
        }
        true
    }

    fn non_convergence(&self, iterations: usize) -> RandomizeError {
        RandomizeError::NonConvergence {
            iterations,
            row_deficits: deficits(&self.row_sums, self.row_targets),
            col_deficits: deficits(&self.col_sums, self.col_targets),
        }
    }
}

fn deficient(sums: &[usize], targets: &[usize]) -> Vec<usize> {
    sums.iter()
        .zip(targets)
        .enumerate()
        .filter(|(_, (s, t))| s < t)
        .map(|(i, _)| i)
        .collect()
}

fn deficits(sums: &[usize], targets: &[usize]) -> Vec<(usize, usize)> {
    sums.iter()
        .zip(targets)
        .enumerate()
        .filter(|(_, (s, t))| s < t)
        .map(|(i, (s, t))| (i, t - s))
        .collect()
}

/// Drives the correction of a grid under an iteration bound.
pub(crate) struct Corrector {
    max_iterations: usize,
    exchange_search_limit: usize,
    stats: CorrectionStats,
}

impl Corrector {
    pub(crate) fn new(max_iterations: usize, exchange_search_limit: usize) -> Self {
        Self {
            max_iterations,
            exchange_search_limit,
            stats: CorrectionStats::default(),
        }
    }

    fn charge(&mut self, grid: &Grid<'_>) -> Result<(), RandomizeError> {
        if self.stats.iterations >= self.max_iterations {
            return Err(grid.non_convergence(self.stats.iterations));
        }
        self.stats.iterations += 1;
        Ok(())
    }

    /// Runs all correction steps; on success the grid matches its targets.
    pub(crate) fn run(
        mut self,
        grid: &mut Grid<'_>,
        rng: &mut PamRng,
    ) -> Result<CorrectionStats, RandomizeError> {
        self.stats.trimmed = grid.trim_rows(rng.next_u64());
        self.stats.trimmed += grid.trim_cols(rng);
        trace!(trimmed = self.stats.trimmed, "correction: trimmed surplus");

        self.greedy_fill(grid, rng)?;
        trace!(filled = self.stats.filled, "correction: greedy fill");

        self.resolve_remaining(grid, rng)?;
        trace!(
            exchanges = self.stats.exchanges,
            augmenting_paths = self.stats.augmenting_paths,
            iterations = self.stats.iterations,
            "correction: complete"
        );
        Ok(self.stats)
    }

    fn greedy_fill(&mut self, grid: &mut Grid<'_>, rng: &mut PamRng) -> Result<(), RandomizeError> {
        let mut rows = grid.deficient_rows();
        rng.shuffle(&mut rows);

        for row in rows {
            let mut candidates: Vec<usize> = (0..grid.n_cols)
                .filter(|&c| grid.get(row, c) == 0 && grid.col_open(c))
                .collect();
            rng.shuffle(&mut candidates);

            let deficit = grid.row_targets[row] - grid.row_sums[row];
            for col in candidates.into_iter().take(deficit) {
                self.charge(grid)?;
                grid.fill_cell(row, col);
                self.stats.filled += 1;
            }
        }
        Ok(())
    }

    fn resolve_remaining(
        &mut self,
        grid: &mut Grid<'_>,
        rng: &mut PamRng,
    ) -> Result<(), RandomizeError> {
        loop {
            let rows = grid.deficient_rows();
            let cols = grid.deficient_cols();
            let (Some(&row), Some(&col)) = (rng.choose(&rows), rng.choose(&cols)) else {
                return Ok(());
            };

            self.charge(grid)?;
            if grid.get(row, col) == 0 {
                grid.fill_cell(row, col);
                self.stats.filled += 1;
            } else if grid.try_exchange(row, col, self.exchange_search_limit, rng) {
                self.stats.exchanges += 1;
            } else if grid.augment() {
                self.stats.augmenting_paths += 1;
            } else {
                return Err(grid.non_convergence(self.stats.iterations));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sums_match(grid: &Grid<'_>) -> bool {
        grid.row_sums == grid.row_targets && grid.col_sums == grid.col_targets
    }

    #[test]
    fn test_trim_rows_then_cols() {
        let rows = [1, 1];
        let cols = [1, 1];
        let mut grid = Grid::new(vec![1, 1, 1, 1], &rows, &cols);
        let mut rng = PamRng::from_seed(0);
        let trimmed = grid.trim_rows(rng.next_u64()) + grid.trim_cols(&mut rng);
        assert!(trimmed >= 2);
        assert!(grid.row_sums.iter().zip(&rows).all(|(s, t)| s <= t));
        assert!(grid.col_sums.iter().zip(&cols).all(|(s, t)| s <= t));
    }

    #[test]
    fn test_correction_from_empty() {
        let rows = [2, 1, 2, 1];
        let cols = [3, 1, 2];
        let mut grid = Grid::new(vec![0; 12], &rows, &cols);
        let stats = Corrector::new(12, 1000)
            .run(&mut grid, &mut PamRng::from_seed(5))
            .unwrap();
        assert!(sums_match(&grid));
        assert_eq!(stats.iterations, 6);
        assert_eq!(stats.trimmed, 0);
    }

    #[test]
    fn test_correction_from_full() {
        let rows = [2, 1, 2, 1];
        let cols = [3, 1, 2];
        let mut grid = Grid::new(vec![1; 12], &rows, &cols);
        Corrector::new(12, 1000)
            .run(&mut grid, &mut PamRng::from_seed(5))
            .unwrap();
        assert!(sums_match(&grid));
    }

    #[test]
    fn test_zero_bound_reports_deficits() {
        let rows = [1, 1];
        let cols = [1, 1];
        let mut grid = Grid::new(vec![0; 4], &rows, &cols);
        let err = Corrector::new(0, 1000)
            .run(&mut grid, &mut PamRng::from_seed(1))
            .unwrap_err();
        assert_eq!(
            err,
            RandomizeError::NonConvergence {
                iterations: 0,
                row_deficits: vec![(0, 1), (1, 1)],
                col_deficits: vec![(0, 1), (1, 1)],
            }
        );
    }

    #[test]
    fn test_augment_single_free_cell() {
        // Row 0 is short and column 2 is open, so the path is one cell.
        let rows = [2, 1];
        let cols = [1, 1, 1];
        let mut grid = Grid::new(vec![0, 1, 0, 1, 0, 0], &rows, &cols);
        assert!(grid.augment());
        assert_eq!(grid.row_sums, vec![2, 1]);
        assert_eq!(grid.col_sums, vec![1, 1, 1]);
    }

    #[test]
    fn test_augment_flips_alternating_path() {
        // Row 0 is short and only misses columns that are already full.
        // Row 0: [0, 1] target 2; row 1: [1, 0] target 1; cols targets [1, 2].
        // Path: row 0 -> col 0 (absent) -> row 1 (present) -> col 1 (absent, open).
        let rows = [2, 1];
        let cols = [1, 2];
        let mut grid = Grid::new(vec![0, 1, 1, 0], &rows, &cols);
        assert!(grid.augment());
        assert_eq!(grid.into_cells(), vec![1, 1, 0, 1]);
    }

    #[test]
    fn test_augment_without_deficit_fails() {
        let rows = [1];
        let cols = [1];
        let mut grid = Grid::new(vec![1], &rows, &cols);
        assert!(!grid.augment());
    }
}
