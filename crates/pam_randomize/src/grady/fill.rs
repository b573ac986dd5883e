//! Phase 1: parallel approximate fill.

use pam_core::Marginals;
use rayon::prelude::*;

use crate::error::RandomizeError;
use crate::heuristic::{checked_probability, CellContext, FillHeuristic};
use crate::rng::{derive_seed, PamRng};

/// Fills an `n_rows * n_cols` buffer cell by cell from `heuristic`.
///
/// Rows are split into blocks of `block_rows`; block `b` draws from
/// `PamRng::from_seed(derive_seed(block_seed, b))`, so the buffer depends
/// only on `block_seed` and `block_rows`, never on the worker count.
pub(crate) fn approximate_fill<H: FillHeuristic + ?Sized>(
    marginals: &Marginals,
    heuristic: &H,
    block_rows: usize,
    block_seed: u64,
) -> Result<Vec<u8>, RandomizeError> {
    let (n_rows, n_cols) = marginals.shape();
    let fill = marginals.fill();
    let row_totals = marginals.row_totals();
    let col_totals = marginals.col_totals();

    // Blocks larger than the matrix collapse to a single block.
    let block_rows = block_rows.clamp(1, n_rows.max(1));
    let mut cells = vec![0u8; n_rows * n_cols];
    cells
        .par_chunks_mut(block_rows * n_cols)
        .enumerate()
        .try_for_each(|(block, chunk)| {
            let mut rng = PamRng::from_seed(derive_seed(block_seed, block as u64));
            let first_row = block * block_rows;

            for (offset, row_cells) in chunk.chunks_exact_mut(n_cols).enumerate() {
                let row = first_row + offset;
                for (col, cell) in row_cells.iter_mut().enumerate() {
                    let context = CellContext {
                        row,
                        col,
                        row_total: row_totals[row],
                        col_total: col_totals[col],
                        n_rows,
                        n_cols,
                        fill,
                    };
                    let p = checked_probability(heuristic, &context)?;
                    *cell = u8::from(rng.gen_uniform() < p);
                }
            }
            Ok::<(), RandomizeError>(())
        })?;

    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristic::{AllAbsent, AllPresent, GlobalFill};

    fn marginals() -> Marginals {
        Marginals::new(vec![2, 1, 3, 0, 2], vec![3, 2, 1, 2]).unwrap()
    }

    #[test]
    fn test_constant_heuristics() {
        let m = marginals();
        assert!(approximate_fill(&m, &AllAbsent, 2, 0)
            .unwrap()
            .iter()
            .all(|&v| v == 0));
        assert!(approximate_fill(&m, &AllPresent, 2, 0)
            .unwrap()
            .iter()
            .all(|&v| v == 1));
    }

    #[test]
    fn test_oversized_block_is_one_block() {
        let m = marginals();
        let whole = approximate_fill(&m, &GlobalFill, m.shape().0, 5).unwrap();
        assert_eq!(approximate_fill(&m, &GlobalFill, usize::MAX, 5).unwrap(), whole);
        assert_eq!(approximate_fill(&m, &GlobalFill, 6, 5).unwrap(), whole);
    }

    #[test]
    fn test_same_seed_same_fill() {
        let m = marginals();
        let a = approximate_fill(&m, &GlobalFill, 2, 99).unwrap();
        let b = approximate_fill(&m, &GlobalFill, 2, 99).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 20);
    }

    #[test]
    fn test_fill_independent_of_thread_count() {
        let m = Marginals::new(vec![5; 40], vec![10; 20]).unwrap();
        let reference = approximate_fill(&m, &GlobalFill, 4, 7).unwrap();
        let single = rayon::ThreadPoolBuilder::new()
            .num_threads(1)
            .build()
            .unwrap()
            .install(|| approximate_fill(&m, &GlobalFill, 4, 7).unwrap());
        assert_eq!(reference, single);
    }
}
