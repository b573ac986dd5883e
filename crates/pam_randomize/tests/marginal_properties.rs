//! Property-based tests: every randomizer keeps the marginals of its input.

use pam_core::BinaryMatrix;
use pam_randomize::validate::has_checkerboard;
use pam_randomize::{
    Algorithm, AlgorithmKind, DegeneracyPolicy, HeuristicFillRandomizer, HeuristicKind, PamRng,
    RandomizeConfig, Randomizer,
};
use proptest::prelude::*;

/// Random matrices between 2x2 and 12x12.
fn matrix_strategy() -> impl Strategy<Value = BinaryMatrix> {
    (2..=12usize, 2..=12usize).prop_flat_map(|(n_rows, n_cols)| {
        prop::collection::vec(0..=1u8, n_rows * n_cols)
            .prop_map(move |data| BinaryMatrix::from_vec(n_rows, n_cols, data).unwrap())
    })
}

fn heuristic_strategy() -> impl Strategy<Value = HeuristicKind> {
    prop::sample::select(HeuristicKind::ALL.to_vec())
}

fn lenient() -> RandomizeConfig {
    RandomizeConfig::builder()
        .degeneracy(DegeneracyPolicy::Lenient)
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Swap, trial swap and curveball keep row and column totals.
    #[test]
    fn prop_swap_family_preserves_marginals(
        matrix in matrix_strategy(),
        seed in any::<u64>(),
        count in 0..200usize,
    ) {
        prop_assume!(has_checkerboard(&matrix));

        for kind in [AlgorithmKind::Swap, AlgorithmKind::TrialSwap, AlgorithmKind::Curveball] {
            let algorithm = Algorithm::build(kind, Some(count), HeuristicKind::default(), lenient()).unwrap();
            let out = algorithm.randomize(&matrix, &mut PamRng::from_seed(seed)).unwrap();
            prop_assert_eq!(out.row_totals(), matrix.row_totals());
            prop_assert_eq!(out.col_totals(), matrix.col_totals());
        }
    }

    /// Heuristic fill hits the marginals of any real matrix exactly.
    #[test]
    fn prop_heuristic_fill_matches_marginals(
        matrix in matrix_strategy(),
        heuristic in heuristic_strategy(),
        seed in any::<u64>(),
    ) {
        let marginals = matrix.marginals();
        let out = HeuristicFillRandomizer::new(heuristic)
            .randomize_marginals(&marginals, &mut PamRng::from_seed(seed))
            .unwrap();
        prop_assert!(marginals.matches(&out));
    }

    /// The observed matrix is never modified.
    #[test]
    fn prop_input_untouched(matrix in matrix_strategy(), seed in any::<u64>()) {
        prop_assume!(has_checkerboard(&matrix));

        let before = matrix.clone();
        let algorithm = Algorithm::build(AlgorithmKind::Swap, Some(50), HeuristicKind::default(), lenient()).unwrap();
        let _ = algorithm.randomize(&matrix, &mut PamRng::from_seed(seed)).unwrap();
        prop_assert_eq!(matrix, before);
    }
}
