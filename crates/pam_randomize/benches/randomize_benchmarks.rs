//! Criterion benchmarks for the randomizers.
//!
//! Measures swap, trial swap, curveball and heuristic fill across matrix
//! sizes to characterise scaling behaviour.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pam_core::BinaryMatrix;
use pam_randomize::heuristic::HeuristicKind;
use pam_randomize::{
    curveball_randomize, swap_randomize, trial_swap, HeuristicFillRandomizer, PamRng,
};

/// Deterministic matrix with 40% fill and no empty or full lines.
fn banded_matrix(n: usize) -> BinaryMatrix {
    let mut m = BinaryMatrix::zeros(n, n);
    for i in 0..n {
        for j in 0..n {
            m.set(i, j, (7 * i + 3 * j) % 5 < 2);
        }
    }
    m
}

fn bench_swap_family(c: &mut Criterion) {
    let mut group = c.benchmark_group("swap_family");

    for size in [20, 100, 400] {
        let matrix = banded_matrix(size);
        let swaps = size * size;

        group.bench_with_input(BenchmarkId::new("swap", size), &matrix, |b, m| {
            let mut rng = PamRng::from_seed(1);
            b.iter(|| swap_randomize(black_box(m), swaps, &mut rng).unwrap());
        });

        group.bench_with_input(BenchmarkId::new("trial_swap", size), &matrix, |b, m| {
            let mut rng = PamRng::from_seed(1);
            b.iter(|| trial_swap(black_box(m), None, &mut rng).unwrap());
        });

        group.bench_with_input(BenchmarkId::new("curveball", size), &matrix, |b, m| {
            let mut rng = PamRng::from_seed(1);
            b.iter(|| curveball_randomize(black_box(m), swaps, &mut rng).unwrap());
        });
    }

    group.finish();
}

fn bench_heuristic_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("heuristic_fill");

    for size in [20, 100, 400] {
        let marginals = banded_matrix(size).marginals();

        for kind in [HeuristicKind::GlobalFill, HeuristicKind::RowColumnProduct] {
            let randomizer = HeuristicFillRandomizer::new(kind);
            group.bench_with_input(
                BenchmarkId::new(kind.to_string(), size),
                &marginals,
                |b, marginals| {
                    let mut rng = PamRng::from_seed(1);
                    b.iter(|| {
                        randomizer
                            .randomize_marginals(black_box(marginals), &mut rng)
                            .unwrap()
                    });
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_swap_family, bench_heuristic_fill);
criterion_main!(benches);
