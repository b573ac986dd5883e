//! Randomize command implementation
//!
//! Reads an observed matrix, randomizes it with the chosen algorithm and
//! writes the result with the original labels. With `--iterations k > 1`
//! it writes `k` independent matrices named `<stem>_<i>.<ext>`, iteration
//! `i` being seeded from the base seed and `i`.

use std::path::PathBuf;

use clap::Args;
use pam_core::Pam;
use pam_nullmodel::{ErrorPolicy, NullModelError, DEFAULT_BATCH_SIZE};
use pam_randomize::{derive_seed, Algorithm, AlgorithmKind, HeuristicKind, PamRng, Randomizer};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::CliConfig;
use crate::{io, CliError, Result};

/// Arguments of `pamrand randomize`.
#[derive(Args, Debug, Clone)]
pub struct RandomizeArgs {
    /// Observed matrix (CSV)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file (CSV); numbered per iteration when iterations > 1
    #[arg(short, long)]
    pub output: PathBuf,

    /// Algorithm: swap, trial_swap, curveball, heuristic_fill
    #[arg(short, long, default_value_t = AlgorithmKind::Swap)]
    pub algorithm: AlgorithmKind,

    /// Number of swaps (swap, curveball) or trials (trial_swap)
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Fill heuristic for heuristic_fill
    #[arg(long, default_value_t = HeuristicKind::GlobalFill)]
    pub heuristic: HeuristicKind,

    /// Base seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of randomized matrices to write
    #[arg(long, default_value_t = 1)]
    pub iterations: usize,

    /// Skip failed iterations instead of aborting
    #[arg(long)]
    pub skip_on_error: bool,
}

/// Run the randomize command
pub fn run(args: &RandomizeArgs, config: &CliConfig) -> Result<()> {
    if args.iterations == 0 {
        return Err(CliError::InvalidArgument(
            "iterations must be at least 1".to_string(),
        ));
    }

    let pam = io::read_pam(&args.input)?;
    let randomize_config = config.randomize_config()?;
    let base_seed = randomize_config.rng().seed();
    let algorithm = Algorithm::build(args.algorithm, args.count, args.heuristic, randomize_config)?;
    let policy = if args.skip_on_error {
        ErrorPolicy::SkipFailed
    } else {
        ErrorPolicy::FailFast
    };

    info!(
        input = %args.input.display(),
        algorithm = %args.algorithm,
        count = ?args.count,
        iterations = args.iterations,
        base_seed,
        "Starting randomization"
    );

    if args.iterations == 1 {
        let mut rng = PamRng::from_seed(base_seed);
        let randomized = algorithm.randomize(pam.matrix(), &mut rng)?;
        io::write_pam(&args.output, &pam.with_matrix(randomized)?)?;
        info!(output = %args.output.display(), "Randomization complete");
        return Ok(());
    }

    let (written, skipped) = write_batches(&pam, &algorithm, args, base_seed, policy)?;
    if skipped > 0 {
        warn!(written, skipped, "Some iterations failed and were skipped");
    }
    info!(written, base_seed, "Randomization complete");
    Ok(())
}

fn write_batches(
    pam: &Pam,
    algorithm: &Algorithm,
    args: &RandomizeArgs,
    base_seed: u64,
    policy: ErrorPolicy,
) -> Result<(usize, usize)> {
    let mut written = 0;
    let mut skipped = 0;
    let mut start = 0;

    while start < args.iterations {
        let end = (start + DEFAULT_BATCH_SIZE).min(args.iterations);
        let results: Vec<_> = (start..end)
            .into_par_iter()
            .map(|i| {
                let mut rng = PamRng::from_seed(derive_seed(base_seed, i as u64));
                algorithm.randomize(pam.matrix(), &mut rng)
            })
            .collect();

        for (iteration, result) in (start..end).zip(results) {
            match result {
                Ok(randomized) => {
                    let path = io::numbered_path(&args.output, iteration);
                    io::write_pam(&path, &pam.with_matrix(randomized)?)?;
                    written += 1;
                }
                Err(error) => match policy {
                    ErrorPolicy::FailFast => {
                        return Err(NullModelError::Iteration {
                            iteration,
                            source: error,
                        }
                        .into());
                    }
                    ErrorPolicy::SkipFailed => {
                        warn!(iteration, %error, "skipping failed randomization");
                        skipped += 1;
                    }
                },
            }
        }
        start = end;
    }
    Ok((written, skipped))
}
