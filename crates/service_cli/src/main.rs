//! pamrand - Command Line Randomization of Presence-Absence Matrices
//!
//! # Commands
//!
//! - `pamrand randomize -i <csv> -o <csv> -a <algorithm> -n <count>` - Write
//!   one or more marginal-preserving randomizations of a matrix
//! - `pamrand check -i <csv>` - Report shape, fill and swappability
//!
//! # Configuration
//!
//! Settings come from `pamrand.toml`, then `PAMRAND_*` environment variables,
//! then flags. `RUST_LOG` overrides the configured log level.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use pam_randomize::DegeneracyPolicy;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;
mod io;

pub use error::{CliError, Result};

use commands::check::OutputFormat;
use commands::randomize::RandomizeArgs;
use config::{build_config, CliArgs};

/// Marginal-preserving randomization of presence-absence matrices
#[derive(Parser)]
#[command(name = "pamrand")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path (default: ./pamrand.toml if present)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Worker threads (default: all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,

    /// Degeneracy screening for the swap family (strict, lenient)
    #[arg(long, global = true)]
    degeneracy: Option<DegeneracyPolicy>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Randomize a matrix, preserving row and column totals
    Randomize(RandomizeArgs),

    /// Validate a matrix and report whether it can be randomized
    Check {
        /// Matrix file (CSV)
        #[arg(short, long)]
        input: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

impl From<&Cli> for CliArgs {
    fn from(cli: &Cli) -> Self {
        let seed = match &cli.command {
            Commands::Randomize(args) => args.seed,
            Commands::Check { .. } => None,
        };
        CliArgs {
            config_file: cli.config.clone(),
            log_level: cli.log_level.clone(),
            verbose: cli.verbose,
            threads: cli.threads,
            seed,
            degeneracy: cli.degeneracy,
        }
    }
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = build_config(&CliArgs::from(&cli))?;
    init_tracing(config.log_level.as_filter_str());

    let threads = config.effective_threads();
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .map_err(|e| CliError::ThreadPool(e.to_string()))?;
    info!(
        threads,
        degeneracy = ?config.degeneracy,
        seed = ?config.seed,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Randomize(args) => commands::randomize::run(&args, &config),
        Commands::Check { input, format } => commands::check::run(&input, format),
    }
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
