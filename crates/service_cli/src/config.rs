//! CLI configuration management
//!
//! Settings are layered, lowest priority first:
//! 1. Default values
//! 2. `pamrand.toml` (or the file given with `--config`)
//! 3. `PAMRAND_*` environment variables
//! 4. Command-line flags

use std::path::{Path, PathBuf};
use std::str::FromStr;

use pam_randomize::config::{
    DEFAULT_BLOCK_ROWS, DEFAULT_EXCHANGE_SEARCH_LIMIT, DEFAULT_MAX_ATTEMPTS_PER_SWAP,
};
use pam_randomize::{DegeneracyPolicy, RandomizeConfig};
use serde::Deserialize;
use thiserror::Error;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "pamrand.toml";

/// Prefix of every environment override.
pub const ENV_PREFIX: &str = "PAMRAND_";

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file error: {0}")]
    FileError(String),

    #[error(transparent)]
    Randomize(#[from] pam_randomize::ConfigError),
}

/// Log levels supported by the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_filter_str())
    }
}

/// Settings shared by every `pamrand` command.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Log level; `RUST_LOG` still wins when set.
    #[serde(deserialize_with = "deserialize_log_level")]
    pub log_level: LogLevel,
    /// Worker threads; all cores when unset.
    pub threads: Option<usize>,
    /// Base seed; drawn from entropy when unset.
    pub seed: Option<u64>,
    /// Degeneracy screening of the swap family.
    pub degeneracy: DegeneracyPolicy,
    /// Consecutive failed swap attempts before giving up.
    pub max_attempts_per_swap: usize,
    /// Heuristic-fill correction bound; `n_rows * n_cols` when unset.
    pub max_correction_iterations: Option<usize>,
    /// Random draws per correction exchange search.
    pub exchange_search_limit: usize,
    /// Rows per heuristic-fill work block.
    pub block_rows: usize,
}

fn deserialize_log_level<'de, D>(deserializer: D) -> Result<LogLevel, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    LogLevel::from_str(&s).map_err(serde::de::Error::custom)
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            threads: None,
            seed: None,
            degeneracy: DegeneracyPolicy::default(),
            max_attempts_per_swap: DEFAULT_MAX_ATTEMPTS_PER_SWAP,
            max_correction_iterations: None,
            exchange_search_limit: DEFAULT_EXCHANGE_SEARCH_LIMIT,
            block_rows: DEFAULT_BLOCK_ROWS,
        }
    }
}

fn parse_env<T: FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
    })
}

impl CliConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::FileError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse TOML: {}", e)))
    }

    /// Applies `PAMRAND_*` overrides read through `lookup`.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            let key = format!("{}{}", ENV_PREFIX, name);
            lookup(&key).map(|value| (key, value))
        };

        if let Some((_, v)) = var("LOG_LEVEL") {
            self.log_level = LogLevel::from_str(&v)?;
        }
        if let Some((k, v)) = var("THREADS") {
            self.threads = Some(parse_env(&k, &v)?);
        }
        if let Some((k, v)) = var("SEED") {
            self.seed = Some(parse_env(&k, &v)?);
        }
        if let Some((_, v)) = var("DEGENERACY") {
            self.degeneracy = DegeneracyPolicy::from_str(&v)?;
        }
        if let Some((k, v)) = var("MAX_ATTEMPTS_PER_SWAP") {
            self.max_attempts_per_swap = parse_env(&k, &v)?;
        }
        if let Some((k, v)) = var("MAX_CORRECTION_ITERATIONS") {
            self.max_correction_iterations = Some(parse_env(&k, &v)?);
        }
        if let Some((k, v)) = var("EXCHANGE_SEARCH_LIMIT") {
            self.exchange_search_limit = parse_env(&k, &v)?;
        }
        if let Some((k, v)) = var("BLOCK_ROWS") {
            self.block_rows = parse_env(&k, &v)?;
        }
        Ok(())
    }

    /// Merge with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli: &CliArgs) -> Result<(), ConfigError> {
        if let Some(level) = &cli.log_level {
            self.log_level = LogLevel::from_str(level)?;
        } else if cli.verbose {
            self.log_level = LogLevel::Debug;
        }
        if let Some(threads) = cli.threads {
            self.threads = Some(threads);
        }
        if let Some(seed) = cli.seed {
            self.seed = Some(seed);
        }
        if let Some(policy) = cli.degeneracy {
            self.degeneracy = policy;
        }
        Ok(())
    }

    /// Worker threads to run with.
    pub fn effective_threads(&self) -> usize {
        self.threads.unwrap_or_else(num_cpus::get)
    }

    /// Randomizer configuration for these settings.
    pub fn randomize_config(&self) -> Result<RandomizeConfig, ConfigError> {
        let mut builder = RandomizeConfig::builder()
            .max_attempts_per_swap(self.max_attempts_per_swap)
            .exchange_search_limit(self.exchange_search_limit)
            .block_rows(self.block_rows)
            .degeneracy(self.degeneracy);
        if let Some(seed) = self.seed {
            builder = builder.seed(seed);
        }
        if let Some(iterations) = self.max_correction_iterations {
            builder = builder.max_correction_iterations(iterations);
        }
        Ok(builder.build()?)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threads == Some(0) {
            return Err(ConfigError::InvalidValue {
                key: "threads".to_string(),
                value: "0".to_string(),
            });
        }
        self.randomize_config().map(|_| ())
    }
}

/// Command-line overrides
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Config file path
    pub config_file: Option<PathBuf>,
    /// Log level override
    pub log_level: Option<String>,
    /// Debug logging unless a log level is given
    pub verbose: bool,
    /// Thread count override
    pub threads: Option<usize>,
    /// Seed override
    pub seed: Option<u64>,
    /// Degeneracy policy override
    pub degeneracy: Option<DegeneracyPolicy>,
}

/// Build configuration from all sources
///
/// Priority (highest to lowest):
/// 1. CLI arguments
/// 2. Environment variables
/// 3. Config file
/// 4. Default values
pub fn build_config(cli: &CliArgs) -> Result<CliConfig, ConfigError> {
    build_config_with(cli, |key| std::env::var(key).ok())
}

/// [`build_config`] with an explicit environment lookup.
pub fn build_config_with<F>(cli: &CliArgs, lookup: F) -> Result<CliConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match &cli.config_file {
        Some(path) => CliConfig::from_file(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
            CliConfig::from_file(Path::new(DEFAULT_CONFIG_FILE))?
        }
        None => CliConfig::default(),
    };

    config.apply_env_with(lookup)?;
    config.merge_with_cli(cli)?;

    config.validate()?;
    Ok(config)
}
