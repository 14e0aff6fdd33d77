//! Defines the run configuration for the fauxwork scheduler.
//!
//! A [`RunConfig`] is assembled once per process, typically by layering a
//! TOML file and `FAUXWORK_*` environment variables (see [`RunConfig::load`])
//! and then applying command-line overrides. Once handed to a
//! [`Scheduler`](crate::engine::Scheduler) it is never mutated.

use crate::error::Result;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Environment variable prefix, e.g. `FAUXWORK_SPEED_FACTOR=2.5`.
pub const ENV_PREFIX: &str = "FAUXWORK";

/// Immutable description of one scheduler run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Module names to pick from. Empty means every registered module.
    pub enabled_modules: Vec<String>,
    /// Multiplier applied to every requested delay. >1 speeds up, <1 slows down.
    pub speed_factor: f64,
    /// Number of leading delay requests honored with zero wait.
    pub instant_print_lines: u64,
    /// Stop once this much wall-clock time has elapsed.
    pub exit_after_duration: Option<Duration>,
    /// Stop once this many modules have completed.
    pub exit_after_module_count: Option<u64>,
    /// Seed for the run's random source. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            enabled_modules: Vec::new(),
            speed_factor: default_speed_factor(),
            instant_print_lines: 0,
            exit_after_duration: None,
            exit_after_module_count: None,
            seed: None,
        }
    }
}

impl RunConfig {
    /// Loads a configuration from built-in defaults, an optional TOML file,
    /// and `FAUXWORK_*` environment variables, in increasing precedence.
    ///
    /// A path that is given but does not exist is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("enabled_modules"),
        );
        let file: FileConfig = builder.build()?.try_deserialize()?;
        let config = RunConfig::try_from(file)?;
        Ok(config)
    }

    /// The enabled-module filter with entries trimmed, lowercased, and
    /// empty entries discarded.
    pub fn normalized_enabled(&self) -> Vec<String> {
        normalize_names(&self.enabled_modules)
    }

    /// The speed factor clamped to a safe positive value.
    ///
    /// Zero, negative, and non-finite factors fall back to `1.0`, i.e. delays
    /// are applied unscaled.
    pub fn effective_speed(&self) -> f64 {
        if self.speed_factor.is_finite() && self.speed_factor > 0.0 {
            self.speed_factor
        } else {
            1.0
        }
    }
}

/// Trims, lowercases, and drops empty module names.
pub fn normalize_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    names
        .iter()
        .map(|n| n.as_ref().trim().to_lowercase())
        .filter(|n| !n.is_empty())
        .collect()
}

/// On-disk and environment shape of [`RunConfig`].
///
/// Durations are expressed as float seconds because neither TOML nor the
/// environment has a native duration type.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct FileConfig {
    enabled_modules: Vec<String>,
    speed_factor: f64,
    instant_print_lines: u64,
    exit_after_secs: Option<f64>,
    exit_after_modules: Option<u64>,
    seed: Option<u64>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            enabled_modules: Vec::new(),
            speed_factor: default_speed_factor(),
            instant_print_lines: 0,
            exit_after_secs: None,
            exit_after_modules: None,
            seed: None,
        }
    }
}

impl TryFrom<FileConfig> for RunConfig {
    type Error = ConfigError;

    fn try_from(file: FileConfig) -> std::result::Result<Self, Self::Error> {
        let exit_after_duration = file
            .exit_after_secs
            .map(|secs| {
                Duration::try_from_secs_f64(secs).map_err(|_| {
                    ConfigError::Message(format!(
                        "exit_after_secs must be a non-negative number, got {secs}"
                    ))
                })
            })
            .transpose()?;

        Ok(Self {
            enabled_modules: file.enabled_modules,
            speed_factor: file.speed_factor,
            instant_print_lines: file.instant_print_lines,
            exit_after_duration,
            exit_after_module_count: file.exit_after_modules,
            seed: file.seed,
        })
    }
}

// --- Default value functions ---

fn default_speed_factor() -> f64 {
    1.0
}
