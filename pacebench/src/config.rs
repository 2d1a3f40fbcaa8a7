//! Configuration loading for pacebench.
//!
//! Supports loading configuration from TOML files, with sensible defaults
//! for all settings. Validation happens up front, before any runner work
//! starts, so a bad configuration never costs a partial run.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use pacebench_core::horizons::{HorizonError, HorizonSet};
use pacebench_core::variant::{MeasurementKind, Variant};

use crate::scheduler::SamplePlan;

/// Configuration that cannot produce a valid sampling run.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Statistics require at least two samples per variant.
    #[error("sample size must be at least 2, got {0}")]
    InsufficientSampleSize(usize),

    /// The timeout must be a non-negative number of minutes.
    #[error("timeout must be a non-negative number of minutes, got {0}")]
    InvalidTimeout(f64),

    #[error(transparent)]
    Horizon(#[from] HorizonError),

    /// A named baseline must match a configured variant.
    #[error("baseline {0:?} does not name a configured variant")]
    UnknownBaseline(String),
}

/// Top-level configuration for pacebench.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Settings for the adaptive sampling loop.
    pub sampling: SamplingConfig,
    /// Network settings for runner communication.
    pub network: NetworkConfig,
    /// Benchmark targets.
    pub variants: Vec<VariantConfig>,
}

/// Configuration for the adaptive sampling loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Samples to collect per variant before any resolution check.
    pub sample_size: usize,
    /// Wall-clock budget in minutes for the adaptive phase; 0 runs
    /// exactly the minimum sample count and stops.
    pub timeout_minutes: f64,
    /// Horizon tokens, e.g. "0%", "+10ms", "1%".
    pub horizons: Vec<String>,
    /// Maximum concurrent sample collections within one round.
    pub concurrency: usize,
}

/// Network configuration for runner communication.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// URL of an already-running runner (skips spawning).
    pub runner_url: Option<String>,
    /// Path to a runner binary to spawn.
    pub runner_bin: Option<PathBuf>,
    /// Port a spawned runner listens on.
    pub base_port: u16,
    /// Timeout in milliseconds for runner readiness.
    pub runner_timeout_ms: u64,
}

/// One benchmark target as configured.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VariantConfig {
    /// Display name, typically the page URL.
    pub name: String,
    /// Implementation under test.
    pub implementation: String,
    /// Version label for the implementation.
    pub version: String,
    /// Browser to load the page in; empty uses the default.
    pub browser: String,
    /// Query string appended to the page URL.
    pub query_string: String,
    /// What the runner measures.
    pub kind: MeasurementKind,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            sample_size: 50,
            timeout_minutes: 3.0,
            horizons: vec!["0%".to_string()],
            concurrency: 1,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            runner_url: None,
            runner_bin: None,
            base_port: 9400,
            runner_timeout_ms: 30_000, // 30 seconds
        }
    }
}

impl VariantConfig {
    /// Create a config entry for a bare page URL.
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            name: url.into(),
            ..Self::default()
        }
    }

    /// Resolve into the immutable variant the engine works with.
    pub fn to_variant(&self) -> Variant {
        let mut variant = Variant::named(self.name.clone());
        variant.implementation = self.implementation.clone();
        variant.version = self.version.clone();
        if !self.browser.is_empty() {
            variant.browser = self.browser.clone();
        }
        variant.query_string = self.query_string.clone();
        variant.kind = self.kind;
        variant
    }
}

/// Default configuration file name.
const DEFAULT_CONFIG_FILE: &str = ".pacebench.toml";

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load configuration from the default file (`.pacebench.toml`) or use
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be
    /// parsed.
    pub fn load_or_default() -> Result<Config> {
        let path = Path::new(DEFAULT_CONFIG_FILE);

        if path.exists() {
            Self::load(path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load configuration from the specified path, or try the default
    /// location.
    ///
    /// # Errors
    ///
    /// Returns an error if the specified file cannot be read or parsed.
    pub fn load_from(path: Option<&Path>) -> Result<Config> {
        match path {
            Some(p) => Self::load(p),
            None => Self::load_or_default(),
        }
    }

    /// The configured variants, resolved.
    pub fn resolve_variants(&self) -> Vec<Variant> {
        self.variants.iter().map(VariantConfig::to_variant).collect()
    }

    /// Validate the sampling settings into a scheduler plan.
    ///
    /// # Errors
    ///
    /// Fails fast on a sample size below 2, a negative or non-finite
    /// timeout, or a malformed horizon token.
    pub fn sample_plan(&self, baseline: Option<usize>) -> Result<SamplePlan, ConfigError> {
        if self.sampling.sample_size < 2 {
            return Err(ConfigError::InsufficientSampleSize(self.sampling.sample_size));
        }

        let minutes = self.sampling.timeout_minutes;
        if !minutes.is_finite() || minutes < 0.0 {
            return Err(ConfigError::InvalidTimeout(minutes));
        }

        let horizons = HorizonSet::parse(&self.sampling.horizons)?;

        Ok(SamplePlan {
            min_samples: self.sampling.sample_size,
            budget: Duration::from_secs_f64(minutes * 60.0),
            horizons,
            concurrency: self.sampling.concurrency,
            baseline,
        })
    }
}
