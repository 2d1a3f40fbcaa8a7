//! Command-line interface for pacebench.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{Config, ConfigError, VariantConfig};

#[derive(Debug, Parser)]
#[command(name = "pacebench")]
#[command(about = "Adaptive statistical benchmarking of web page load performance")]
#[command(version)]
pub struct Cli {
    /// Page URLs to benchmark; each becomes one variant
    pub urls: Vec<String>,

    /// Path to config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Minimum number of samples per variant
    #[arg(long)]
    pub sample_size: Option<usize>,

    /// Wall-clock budget in minutes for auto-sampling (0 = fixed size)
    #[arg(long)]
    pub timeout: Option<f64>,

    /// Resolution threshold, e.g. "0%", "1%", "+10ms" (repeatable)
    #[arg(long = "horizon")]
    pub horizons: Vec<String>,

    /// Maximum concurrent sample collections
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Browser for variants created from URL arguments
    #[arg(long)]
    pub browser: Option<String>,

    /// URL of an already-running runner (skips spawning)
    #[arg(long, conflicts_with = "runner_bin")]
    pub runner_url: Option<String>,

    /// Path to a runner binary to spawn
    #[arg(long)]
    pub runner_bin: Option<PathBuf>,

    /// Name of the variant to treat as the baseline
    #[arg(long)]
    pub baseline: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Apply CLI overrides to the configuration.
    ///
    /// CLI arguments take precedence over config file values. Only
    /// non-None optional values will override the config.
    pub fn apply_to_config(&self, config: &mut Config) {
        if let Some(sample_size) = self.sample_size {
            config.sampling.sample_size = sample_size;
        }

        if let Some(timeout) = self.timeout {
            config.sampling.timeout_minutes = timeout;
        }

        if !self.horizons.is_empty() {
            config.sampling.horizons = self.horizons.clone();
        }

        if let Some(concurrency) = self.concurrency {
            config.sampling.concurrency = concurrency;
        }

        if let Some(ref runner_url) = self.runner_url {
            config.network.runner_url = Some(runner_url.clone());
        }

        if let Some(ref runner_bin) = self.runner_bin {
            config.network.runner_bin = Some(runner_bin.clone());
        }

        // Positional URLs append to the configured variant list.
        for url in &self.urls {
            let mut variant = VariantConfig::for_url(url.clone());
            if let Some(ref browser) = self.browser {
                variant.browser = browser.clone();
            }
            config.variants.push(variant);
        }
    }

    /// Resolve the `--baseline` name to a variant index.
    ///
    /// Baseline selection is caller policy; the engine only receives the
    /// resulting index.
    pub fn resolve_baseline(&self, config: &Config) -> Result<Option<usize>, ConfigError> {
        let Some(ref name) = self.baseline else {
            return Ok(None);
        };
        config
            .variants
            .iter()
            .position(|v| &v.name == name)
            .map(Some)
            .ok_or_else(|| ConfigError::UnknownBaseline(name.clone()))
    }
}
