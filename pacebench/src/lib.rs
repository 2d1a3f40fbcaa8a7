//! pacebench: adaptive statistical benchmarking of web pages
//!
//! This library compares page load performance across variants by sampling
//! until every pairwise comparison is resolved against the configured
//! horizons or a wall-clock budget runs out.

pub mod cli;
pub mod config;
pub mod report;
pub mod runner;
pub mod scheduler;

// Re-export core types for convenience
pub use pacebench_core::compare::{Comparison, ResultStats, Verdict};
pub use pacebench_core::horizons::{HorizonError, HorizonSet};
pub use pacebench_core::protocol;
pub use pacebench_core::report::{ReportError, Reporter, RunOutcome, RunReport};
pub use pacebench_core::stats::{ConfidenceInterval, DescriptiveStats, SampleSet, WelchInterval};
pub use pacebench_core::variant::{MeasurementKind, Variant};

// Re-export main types from this crate
pub use cli::Cli;
pub use config::{Config, ConfigError, VariantConfig};
pub use report::TerminalReporter;
pub use runner::{wait_for_ready, RunnerError, RunnerHandle};
pub use scheduler::{SamplePlan, SampleSource, Scheduler, SchedulerError};
