use std::time::Duration;

use thiserror::Error;

use crate::compare::ResultStats;
use crate::horizons::HorizonSet;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// How a sampling run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every comparison was resolved against every configured horizon.
    Resolved,
    /// The wall-clock budget ran out first; the results are partial but
    /// valid. Zero-budget fixed-size runs also end here.
    TimedOut,
}

/// Final artifact of a sampling run, one result row per variant in input
/// order.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub results: Vec<ResultStats>,
    pub outcome: RunOutcome,
    /// The thresholds the run resolved (or failed to resolve) against.
    pub horizons: HorizonSet,
    /// Wall-clock time spent sampling.
    pub elapsed: Duration,
    /// Number of collection rounds, the minimum phase included.
    pub rounds: u32,
}

pub trait Reporter: Send + Sync {
    fn report(&self, report: &RunReport) -> Result<(), ReportError>;
}
