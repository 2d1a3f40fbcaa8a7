//! Core types and statistics for pacebench.
//!
//! This crate holds the pure computation of the benchmark engine (sample
//! sets, descriptive statistics, horizon thresholds, pairwise comparisons)
//! plus the wire protocol shared by the pacebench CLI and the
//! pacebench-runner service.

pub mod compare;
pub mod horizons;
pub mod protocol;
pub mod report;
pub mod stats;
pub mod variant;

// Re-export main types for convenience
pub use compare::{all_resolved, build_results, classify, Comparison, ResultStats, Verdict};
pub use horizons::{HorizonError, HorizonSet};
pub use protocol::{
    CollectSampleRequest, CollectSampleResponse, HealthResponse, Measurement, ShutdownResponse,
};
pub use report::{ReportError, Reporter, RunOutcome, RunReport};
pub use stats::{
    ConfidenceInterval, DescriptiveStats, DifferenceTest, SampleSet, WelchInterval,
    CONFIDENCE_LEVEL,
};
pub use variant::{MeasurementKind, Variant};
