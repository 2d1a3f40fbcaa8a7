//! Adaptive sampling scheduler.
//!
//! The scheduler owns every variant's sample set and the elapsed-time
//! clock. It repeatedly asks the sample source for one more measurement
//! per variant, recomputes all statistics and pairwise comparisons from
//! scratch, and stops once every comparison is resolved against the
//! configured horizons or the wall-clock budget runs out.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::task::{JoinError, JoinSet};

use pacebench_core::compare::{all_resolved, build_results, ResultStats};
use pacebench_core::horizons::HorizonSet;
use pacebench_core::protocol::Measurement;
use pacebench_core::report::{RunOutcome, RunReport};
use pacebench_core::stats::{SampleSet, WelchInterval};
use pacebench_core::variant::Variant;

/// Errors that can occur while scheduling a run.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Statistics require at least two samples per variant.
    #[error("Minimum sample size must be at least 2, got {0}")]
    InsufficientSampleSize(usize),

    /// The variant list was empty.
    #[error("No variants to sample")]
    NoVariants,

    /// The baseline index does not name a configured variant.
    #[error("Baseline index {index} out of range for {count} variant(s)")]
    BaselineOutOfRange { index: usize, count: usize },

    /// The sample source failed; fatal to the current run.
    #[error("Sample collection failed for '{variant}' in round {round}: {message}")]
    SampleCollection {
        variant: String,
        round: u32,
        message: String,
    },

    /// A collection task panicked or was cancelled.
    #[error("Sample collection task failed: {0}")]
    CollectionTask(String),
}

/// A collaborator that can produce one timing sample for a variant.
///
/// The scheduler issues at most one in-flight collection per variant at a
/// time; distinct variants may be collected concurrently up to the
/// configured limit.
pub trait SampleSource: Send + Sync + 'static {
    /// Error surfaced when a sample cannot be collected. Failures are
    /// fatal to the current run; retry policy, if any, belongs behind
    /// this trait.
    type Error: fmt::Display + Send + 'static;

    /// Collect a single timing sample for `variant`.
    fn collect_once(
        &self,
        variant: &Variant,
    ) -> impl Future<Output = Result<Measurement, Self::Error>> + Send;
}

/// Configuration for one sampling run.
#[derive(Debug, Clone)]
pub struct SamplePlan {
    /// Samples to collect per variant before any resolution check.
    pub min_samples: usize,
    /// Wall-clock budget for the adaptive phase. Zero means fixed-size
    /// mode: collect the minimum and stop without evaluating resolution.
    pub budget: Duration,
    /// Thresholds every comparison must resolve against.
    pub horizons: HorizonSet,
    /// Maximum concurrent sample collections within one round.
    pub concurrency: usize,
    /// Index of the baseline variant, if one was designated.
    pub baseline: Option<usize>,
}

impl Default for SamplePlan {
    fn default() -> Self {
        Self {
            min_samples: 50,
            budget: Duration::from_secs(3 * 60),
            horizons: HorizonSet::default(),
            concurrency: 1,
            baseline: None,
        }
    }
}

/// The sampling control loop.
///
/// All sample sets and derived statistics are owned here for the duration
/// of one run; nothing mutates them concurrently. Statistics are
/// recomputed from the raw samples each round rather than incrementally
/// updated.
pub struct Scheduler<S: SampleSource> {
    variants: Vec<Variant>,
    source: Arc<S>,
    plan: SamplePlan,
    verbose: bool,
}

impl<S: SampleSource> Scheduler<S> {
    /// Create a scheduler over the given variants and sample source.
    pub fn new(variants: Vec<Variant>, source: Arc<S>, plan: SamplePlan) -> Self {
        Self {
            variants,
            source,
            plan,
            verbose: false,
        }
    }

    /// Enable round-by-round progress output on stderr.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Run to completion.
    ///
    /// The minimum phase always completes; the budget gates only the
    /// adaptive rounds and is checked between rounds, never mid-sample,
    /// so a round in flight drains fully and its samples are kept.
    pub async fn run(self) -> Result<RunReport, SchedulerError> {
        self.validate()?;

        let started = Instant::now();
        let mut sets: Vec<SampleSet> = vec![SampleSet::new(); self.variants.len()];
        let mut rounds: u32 = 0;
        let test = WelchInterval::default();

        // Minimum phase: one sample per variant per round, interleaved so
        // slow environmental drift spreads evenly across variants instead
        // of biasing one variant's samples to one time window.
        let everyone: Vec<usize> = (0..self.variants.len()).collect();
        for _ in 0..self.plan.min_samples {
            rounds += 1;
            self.collect_round(&mut sets, &everyone, rounds).await?;
        }

        // Fixed-size mode: skip the evaluate/collect loop entirely.
        if self.plan.budget.is_zero() {
            let results = build_results(&self.variants, &sets, self.plan.baseline, &test);
            return Ok(RunReport {
                results,
                outcome: RunOutcome::TimedOut,
                horizons: self.plan.horizons.clone(),
                elapsed: started.elapsed(),
                rounds,
            });
        }

        loop {
            let results = build_results(&self.variants, &sets, self.plan.baseline, &test);

            if all_resolved(&results, &self.plan.horizons) {
                if self.verbose {
                    eprintln!("[scheduler] resolved after {} round(s)", rounds);
                }
                return Ok(RunReport {
                    results,
                    outcome: RunOutcome::Resolved,
                    horizons: self.plan.horizons.clone(),
                    elapsed: started.elapsed(),
                    rounds,
                });
            }

            // Budget check at the top of each collecting round; in-flight
            // samples are never aborted mid-measurement.
            if started.elapsed() >= self.plan.budget {
                if self.verbose {
                    eprintln!("[scheduler] budget exhausted after {} round(s)", rounds);
                }
                return Ok(RunReport {
                    results,
                    outcome: RunOutcome::TimedOut,
                    horizons: self.plan.horizons.clone(),
                    elapsed: started.elapsed(),
                    rounds,
                });
            }

            let due = unresolved_variants(&results, &self.plan.horizons);
            rounds += 1;
            self.collect_round(&mut sets, &due, rounds).await?;
        }
    }

    fn validate(&self) -> Result<(), SchedulerError> {
        if self.variants.is_empty() {
            return Err(SchedulerError::NoVariants);
        }
        if self.plan.min_samples < 2 {
            return Err(SchedulerError::InsufficientSampleSize(self.plan.min_samples));
        }
        if let Some(index) = self.plan.baseline {
            if index >= self.variants.len() {
                return Err(SchedulerError::BaselineOutOfRange {
                    index,
                    count: self.variants.len(),
                });
            }
        }
        Ok(())
    }

    /// Collect one sample for each variant in `due`, at most
    /// `plan.concurrency` in flight at a time, joining every task before
    /// returning so the caller evaluates a stable snapshot.
    async fn collect_round(
        &self,
        sets: &mut [SampleSet],
        due: &[usize],
        round: u32,
    ) -> Result<(), SchedulerError> {
        if self.verbose {
            eprintln!("[scheduler] round {}: sampling {} variant(s)", round, due.len());
        }

        let limit = self.plan.concurrency.max(1);
        let mut tasks: JoinSet<(usize, Result<Measurement, String>)> = JoinSet::new();
        let mut collected: Vec<(usize, Measurement)> = Vec::with_capacity(due.len());

        for &index in due {
            if tasks.len() >= limit {
                let joined = tasks.join_next().await;
                self.absorb(joined, &mut collected, round)?;
            }

            let source = Arc::clone(&self.source);
            let variant = self.variants[index].clone();
            tasks.spawn(async move {
                let result = source
                    .collect_once(&variant)
                    .await
                    .map_err(|e| e.to_string());
                (index, result)
            });
        }

        while !tasks.is_empty() {
            let joined = tasks.join_next().await;
            self.absorb(joined, &mut collected, round)?;
        }

        for (index, measurement) in collected {
            sets[index].record(measurement.millis);
            sets[index].record_bytes(measurement.bytes_sent);
        }

        Ok(())
    }

    fn absorb(
        &self,
        joined: Option<Result<(usize, Result<Measurement, String>), JoinError>>,
        collected: &mut Vec<(usize, Measurement)>,
        round: u32,
    ) -> Result<(), SchedulerError> {
        match joined {
            Some(Ok((index, Ok(measurement)))) => {
                collected.push((index, measurement));
                Ok(())
            }
            Some(Ok((index, Err(message)))) => Err(SchedulerError::SampleCollection {
                variant: self.variants[index].name.clone(),
                round,
                message,
            }),
            Some(Err(join_error)) => Err(SchedulerError::CollectionTask(join_error.to_string())),
            None => Ok(()),
        }
    }
}

/// Indices of variants involved in at least one unresolved comparison.
///
/// A variant whose comparisons are all resolved need not be resampled;
/// in practice every variant usually stays linked to an unresolved pair
/// until the run resolves as a whole.
fn unresolved_variants(results: &[ResultStats], horizons: &HorizonSet) -> Vec<usize> {
    let mut due = vec![false; results.len()];
    for (i, row) in results.iter().enumerate() {
        for comparison in &row.comparisons {
            if !comparison.resolved_against(horizons) {
                due[i] = true;
                due[comparison.against] = true;
            }
        }
    }
    (0..results.len()).filter(|&i| due[i]).collect()
}
