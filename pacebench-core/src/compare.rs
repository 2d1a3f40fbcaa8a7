//! Pairwise comparisons between variants.
//!
//! For every ordered pair of variants the builder computes the confidence
//! interval of the difference of means, both in milliseconds and as a
//! fraction of the reference variant's mean. The full matrix is recomputed
//! from the raw samples each scheduling round; no derived state survives
//! between rounds.

use crate::horizons::HorizonSet;
use crate::stats::{ConfidenceInterval, DescriptiveStats, DifferenceTest, SampleSet};
use crate::variant::Variant;

/// Qualitative direction of one comparison, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The reference variant; no comparison is computed for it.
    Baseline,
    /// Reliably faster than the other variant.
    Faster,
    /// Reliably slower than the other variant.
    Slower,
    /// The interval straddles (or touches) zero; no confident direction.
    Unsure,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Baseline => "baseline",
            Verdict::Faster => "faster",
            Verdict::Slower => "slower",
            Verdict::Unsure => "unsure",
        }
    }
}

/// Classify an absolute slowdown interval.
///
/// The boundaries are strict: an interval with `low == 0` or `high == 0`
/// touches zero and classifies as unsure.
pub fn classify(is_baseline: bool, absolute_slowdown: ConfidenceInterval) -> Verdict {
    if is_baseline {
        Verdict::Baseline
    } else if absolute_slowdown.low > 0.0 {
        Verdict::Slower
    } else if absolute_slowdown.high < 0.0 {
        Verdict::Faster
    } else {
        Verdict::Unsure
    }
}

/// One ordered pairwise comparison: this variant measured against another.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// Index of the variant this row is measured against.
    pub against: usize,
    /// Confidence interval of this variant's mean minus the other's, in
    /// milliseconds. Positive means this variant is slower.
    pub absolute_slowdown: ConfidenceInterval,
    /// The absolute interval as a fraction of the other variant's mean.
    pub relative_slowdown: ConfidenceInterval,
}

impl Comparison {
    /// Qualitative direction of this comparison.
    pub fn verdict(&self) -> Verdict {
        classify(false, self.absolute_slowdown)
    }

    /// Whether both interval views clear every configured horizon.
    pub fn resolved_against(&self, horizons: &HorizonSet) -> bool {
        horizons.resolves(self.absolute_slowdown, self.relative_slowdown)
    }
}

/// One variant's terminal output artifact: its descriptive statistics plus
/// its row of comparisons against every other variant.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultStats {
    pub variant: Variant,
    pub stats: DescriptiveStats,
    /// Bytes transferred loading this variant's page, if captured.
    pub bytes_sent: Option<u64>,
    /// Baseline rows carry no comparisons and display as "N/A".
    pub is_baseline: bool,
    pub comparisons: Vec<Comparison>,
}

/// Build one result row per variant from the current samples.
///
/// The comparison matrix excludes the diagonal and the baseline row;
/// non-baseline rows compare against every other variant, the baseline
/// included. Pure function of the sample sets: recomputing on unchanged
/// samples yields identical output.
pub fn build_results(
    variants: &[Variant],
    sets: &[SampleSet],
    baseline: Option<usize>,
    test: &dyn DifferenceTest,
) -> Vec<ResultStats> {
    debug_assert_eq!(variants.len(), sets.len());

    let stats: Vec<DescriptiveStats> = sets.iter().map(DescriptiveStats::from_samples).collect();

    variants
        .iter()
        .enumerate()
        .map(|(i, variant)| {
            let is_baseline = baseline == Some(i);
            let comparisons = if is_baseline {
                Vec::new()
            } else {
                (0..variants.len())
                    .filter(|&j| j != i)
                    .map(|j| {
                        let absolute_slowdown =
                            test.difference_ci(sets[i].samples(), sets[j].samples());
                        // Only reachable when every reference sample is 0ms.
                        let relative_slowdown = if stats[j].mean == 0.0 {
                            ConfidenceInterval::point(0.0)
                        } else {
                            absolute_slowdown.scaled_by(stats[j].mean)
                        };
                        Comparison {
                            against: j,
                            absolute_slowdown,
                            relative_slowdown,
                        }
                    })
                    .collect()
            };

            ResultStats {
                variant: variant.clone(),
                stats: stats[i],
                bytes_sent: sets[i].bytes_sent(),
                is_baseline,
                comparisons,
            }
        })
        .collect()
}

/// Whether every comparison in every row is resolved against the horizons.
///
/// Vacuously true for a single variant or an all-baseline matrix.
pub fn all_resolved(results: &[ResultStats], horizons: &HorizonSet) -> bool {
    results
        .iter()
        .flat_map(|row| &row.comparisons)
        .all(|comparison| comparison.resolved_against(horizons))
}
