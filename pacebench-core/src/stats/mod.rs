//! Descriptive statistics over collected timing samples.
//!
//! Everything here is recomputed from scratch from the current sample set.
//! Nothing caches or incrementally updates derived values, so calling any
//! of these functions twice on the same samples yields identical output.

use statrs::distribution::{ContinuousCDF, StudentsT};

mod welch;
pub use welch::{DifferenceTest, WelchInterval};

/// Confidence level used for every interval in the system.
pub const CONFIDENCE_LEVEL: f64 = 0.95;

/// A `[low, high]` interval at [`CONFIDENCE_LEVEL`].
///
/// Invariant: `low <= high`. A point interval (`low == high`) is the
/// degenerate form used when fewer than two samples exist or the variance
/// is exactly zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceInterval {
    pub low: f64,
    pub high: f64,
}

impl ConfidenceInterval {
    /// Interval collapsed to a single value.
    pub fn point(value: f64) -> Self {
        Self {
            low: value,
            high: value,
        }
    }

    /// Width of the interval.
    pub fn width(&self) -> f64 {
        self.high - self.low
    }

    /// Divide both endpoints by a positive divisor.
    pub fn scaled_by(&self, divisor: f64) -> Self {
        Self {
            low: self.low / divisor,
            high: self.high / divisor,
        }
    }
}

/// Append-only timing samples for one variant, in milliseconds.
///
/// Grows only by appending; samples are never reordered or pruned. Also
/// carries the one bytes-transferred measurement, captured on the first
/// sample and never resampled.
#[derive(Debug, Clone, Default)]
pub struct SampleSet {
    millis: Vec<f64>,
    bytes_sent: Option<u64>,
}

impl SampleSet {
    /// Create an empty sample set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one measured duration in milliseconds.
    pub fn record(&mut self, millis: f64) {
        self.millis.push(millis);
    }

    /// Record the bytes-transferred measurement. Only the first call
    /// sticks; later calls are ignored.
    pub fn record_bytes(&mut self, bytes: u64) {
        if self.bytes_sent.is_none() {
            self.bytes_sent = Some(bytes);
        }
    }

    /// The collected samples in collection order.
    pub fn samples(&self) -> &[f64] {
        &self.millis
    }

    /// Number of collected samples.
    pub fn len(&self) -> usize {
        self.millis.len()
    }

    /// Whether no samples have been collected yet.
    pub fn is_empty(&self) -> bool {
        self.millis.is_empty()
    }

    /// Bytes transferred for this variant's page, if captured.
    pub fn bytes_sent(&self) -> Option<u64> {
        self.bytes_sent
    }
}

/// Derived statistics for one variant's current sample set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DescriptiveStats {
    /// Number of samples the statistics were computed from.
    pub size: usize,
    /// Sample mean in milliseconds.
    pub mean: f64,
    /// Unbiased sample standard deviation in milliseconds.
    pub std_dev: f64,
    /// Student's-t confidence interval of the mean.
    pub mean_ci: ConfidenceInterval,
}

impl DescriptiveStats {
    /// Compute statistics from the current samples.
    ///
    /// With fewer than two samples the standard deviation is zero and the
    /// interval collapses to a point at the mean.
    pub fn from_samples(set: &SampleSet) -> Self {
        let samples = set.samples();
        let n = samples.len();
        let mean = mean(samples);

        if n < 2 {
            return Self {
                size: n,
                mean,
                std_dev: 0.0,
                mean_ci: ConfidenceInterval::point(mean),
            };
        }

        let std_dev = sample_variance(samples, mean).sqrt();
        let margin = t_quantile((n - 1) as f64, CONFIDENCE_LEVEL) * std_dev / (n as f64).sqrt();

        Self {
            size: n,
            mean,
            std_dev,
            mean_ci: ConfidenceInterval {
                low: mean - margin,
                high: mean + margin,
            },
        }
    }
}

/// Sample mean, zero for an empty slice.
pub(crate) fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

/// Sample variance with Bessel's correction (n-1 denominator).
pub(crate) fn sample_variance(samples: &[f64], mean: f64) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }
    let sum_sq_diff: f64 = samples
        .iter()
        .map(|x| {
            let diff = x - mean;
            diff * diff
        })
        .sum();
    sum_sq_diff / (samples.len() - 1) as f64
}

/// Two-sided Student's-t quantile for the given degrees of freedom and
/// confidence level (e.g. 0.95 yields the 0.975 quantile).
pub(crate) fn t_quantile(df: f64, confidence_level: f64) -> f64 {
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => dist.inverse_cdf(0.5 + confidence_level / 2.0),
        // df < 1 is unreachable for n >= 2; fall back to a zero-width margin
        Err(_) => 0.0,
    }
}
