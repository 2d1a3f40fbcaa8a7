use super::{mean, sample_variance, t_quantile, ConfidenceInterval, CONFIDENCE_LEVEL};

/// A two-sample confidence interval on the difference of means.
///
/// Implementations take the raw samples of both sides, not just their
/// one-sample intervals: the distribution of the difference is not
/// derivable from two independent intervals alone.
pub trait DifferenceTest: Send + Sync {
    /// Confidence interval of `mean(a) - mean(b)`, in the samples' unit.
    fn difference_ci(&self, a: &[f64], b: &[f64]) -> ConfidenceInterval;
}

/// Welch's two-sample t-interval for samples with potentially unequal
/// variances.
///
/// This is the recommended interval for cross-variant comparisons because
/// sample counts and variances legitimately differ between variants.
#[derive(Debug, Clone)]
pub struct WelchInterval {
    /// The confidence level of the interval (default: 0.95).
    pub confidence_level: f64,
}

impl Default for WelchInterval {
    fn default() -> Self {
        Self {
            confidence_level: CONFIDENCE_LEVEL,
        }
    }
}

impl WelchInterval {
    /// Create a Welch interval at the specified confidence level.
    ///
    /// # Panics
    /// Panics if `confidence_level` is not in the range (0, 1).
    pub fn new(confidence_level: f64) -> Self {
        assert!(
            confidence_level > 0.0 && confidence_level < 1.0,
            "confidence_level must be between 0 and 1 (exclusive)"
        );
        Self { confidence_level }
    }

    /// Degrees of freedom from the Welch-Satterthwaite equation.
    ///
    /// df = (var1/n1 + var2/n2)^2 / ((var1/n1)^2/(n1-1) + (var2/n2)^2/(n2-1))
    fn welch_satterthwaite_df(var1: f64, n1: usize, var2: f64, n2: usize) -> f64 {
        let s1 = var1 / n1 as f64;
        let s2 = var2 / n2 as f64;
        let numerator = (s1 + s2).powi(2);
        let denominator = (s1.powi(2) / (n1 - 1) as f64) + (s2.powi(2) / (n2 - 1) as f64);

        if denominator == 0.0 {
            // Fallback to minimum df when variances are zero
            return (n1.min(n2) - 1) as f64;
        }

        numerator / denominator
    }
}

impl DifferenceTest for WelchInterval {
    fn difference_ci(&self, a: &[f64], b: &[f64]) -> ConfidenceInterval {
        let n1 = a.len();
        let n2 = b.len();

        let mean1 = mean(a);
        let mean2 = mean(b);
        let diff = mean1 - mean2;

        // Too little data for a variance estimate on either side.
        if n1 < 2 || n2 < 2 {
            return ConfidenceInterval::point(diff);
        }

        let var1 = sample_variance(a, mean1);
        let var2 = sample_variance(b, mean2);

        // Standard error of the difference of means.
        let se = (var1 / n1 as f64 + var2 / n2 as f64).sqrt();
        if se == 0.0 {
            return ConfidenceInterval::point(diff);
        }

        let df = Self::welch_satterthwaite_df(var1, n1, var2, n2);
        let margin = t_quantile(df, self.confidence_level) * se;

        ConfidenceInterval {
            low: diff - margin,
            high: diff + margin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_samples_point_interval() {
        let test = WelchInterval::default();
        let samples = [100.0, 100.0, 100.0, 100.0, 100.0];
        let ci = test.difference_ci(&samples, &samples);
        assert_eq!(ci, ConfidenceInterval::point(0.0));
    }

    #[test]
    fn test_clearly_different_means() {
        let test = WelchInterval::default();
        let slow = [10.0, 10.1, 10.2, 9.9, 10.0];
        let fast = [1.0, 1.1, 1.2, 0.9, 1.0];

        let ci = test.difference_ci(&slow, &fast);
        assert!(ci.low > 0.0, "interval should be entirely above zero: {:?}", ci);
        assert!((ci.low - 9.0).abs() < 1.0);
        assert!((ci.high - 9.0).abs() < 1.0);
    }

    #[test]
    fn test_direction_flips_with_argument_order() {
        let test = WelchInterval::default();
        let a = [1.0, 1.1, 0.9, 1.0, 1.05];
        let b = [2.0, 2.1, 1.9, 2.0, 2.05];

        let forward = test.difference_ci(&a, &b);
        let backward = test.difference_ci(&b, &a);

        assert!((forward.low + backward.high).abs() < 1e-12);
        assert!((forward.high + backward.low).abs() < 1e-12);
    }

    #[test]
    fn test_insufficient_samples_collapse() {
        let test = WelchInterval::default();
        let ci = test.difference_ci(&[100.0], &[200.0]);
        assert_eq!(ci, ConfidenceInterval::point(-100.0));
    }

    #[test]
    fn test_zero_variance_different_means() {
        let test = WelchInterval::default();
        let a = [200.0, 200.0, 200.0];
        let b = [100.0, 100.0, 100.0];
        let ci = test.difference_ci(&a, &b);
        assert_eq!(ci, ConfidenceInterval::point(100.0));
    }

    #[test]
    fn test_custom_confidence_level_widens() {
        let a = [1.0, 1.2, 0.8, 1.1, 0.9];
        let b = [1.5, 1.7, 1.3, 1.6, 1.4];

        let narrow = WelchInterval::new(0.90).difference_ci(&a, &b);
        let wide = WelchInterval::new(0.99).difference_ci(&a, &b);
        assert!(wide.width() > narrow.width());
    }

    #[test]
    #[should_panic(expected = "confidence_level must be between 0 and 1")]
    fn test_invalid_confidence_level() {
        WelchInterval::new(1.5);
    }

    #[test]
    fn test_welch_satterthwaite_bounds() {
        // Equal variances and counts give df close to n1 + n2 - 2.
        let df = WelchInterval::welch_satterthwaite_df(1.0, 10, 1.0, 10);
        assert!((df - 18.0).abs() < 1e-9);

        // Zero variances fall back to min(n) - 1.
        let df = WelchInterval::welch_satterthwaite_df(0.0, 10, 0.0, 5);
        assert_eq!(df, 4.0);
    }
}
