//! Horizon thresholds and the resolution check against them.
//!
//! A horizon is a user-chosen threshold of practical significance, either
//! absolute milliseconds (`"10ms"`) or a fraction of the reference mean
//! (`"1%"`). Sampling continues until every comparison's confidence
//! interval lies entirely on one side of every configured horizon.

use std::fmt;

use thiserror::Error;

use crate::stats::ConfidenceInterval;

/// Horizon string that does not match `[+-]?(\d*\.)?\d+(ms|%)`.
#[derive(Debug, Error)]
pub enum HorizonError {
    #[error("invalid horizon {0:?} (expected e.g. \"10ms\", \"+1%\", \"-0.5ms\")")]
    InvalidFormat(String),
}

/// The parsed horizon thresholds, split by unit.
///
/// Both arrays are ascending and duplicate-free. An empty array imposes no
/// constraint for its unit.
#[derive(Debug, Clone, PartialEq)]
pub struct HorizonSet {
    /// Absolute thresholds in milliseconds.
    pub absolute: Vec<f64>,
    /// Relative thresholds as fractions of the reference mean.
    pub relative: Vec<f64>,
}

impl Default for HorizonSet {
    /// The default goal: resolve whether the difference is distinguishable
    /// from zero, i.e. the set `{0%}`.
    fn default() -> Self {
        Self {
            absolute: Vec::new(),
            relative: vec![0.0],
        }
    }
}

impl HorizonSet {
    /// A set with no thresholds at all; every comparison is vacuously
    /// resolved against it.
    pub fn empty() -> Self {
        Self {
            absolute: Vec::new(),
            relative: Vec::new(),
        }
    }

    /// Parse user-supplied horizon tokens.
    ///
    /// Each token is a signed or unsigned decimal with an `ms` or `%`
    /// suffix. An explicit `+`/`-` sign (or an exact zero) inserts only
    /// that value; a bare magnitude inserts both the positive and negative
    /// value, expressing "a difference at least this large in either
    /// direction".
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Result<Self, HorizonError> {
        let mut absolute = Vec::new();
        let mut relative = Vec::new();

        for token in tokens {
            let token = token.as_ref();
            let (magnitude, unit, explicit_sign) = parse_token(token)?;

            let bucket = match unit {
                Unit::Absolute => &mut absolute,
                Unit::Relative => &mut relative,
            };

            if explicit_sign || magnitude == 0.0 {
                // Normalize -0 to 0; zero is kept as itself, not expanded.
                bucket.push(if magnitude == 0.0 { 0.0 } else { magnitude });
            } else {
                bucket.push(-magnitude);
                bucket.push(magnitude);
            }
        }

        sort_dedup(&mut absolute);
        sort_dedup(&mut relative);

        Ok(Self { absolute, relative })
    }

    /// Whether both interval views clear every configured horizon.
    ///
    /// An interval clears a horizon `h` when it does not straddle it:
    /// `low > h` or `high < h`. Touching a horizon does not clear it.
    pub fn resolves(&self, absolute: ConfidenceInterval, relative: ConfidenceInterval) -> bool {
        self.absolute.iter().all(|&h| clears(absolute, h))
            && self.relative.iter().all(|&h| clears(relative, h))
    }

    /// Whether no thresholds are configured in either unit.
    pub fn is_empty(&self) -> bool {
        self.absolute.is_empty() && self.relative.is_empty()
    }

    /// The configured thresholds as display tokens, absolute first.
    pub fn tokens(&self) -> Vec<String> {
        self.absolute
            .iter()
            .map(|&ms| absolute_token(ms))
            .chain(self.relative.iter().map(|&f| relative_token(f)))
            .collect()
    }
}

impl fmt::Display for HorizonSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tokens().join(", "))
    }
}

/// True when `ci` lies entirely on one side of `h`.
fn clears(ci: ConfidenceInterval, h: f64) -> bool {
    ci.low > h || ci.high < h
}

/// Format an absolute horizon back to its token form.
///
/// Nonzero values keep their sign so that re-parsing yields the same
/// single signed value.
pub fn absolute_token(ms: f64) -> String {
    if ms == 0.0 {
        "0ms".to_string()
    } else {
        format!("{:+}ms", ms)
    }
}

/// Format a relative horizon (a fraction) back to its percent token form.
pub fn relative_token(fraction: f64) -> String {
    if fraction == 0.0 {
        "0%".to_string()
    } else {
        format!("{:+}%", fraction * 100.0)
    }
}

enum Unit {
    Absolute,
    Relative,
}

/// Split a token into magnitude, unit and whether a sign was written.
fn parse_token(token: &str) -> Result<(f64, Unit, bool), HorizonError> {
    let invalid = || HorizonError::InvalidFormat(token.to_string());

    let (number, unit) = if let Some(number) = token.strip_suffix("ms") {
        (number, Unit::Absolute)
    } else if let Some(number) = token.strip_suffix('%') {
        (number, Unit::Relative)
    } else {
        return Err(invalid());
    };

    let (digits, explicit_sign) = match number.strip_prefix(['+', '-']) {
        Some(rest) => (rest, true),
        None => (number, false),
    };

    if !is_plain_decimal(digits) {
        return Err(invalid());
    }

    let mut magnitude: f64 = number.parse().map_err(|_| invalid())?;
    if matches!(unit, Unit::Relative) {
        magnitude /= 100.0;
    }

    Ok((magnitude, unit, explicit_sign))
}

/// Accepts `(\d*\.)?\d+`: ASCII digits with at most one interior dot and at
/// least one digit after it. Rejects exponents, `inf`, `nan` and a
/// trailing dot, which `f64::from_str` would otherwise accept.
fn is_plain_decimal(s: &str) -> bool {
    let mut seen_digit = false;
    let mut seen_dot = false;
    for c in s.chars() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => return false,
        }
    }
    seen_digit && s.ends_with(|c: char| c.is_ascii_digit())
}

fn sort_dedup(values: &mut Vec<f64>) {
    values.sort_by(|a, b| a.total_cmp(b));
    values.dedup();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(tokens: &[&str]) -> HorizonSet {
        HorizonSet::parse(tokens).unwrap()
    }

    #[test]
    fn test_bare_magnitude_expands_both_signs() {
        let set = parse(&["1ms"]);
        assert_eq!(set.absolute, vec![-1.0, 1.0]);
        assert!(set.relative.is_empty());
    }

    #[test]
    fn test_explicit_sign_kept_alone() {
        assert_eq!(parse(&["+1ms"]).absolute, vec![1.0]);
        assert_eq!(parse(&["-1ms"]).absolute, vec![-1.0]);
    }

    #[test]
    fn test_zero_not_expanded() {
        assert_eq!(parse(&["0ms"]).absolute, vec![0.0]);
        assert_eq!(parse(&["0%"]).relative, vec![0.0]);
        // Signed zero normalizes to plain zero.
        assert_eq!(parse(&["-0ms"]).absolute, vec![0.0]);
    }

    #[test]
    fn test_percent_divides_by_hundred() {
        let set = parse(&["+1%", "-10%"]);
        assert_eq!(set.relative, vec![-0.1, 0.01]);
        assert!(set.absolute.is_empty());
    }

    #[test]
    fn test_sorted_and_deduped() {
        let set = parse(&["5ms", "+5ms", "1ms", "+1%", "1%"]);
        assert_eq!(set.absolute, vec![-5.0, -1.0, 1.0, 5.0]);
        assert_eq!(set.relative, vec![-0.01, 0.01]);
    }

    #[test]
    fn test_fractional_magnitudes() {
        assert_eq!(parse(&["+0.5ms"]).absolute, vec![0.5]);
        assert_eq!(parse(&["+.5ms"]).absolute, vec![0.5]);
    }

    #[test]
    fn test_invalid_tokens_rejected() {
        for token in ["1", "ms", "%", "1m", "1 ms", "1.ms", "1.2.3ms", "1e3ms", "infms", "+-1ms", "--1ms", "emu", ""] {
            assert!(
                HorizonSet::parse(&[token]).is_err(),
                "expected {:?} to be rejected",
                token
            );
        }
    }

    #[test]
    fn test_default_is_zero_percent() {
        let set = HorizonSet::default();
        assert!(set.absolute.is_empty());
        assert_eq!(set.relative, vec![0.0]);
    }

    #[test]
    fn test_token_round_trip() {
        let set = parse(&["+1ms", "-2.5ms", "0ms", "+10%", "0%"]);
        let reparsed = HorizonSet::parse(&set.tokens()).unwrap();
        assert_eq!(reparsed, set);
    }

    #[test]
    fn test_resolves_against_cleared_horizons() {
        let set = parse(&["0%"]);
        let above = ConfidenceInterval { low: 0.1, high: 0.3 };
        let below = ConfidenceInterval { low: -0.3, high: -0.1 };
        let abs = ConfidenceInterval { low: 1.0, high: 2.0 };

        assert!(set.resolves(abs, above));
        assert!(set.resolves(abs, below));
    }

    #[test]
    fn test_straddling_is_unresolved() {
        let set = parse(&["0%"]);
        let straddles = ConfidenceInterval { low: -0.1, high: 0.1 };
        let abs = ConfidenceInterval { low: -1.0, high: 1.0 };
        assert!(!set.resolves(abs, straddles));
    }

    #[test]
    fn test_touching_a_horizon_is_unresolved() {
        let set = parse(&["0%"]);
        let abs = ConfidenceInterval { low: 1.0, high: 2.0 };
        let touches_low = ConfidenceInterval { low: 0.0, high: 0.2 };
        let touches_high = ConfidenceInterval { low: -0.2, high: 0.0 };
        assert!(!set.resolves(abs, touches_low));
        assert!(!set.resolves(abs, touches_high));
    }

    #[test]
    fn test_every_horizon_must_clear() {
        // Clears +1ms and -1ms but straddles +5ms.
        let set = parse(&["1ms", "+5ms"]);
        let rel = ConfidenceInterval { low: 0.02, high: 0.03 };
        let abs = ConfidenceInterval { low: 2.0, high: 6.0 };
        assert!(!set.resolves(abs, rel));

        let cleared = ConfidenceInterval { low: 2.0, high: 4.0 };
        assert!(set.resolves(cleared, rel));
    }

    #[test]
    fn test_empty_set_is_vacuously_resolved() {
        let set = HorizonSet::empty();
        let wide = ConfidenceInterval { low: -100.0, high: 100.0 };
        assert!(set.resolves(wide, wide));
    }

    #[test]
    fn test_zero_width_interval_resolves_off_horizon() {
        let set = parse(&["0%"]);
        let point = ConfidenceInterval::point(0.05);
        let abs = ConfidenceInterval::point(1.0);
        assert!(set.resolves(abs, point));
        // But a point exactly on the horizon straddles it.
        assert!(!set.resolves(abs, ConfidenceInterval::point(0.0)));
    }

    #[test]
    fn test_display_joins_tokens() {
        let set = parse(&["0%", "+2ms"]);
        assert_eq!(set.to_string(), "+2ms, 0%");
    }
}
