//! Benchmark targets.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What the runner measures when it loads a variant's page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MeasurementKind {
    /// Time from navigation start to the load event.
    #[default]
    PageLoad,
    /// Time to first contentful paint.
    FirstContentfulPaint,
    /// Time reported by the page itself through the runner callback.
    Callback,
}

impl MeasurementKind {
    /// Short label used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementKind::PageLoad => "page-load",
            MeasurementKind::FirstContentfulPaint => "fcp",
            MeasurementKind::Callback => "callback",
        }
    }
}

/// One distinct thing being benchmarked: a page, pinned to a package
/// version, loaded in a specific browser.
///
/// Variants are constructed once from configuration and never mutated.
/// Identity is positional (the index in the configured list); the fields
/// here exist for display and for the runner request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Display name, typically the page URL or a user-chosen label.
    pub name: String,
    /// Implementation under test (e.g. a package name).
    #[serde(default)]
    pub implementation: String,
    /// Version label for the implementation.
    #[serde(default)]
    pub version: String,
    /// Browser identity the runner should load the page in.
    #[serde(default = "Variant::default_browser")]
    pub browser: String,
    /// Query string appended to the page URL by the runner.
    #[serde(default)]
    pub query_string: String,
    /// What the runner measures for this variant.
    #[serde(default)]
    pub kind: MeasurementKind,
}

impl Variant {
    fn default_browser() -> String {
        "chrome".to_string()
    }

    /// Create a variant with default browser, empty labels and page-load
    /// measurement.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            implementation: String::new(),
            version: String::new(),
            browser: Self::default_browser(),
            query_string: String::new(),
            kind: MeasurementKind::default(),
        }
    }

    /// Human-readable label combining the distinguishing fields.
    pub fn label(&self) -> String {
        let mut label = self.name.clone();
        if !self.version.is_empty() {
            label.push_str(&format!(" @{}", self.version));
        }
        if !self.browser.is_empty() {
            label.push_str(&format!(" [{}]", self.browser));
        }
        label
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
