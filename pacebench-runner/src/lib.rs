//! Measurement runner service for pacebench
//!
//! The runner is the collaborator that actually loads a variant's page and
//! reports one timing sample. This crate exposes that work over HTTP so the
//! pacebench scheduler can request samples on demand. What "loading the
//! page" means is pluggable: a measurement function is registered per
//! variant name, which is where a real browser driver would hook in.

mod server;

pub use server::{run_runner, run_runner_async};

use std::collections::HashMap;

use pacebench_core::protocol::Measurement;
use pacebench_core::variant::Variant;

/// A measurement function that can be run on demand.
///
/// The function should load the variant's page exactly once and return the
/// measured duration and bytes transferred, or a message describing why
/// the measurement failed.
pub type MeasureFn = Box<dyn Fn(&Variant) -> Result<Measurement, String> + Send + Sync>;

/// Registry of measurement functions, keyed by variant name.
pub struct MeasureRegistry {
    measurers: HashMap<String, MeasureFn>,
}

impl MeasureRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            measurers: HashMap::new(),
        }
    }

    /// Register a measurement function for the given variant name.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let mut registry = MeasureRegistry::new();
    /// registry.register("http://localhost:8080/", |variant| {
    ///     let start = std::time::Instant::now();
    ///     // ... drive a browser to load variant's page ...
    ///     Ok(Measurement {
    ///         millis: start.elapsed().as_secs_f64() * 1000.0,
    ///         bytes_sent: 0,
    ///     })
    /// });
    /// ```
    pub fn register<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&Variant) -> Result<Measurement, String> + Send + Sync + 'static,
    {
        self.measurers.insert(name.into(), Box::new(f));
    }

    /// List all registered variant names.
    pub fn list(&self) -> Vec<String> {
        self.measurers.keys().cloned().collect()
    }

    /// Run the measurement for a variant.
    ///
    /// Returns `None` if no measurer is registered for the variant's name.
    pub fn measure(&self, variant: &Variant) -> Option<Result<Measurement, String>> {
        self.measurers.get(&variant.name).map(|f| f(variant))
    }

    /// Check if a measurer is registered for the given name.
    pub fn contains(&self, name: &str) -> bool {
        self.measurers.contains_key(name)
    }

    /// Get the number of registered measurers.
    pub fn len(&self) -> usize {
        self.measurers.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.measurers.is_empty()
    }
}

impl Default for MeasureRegistry {
    fn default() -> Self {
        Self::new()
    }
}
