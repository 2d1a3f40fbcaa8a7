//! Client for the external measurement runner.
//!
//! The runner is the only collaborator that performs real I/O: it loads a
//! variant's page and reports one timing sample. This module manages the
//! runner process lifecycle and speaks its HTTP protocol; the scheduler
//! sees it through the [`SampleSource`] seam.

use std::future::Future;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use thiserror::Error;
use tokio::time::sleep;

use pacebench_core::protocol::{
    CollectSampleRequest, CollectSampleResponse, HealthResponse, Measurement, ShutdownResponse,
};
use pacebench_core::variant::Variant;

use crate::scheduler::SampleSource;

/// Errors that can occur talking to the runner.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Failed to spawn a runner process.
    #[error("Failed to spawn runner: {0}")]
    SpawnError(String),

    /// Runner did not become ready within the timeout period.
    #[error("Runner at {url} not ready after {timeout_secs}s timeout. Last error: {last_error}")]
    TimeoutError {
        url: String,
        timeout_secs: u64,
        last_error: String,
    },

    /// HTTP request to the runner failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The runner reported a measurement failure.
    #[error("Runner error: {0}")]
    RunnerError(String),

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Handle to a running measurement runner (spawned by us or remote).
pub struct RunnerHandle {
    /// The child process (None for remote runners).
    process: Option<Child>,
    /// Base URL for the runner.
    base_url: String,
    /// HTTP client for communication.
    client: reqwest::Client,
    /// Whether this is a managed process (spawned by us) or remote.
    is_managed: bool,
}

impl RunnerHandle {
    /// Spawn a new runner process listening on `port`.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned.
    pub fn spawn(binary: &Path, port: u16) -> Result<Self, RunnerError> {
        let process = Command::new(binary)
            .env("PB_PORT", port.to_string())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                RunnerError::SpawnError(format!("Failed to spawn {}: {}", binary.display(), e))
            })?;

        Ok(Self {
            process: Some(process),
            base_url: format!("http://127.0.0.1:{}", port),
            client: build_client()?,
            is_managed: true,
        })
    }

    /// Connect to an already-running runner at the given URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the client cannot be
    /// created.
    pub fn connect(url: &str) -> Result<Self, RunnerError> {
        // Validate URL format
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(RunnerError::InvalidUrl(format!(
                "URL must start with http:// or https://: {}",
                url
            )));
        }

        // Remove trailing slash if present
        let base_url = url.trim_end_matches('/').to_string();

        Ok(Self {
            process: None,
            base_url,
            client: build_client()?,
            is_managed: false,
        })
    }

    /// Get the base URL for this runner.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check if the runner is healthy.
    ///
    /// # Errors
    ///
    /// Returns an error if the health check fails.
    pub async fn health_check(&self) -> Result<HealthResponse, RunnerError> {
        let url = format!("{}/health", self.base_url());
        let response: HealthResponse = self.client.get(&url).send().await?.json().await?;

        if response.status == "healthy" {
            Ok(response)
        } else {
            Err(RunnerError::RunnerError(format!(
                "Unhealthy status: {}",
                response.status
            )))
        }
    }

    /// Collect a single timing sample for a variant.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the runner reported a
    /// measurement failure.
    pub async fn collect_sample(&self, variant: &Variant) -> Result<Measurement, RunnerError> {
        let url = format!("{}/collect", self.base_url());
        let request = CollectSampleRequest::new(variant.clone());

        let response: CollectSampleResponse = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await?
            .json()
            .await?;

        if response.success {
            Ok(response.measurement())
        } else {
            Err(RunnerError::RunnerError(
                response
                    .error
                    .unwrap_or_else(|| "Unknown error".to_string()),
            ))
        }
    }

    /// Request the runner to shut down gracefully.
    ///
    /// # Errors
    ///
    /// Returns an error if the shutdown request fails.
    pub async fn shutdown(&self) -> Result<(), RunnerError> {
        let url = format!("{}/shutdown", self.base_url());
        let _response: ShutdownResponse = self.client.post(&url).send().await?.json().await?;
        Ok(())
    }

    /// Kill the runner process forcefully (only for managed processes).
    pub fn kill(&mut self) {
        if let Some(ref mut process) = self.process {
            let _ = process.kill();
        }
    }

    /// Get the process ID of the runner (only for managed processes).
    pub fn pid(&self) -> Option<u32> {
        self.process.as_ref().map(|p| p.id())
    }

    /// Check if this is a managed (spawned) runner.
    pub fn is_managed(&self) -> bool {
        self.is_managed
    }
}

impl Drop for RunnerHandle {
    fn drop(&mut self) {
        // Only kill managed processes
        if self.is_managed {
            self.kill();
        }
    }
}

impl SampleSource for RunnerHandle {
    type Error = RunnerError;

    fn collect_once(
        &self,
        variant: &Variant,
    ) -> impl Future<Output = Result<Measurement, RunnerError>> + Send {
        self.collect_sample(variant)
    }
}

fn build_client() -> Result<reqwest::Client, RunnerError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| RunnerError::SpawnError(format!("Failed to create HTTP client: {}", e)))
}

/// Wait for a runner to become healthy, with retries.
pub async fn wait_for_ready(runner: &RunnerHandle, timeout: Duration) -> Result<(), RunnerError> {
    let start = std::time::Instant::now();
    let retry_interval = Duration::from_millis(100);
    let mut last_error: Option<RunnerError> = None;

    loop {
        match runner.health_check().await {
            Ok(_) => return Ok(()),
            Err(e) if start.elapsed() < timeout => {
                last_error = Some(e);
                sleep(retry_interval).await;
            }
            Err(e) => {
                let error_msg = last_error
                    .map(|le| le.to_string())
                    .unwrap_or_else(|| e.to_string());
                return Err(RunnerError::TimeoutError {
                    url: runner.base_url().to_string(),
                    timeout_secs: timeout.as_secs(),
                    last_error: error_msg,
                });
            }
        }
    }
}
