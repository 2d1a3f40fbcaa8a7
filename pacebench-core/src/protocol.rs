use serde::{Deserialize, Serialize};

use crate::variant::Variant;

/// One measured page load, as reported by the runner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Measured duration in milliseconds.
    pub millis: f64,
    /// Bytes transferred loading the page.
    pub bytes_sent: u64,
}

/// Health check response from the runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    /// Create a healthy response.
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

/// Request to collect a single timing sample for a variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectSampleRequest {
    pub variant: Variant,
}

impl CollectSampleRequest {
    /// Create a new collect request.
    pub fn new(variant: Variant) -> Self {
        Self { variant }
    }
}

/// Response from collecting a single sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectSampleResponse {
    /// Measured duration in milliseconds.
    pub millis: f64,
    /// Bytes transferred loading the page.
    pub bytes_sent: u64,
    /// Whether the measurement completed successfully.
    pub success: bool,
    /// Error message if the measurement failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CollectSampleResponse {
    /// Create a successful sample response.
    pub fn success(measurement: Measurement) -> Self {
        Self {
            millis: measurement.millis,
            bytes_sent: measurement.bytes_sent,
            success: true,
            error: None,
        }
    }

    /// Create a failed sample response.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            millis: 0.0,
            bytes_sent: 0,
            success: false,
            error: Some(error.into()),
        }
    }

    /// The measurement carried by a successful response.
    pub fn measurement(&self) -> Measurement {
        Measurement {
            millis: self.millis,
            bytes_sent: self.bytes_sent,
        }
    }
}

/// Response to a shutdown request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShutdownResponse {
    pub status: String,
}

impl ShutdownResponse {
    /// Create a shutdown acknowledgment response.
    pub fn acknowledged() -> Self {
        Self {
            status: "shutting_down".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_healthy() {
        let response = HealthResponse::healthy();
        assert_eq!(response.status, "healthy");
    }

    #[test]
    fn test_collect_request_carries_variant() {
        let request = CollectSampleRequest::new(Variant::named("mypage"));
        assert_eq!(request.variant.name, "mypage");
    }

    #[test]
    fn test_collect_response_success() {
        let measurement = Measurement {
            millis: 12.5,
            bytes_sent: 4096,
        };
        let response = CollectSampleResponse::success(measurement);

        assert!(response.success);
        assert_eq!(response.millis, 12.5);
        assert_eq!(response.bytes_sent, 4096);
        assert!(response.error.is_none());
        assert_eq!(response.measurement(), measurement);
    }

    #[test]
    fn test_collect_response_failure() {
        let response = CollectSampleResponse::failure("browser crashed");

        assert!(!response.success);
        assert_eq!(response.millis, 0.0);
        assert_eq!(response.error, Some("browser crashed".to_string()));
    }

    #[test]
    fn test_shutdown_response() {
        let response = ShutdownResponse::acknowledged();
        assert_eq!(response.status, "shutting_down");
    }

    #[test]
    fn test_serialization_roundtrip() {
        let response = CollectSampleResponse::success(Measurement {
            millis: 3.25,
            bytes_sent: 100,
        });
        let json = serde_json::to_string(&response).unwrap();
        let deserialized: CollectSampleResponse = serde_json::from_str(&json).unwrap();

        assert_eq!(response.millis, deserialized.millis);
        assert_eq!(response.bytes_sent, deserialized.bytes_sent);
        assert_eq!(response.success, deserialized.success);
        assert_eq!(response.error, deserialized.error);
    }

    #[test]
    fn test_error_field_skipped_when_none() {
        let response = CollectSampleResponse::success(Measurement {
            millis: 1.0,
            bytes_sent: 1,
        });
        let json = serde_json::to_string(&response).unwrap();

        // The error field should not be present in the JSON
        assert!(!json.contains("error"));
    }
}
