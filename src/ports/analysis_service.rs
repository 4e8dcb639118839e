//! Analysis Service Port - Interface to the remote ad analysis service.
//!
//! The service accepts a multipart request and answers with a long-lived
//! streamed body of `data: <json>` lines. The port hands the raw body back
//! as a [`ByteStream`]; decoding and routing happen in the domain layer so
//! every adapter gets identical framing behavior.
//!
//! # Example
//!
//! ```ignore
//! let body = MultipartBody::build(&request)?;
//! let bytes = service.analyze_stream(body).await?;
//! let mut lines = decode_lines(bytes);
//! while let Some(line) = lines.next().await { /* route */ }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::analysis::{AnalysisError, ByteStream, MultipartBody};

/// Port for the streaming analysis service.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// Submits an analysis request and returns the response body as it streams.
    ///
    /// # Errors
    ///
    /// - `Transport` if the service is unreachable or answers with a non-2xx status
    async fn analyze_stream(&self, body: MultipartBody) -> Result<ByteStream, AnalysisError>;

    /// Fetches the service health report.
    async fn health(&self) -> Result<HealthReport, AnalysisError>;
}

/// Overall or per-dependency health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    /// Returns true if the service can take requests.
    pub fn is_available(&self) -> bool {
        !matches!(self, HealthStatus::Unhealthy)
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Unhealthy => "unhealthy",
        };
        write!(f, "{}", s)
    }
}

/// Body of the service's `GET /health` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    /// Server-local ISO-8601 timestamp, passed through as sent.
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Status of each upstream dependency, keyed by name.
    #[serde(default)]
    pub services: HashMap<String, HealthStatus>,
    /// Present when the health check itself failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthReport {
    /// Creates a healthy report with no dependencies listed.
    pub fn healthy() -> Self {
        Self {
            status: HealthStatus::Healthy,
            timestamp: None,
            services: HashMap::new(),
            error: None,
        }
    }

    /// Adds a dependency status.
    pub fn with_service(mut self, name: impl Into<String>, status: HealthStatus) -> Self {
        self.services.insert(name.into(), status);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_service_health_body() {
        let json = r#"{
            "status": "degraded",
            "timestamp": "2024-05-01T12:00:00.123456",
            "services": {"gemini": "unhealthy"}
        }"#;

        let report: HealthReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.status, HealthStatus::Degraded);
        assert_eq!(report.services["gemini"], HealthStatus::Unhealthy);
        assert!(report.status.is_available());
        assert_eq!(report.error, None);
    }

    #[test]
    fn parses_failed_health_body() {
        let json = r#"{"status": "unhealthy", "error": "boom"}"#;

        let report: HealthReport = serde_json::from_str(json).unwrap();
        assert!(!report.status.is_available());
        assert!(report.services.is_empty());
        assert_eq!(report.error.as_deref(), Some("boom"));
    }

    #[test]
    fn status_display_is_lowercase() {
        assert_eq!(HealthStatus::Healthy.to_string(), "healthy");
    }
}
