//! Analysis service client configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::domain::analysis::DEFAULT_MAX_AD_FILE_BYTES;

const MAX_TIMEOUT_SECS: u64 = 3600;

/// Connection settings for the analysis service
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    /// Service root, e.g. `http://localhost:8000`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Whole-request timeout in seconds, including the streamed body
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Connection establishment timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Largest ad image accepted before upload
    #[serde(default = "default_max_ad_file_bytes")]
    pub max_ad_file_bytes: u64,
}

impl ClientConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get connect timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Validate client configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(ValidationError::MissingRequired("ADS_RATER__CLIENT__BASE_URL"));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ValidationError::InvalidBaseUrl(url.to_string()));
        }

        for (field, value) in [
            ("timeout_secs", self.timeout_secs),
            ("connect_timeout_secs", self.connect_timeout_secs),
        ] {
            if value == 0 || value > MAX_TIMEOUT_SECS {
                return Err(ValidationError::InvalidTimeout { field, value });
            }
        }

        if self.max_ad_file_bytes == 0 {
            return Err(ValidationError::InvalidFileLimit);
        }

        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            max_ad_file_bytes: default_max_ad_file_bytes(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout() -> u64 {
    900
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_max_ad_file_bytes() -> u64 {
    DEFAULT_MAX_AD_FILE_BYTES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.timeout_secs, 900);
        assert_eq!(config.connect_timeout_secs, 10);
        assert_eq!(config.max_ad_file_bytes, 10 * 1024 * 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_timeout_duration() {
        let config = ClientConfig {
            timeout_secs: 60,
            ..Default::default()
        };
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let config = ClientConfig::default().with_base_url("https://rater.example.com/");
        assert_eq!(config.base_url(), "https://rater.example.com");
    }

    #[test]
    fn test_validation_rejects_non_http_url() {
        let config = ClientConfig::default().with_base_url("ftp://rater.example.com");
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidBaseUrl("ftp://rater.example.com".to_string()))
        );
    }

    #[test]
    fn test_validation_rejects_empty_url() {
        let config = ClientConfig::default().with_base_url("  ");
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingRequired(_))
        ));
    }

    #[test]
    fn test_validation_rejects_zero_timeout() {
        let config = ClientConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidTimeout {
                field: "timeout_secs",
                value: 0
            })
        );
    }

    #[test]
    fn test_validation_rejects_excessive_connect_timeout() {
        let config = ClientConfig {
            connect_timeout_secs: 3601,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_file_limit() {
        let config = ClientConfig {
            max_ad_file_bytes: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidFileLimit));
    }
}
