//! HTTP Analysis Client - Implementation of AnalysisService over reqwest.
//!
//! # Configuration
//!
//! ```ignore
//! let config = ClientConfig::default().with_base_url("http://localhost:8000");
//! let client = HttpAnalysisClient::new(&config)?;
//! ```
//!
//! # Streaming
//!
//! `POST /api/v1/analyze/stream` answers with a chunked body of
//! `data: <json>` lines. The body is returned unparsed as a byte stream;
//! dropping the stream releases the connection.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};

use crate::config::ClientConfig;
use crate::domain::analysis::{AnalysisError, ByteStream, MultipartBody, PartValue};
use crate::ports::{AnalysisService, HealthReport};

/// Path of the streaming analysis endpoint.
pub const ANALYZE_STREAM_PATH: &str = "/api/v1/analyze/stream";

/// Path of the health endpoint.
pub const HEALTH_PATH: &str = "/health";

/// Upper bound on error-body bytes kept as detail.
const ERROR_DETAIL_LIMIT: usize = 4 * 1024;

/// How long a rejected response may take to deliver its detail.
const ERROR_DETAIL_WAIT: Duration = Duration::from_millis(500);

/// Analysis service client over HTTP.
#[derive(Debug, Clone)]
pub struct HttpAnalysisClient {
    base_url: String,
    client: Client,
}

impl HttpAnalysisClient {
    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// - `Transport` if the underlying HTTP client cannot be built
    pub fn new(config: &ClientConfig) -> Result<Self, AnalysisError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| AnalysisError::transport(None, format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url().to_string(),
            client,
        })
    }

    /// Returns the service root this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Converts the domain body to a reqwest form, keeping part order.
    fn to_form(body: MultipartBody) -> Result<Form, AnalysisError> {
        let mut form = Form::new();
        for part in body.into_parts() {
            form = match part.value {
                PartValue::Text(text) => form.text(part.name, text),
                PartValue::File {
                    bytes,
                    filename,
                    mime_type,
                } => {
                    let file = Part::bytes(bytes.to_vec())
                        .file_name(filename)
                        .mime_str(&mime_type)
                        .map_err(|e| {
                            AnalysisError::transport(None, format!("Invalid MIME type {}: {}", mime_type, e))
                        })?;
                    form.part(part.name, file)
                }
            };
        }
        Ok(form)
    }

    /// Maps reqwest send failures to transport errors.
    fn send_error(e: reqwest::Error) -> AnalysisError {
        if e.is_timeout() {
            AnalysisError::transport(None, format!("Request timed out: {}", e))
        } else if e.is_connect() {
            AnalysisError::transport(None, format!("Connection failed: {}", e))
        } else {
            AnalysisError::transport(e.status().map(|s| s.as_u16()), e.to_string())
        }
    }

    /// Rejects non-2xx responses, keeping a bounded prefix of the body as
    /// detail. A body that never finishes does not hold up the failure.
    async fn handle_response_status(response: Response) -> Result<Response, AnalysisError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let error_body = Self::read_error_detail(response).await;
        tracing::warn!(status = status.as_u16(), body = %error_body, "Analysis service rejected request");

        Err(AnalysisError::transport(Some(status.as_u16()), error_body))
    }

    async fn read_error_detail(mut response: Response) -> String {
        let mut detail: Vec<u8> = Vec::new();

        let read = async {
            while detail.len() < ERROR_DETAIL_LIMIT {
                match response.chunk().await {
                    Ok(Some(chunk)) => detail.extend_from_slice(&chunk),
                    Ok(None) | Err(_) => break,
                }
            }
        };
        if tokio::time::timeout(ERROR_DETAIL_WAIT, read).await.is_err() {
            tracing::debug!("Error body still open; using partial detail");
        }

        detail.truncate(ERROR_DETAIL_LIMIT);
        String::from_utf8_lossy(&detail).trim().to_string()
    }
}

#[async_trait]
impl AnalysisService for HttpAnalysisClient {
    async fn analyze_stream(&self, body: MultipartBody) -> Result<ByteStream, AnalysisError> {
        let form = Self::to_form(body)?;

        tracing::debug!(url = %self.url(ANALYZE_STREAM_PATH), "Submitting analysis request");

        let response = self
            .client
            .post(self.url(ANALYZE_STREAM_PATH))
            .multipart(form)
            .send()
            .await
            .map_err(Self::send_error)?;
        let response = Self::handle_response_status(response).await?;

        let bytes = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| AnalysisError::stream_read(e.to_string())));

        Ok(Box::pin(bytes))
    }

    async fn health(&self) -> Result<HealthReport, AnalysisError> {
        let response = self
            .client
            .get(self.url(HEALTH_PATH))
            .send()
            .await
            .map_err(Self::send_error)?;
        let response = Self::handle_response_status(response).await?;

        response
            .json::<HealthReport>()
            .await
            .map_err(|e| AnalysisError::transport(None, format!("Invalid health response: {}", e)))
    }
}
