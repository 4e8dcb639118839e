//! Mock Analysis Service for testing.
//!
//! Plays back scripted response bodies so controller tests run without a
//! network.
//!
//! # Features
//!
//! - Scripted chunk sequences (split anywhere, including inside a character)
//! - Failures before streaming (HTTP status, unreachable service)
//! - Read failures mid-stream
//! - Bodies that never end, for cancellation tests
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let service = MockAnalysisService::new()
//!     .with_lines(&[
//!         r#"data: {"type":"log","data":"step 1"}"#,
//!         r#"data: {"type":"result","data":"Score: 8/10"}"#,
//!     ]);
//!
//! let bytes = service.analyze_stream(body).await?;
//! ```

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::analysis::{AnalysisError, ByteStream, MultipartBody};
use crate::ports::{AnalysisService, HealthReport};

/// Mock analysis service for testing.
#[derive(Debug, Clone)]
pub struct MockAnalysisService {
    /// Scripted responses (consumed in order).
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    /// Report returned by `health`.
    health: HealthReport,
    /// Delay before each chunk.
    chunk_delay: Duration,
    /// Submitted bodies, in call order.
    calls: Arc<Mutex<Vec<MultipartBody>>>,
}

/// A scripted response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Stream these chunks.
    Stream {
        chunks: Vec<Bytes>,
        /// Fail the read after the chunks instead of ending cleanly.
        read_error: Option<String>,
        /// Keep the body open forever after the chunks.
        stay_open: bool,
    },
    /// Fail before any byte is streamed.
    Failure(MockFailure),
}

/// Failures raised before streaming starts.
#[derive(Debug, Clone)]
pub enum MockFailure {
    /// Non-2xx HTTP status.
    Status { status: u16, message: String },
    /// Service unreachable.
    Unreachable { message: String },
}

impl From<MockFailure> for AnalysisError {
    fn from(failure: MockFailure) -> Self {
        match failure {
            MockFailure::Status { status, message } => AnalysisError::transport(Some(status), message),
            MockFailure::Unreachable { message } => AnalysisError::transport(None, message),
        }
    }
}

impl Default for MockAnalysisService {
    fn default() -> Self {
        Self::new()
    }
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockAnalysisService {
    /// Creates a mock with no scripted responses.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            health: HealthReport::healthy(),
            chunk_delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queues a body made of these raw chunks.
    pub fn with_chunks<I, B>(self, chunks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        self.with_response(MockResponse::Stream {
            chunks: chunks.into_iter().map(Into::into).collect(),
            read_error: None,
            stay_open: false,
        })
    }

    /// Queues a body with one newline-terminated line per chunk.
    pub fn with_lines<L: AsRef<str>>(self, lines: &[L]) -> Self {
        self.with_chunks(lines.iter().map(|line| format!("{}\n", line.as_ref())))
    }

    /// Queues a body that fails to read after the given chunks.
    pub fn with_read_error_after<I, B>(self, chunks: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        self.with_response(MockResponse::Stream {
            chunks: chunks.into_iter().map(Into::into).collect(),
            read_error: Some(message.into()),
            stay_open: false,
        })
    }

    /// Queues a body that stays open after the given chunks.
    pub fn with_pending_after<I, B>(self, chunks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        self.with_response(MockResponse::Stream {
            chunks: chunks.into_iter().map(Into::into).collect(),
            read_error: None,
            stay_open: true,
        })
    }

    /// Queues a failure before streaming.
    pub fn with_failure(self, failure: MockFailure) -> Self {
        self.with_response(MockResponse::Failure(failure))
    }

    /// Queues any scripted response.
    pub fn with_response(self, response: MockResponse) -> Self {
        locked(&self.responses).push_back(response);
        self
    }

    /// Sets the report returned by `health`.
    pub fn with_health(mut self, report: HealthReport) -> Self {
        self.health = report;
        self
    }

    /// Sets a delay before each chunk.
    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = delay;
        self
    }

    /// Returns the number of analysis calls made.
    pub fn call_count(&self) -> usize {
        locked(&self.calls).len()
    }

    /// Returns all submitted bodies.
    pub fn get_calls(&self) -> Vec<MultipartBody> {
        locked(&self.calls).clone()
    }

    /// Gets the next response or a minimal successful one.
    fn next_response(&self) -> MockResponse {
        locked(&self.responses)
            .pop_front()
            .unwrap_or_else(|| MockResponse::Stream {
                chunks: vec![Bytes::from_static(
                    b"data: {\"type\":\"result\",\"data\":\"Mock analysis\"}\n",
                )],
                read_error: None,
                stay_open: false,
            })
    }
}

#[async_trait]
impl AnalysisService for MockAnalysisService {
    async fn analyze_stream(&self, body: MultipartBody) -> Result<ByteStream, AnalysisError> {
        locked(&self.calls).push(body);

        let (chunks, read_error, stay_open) = match self.next_response() {
            MockResponse::Failure(failure) => return Err(failure.into()),
            MockResponse::Stream {
                chunks,
                read_error,
                stay_open,
            } => (chunks, read_error, stay_open),
        };

        let mut items: Vec<Result<Bytes, AnalysisError>> = chunks.into_iter().map(Ok).collect();
        if let Some(message) = read_error {
            items.push(Err(AnalysisError::stream_read(message)));
        }

        let delay = self.chunk_delay;
        let body = stream::iter(items).then(move |item| async move {
            if !delay.is_zero() {
                sleep(delay).await;
            }
            item
        });

        if stay_open {
            Ok(Box::pin(body.chain(stream::pending())))
        } else {
            Ok(Box::pin(body))
        }
    }

    async fn health(&self) -> Result<HealthReport, AnalysisError> {
        Ok(self.health.clone())
    }
}
