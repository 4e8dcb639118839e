//! Analysis session errors.

use std::fmt;

use crate::domain::foundation::ValidationError;

/// Prefix of the terminal message shown when a session fails.
pub const FAILURE_PREFIX: &str = "❌ Analysis failed";

/// Errors that can end (or prevent) an analysis session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    /// Required fields missing or malformed; caught before any network call.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] ValidationError),

    /// Non-success HTTP status, unreachable service or unreadable response body.
    #[error("{}", transport_description(.status, .message))]
    Transport {
        /// HTTP status, when a response was received.
        status: Option<u16>,
        /// Error details.
        message: String,
    },

    /// Transport failure after streaming started.
    #[error("stream read failed: {0}")]
    StreamRead(String),

    /// Malformed JSON in a single event frame. Recovered locally, never terminal.
    #[error("malformed event frame: {0}")]
    Parse(String),

    /// The service sent an explicit `error` event.
    #[error("{0}")]
    ServerReported(String),

    /// The stream ended without a `result` or `error` event.
    #[error("no result received")]
    MissingResult,

    /// Internal state machine misuse (e.g. a second concurrent submit).
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// The session was cancelled before it finished.
    #[error("analysis cancelled")]
    Cancelled,
}

/// Discriminant of [`AnalysisError`], for matching and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisErrorKind {
    InvalidRequest,
    Transport,
    StreamRead,
    Parse,
    ServerReported,
    MissingResult,
    InvariantViolation,
    Cancelled,
}

impl fmt::Display for AnalysisErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AnalysisErrorKind::InvalidRequest => "INVALID_REQUEST",
            AnalysisErrorKind::Transport => "TRANSPORT_ERROR",
            AnalysisErrorKind::StreamRead => "STREAM_READ_ERROR",
            AnalysisErrorKind::Parse => "PARSE_ERROR",
            AnalysisErrorKind::ServerReported => "SERVER_REPORTED_ERROR",
            AnalysisErrorKind::MissingResult => "MISSING_RESULT",
            AnalysisErrorKind::InvariantViolation => "INVARIANT_VIOLATION",
            AnalysisErrorKind::Cancelled => "CANCELLED",
        };
        write!(f, "{}", s)
    }
}

impl AnalysisError {
    /// Creates a transport error.
    pub fn transport(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Transport {
            status,
            message: message.into(),
        }
    }

    /// Creates a stream read error.
    pub fn stream_read(message: impl Into<String>) -> Self {
        Self::StreamRead(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Creates a server reported error.
    pub fn server_reported(message: impl Into<String>) -> Self {
        Self::ServerReported(message.into())
    }

    /// Creates an invariant violation.
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation(message.into())
    }

    /// Returns the error kind.
    pub fn kind(&self) -> AnalysisErrorKind {
        match self {
            AnalysisError::InvalidRequest(_) => AnalysisErrorKind::InvalidRequest,
            AnalysisError::Transport { .. } => AnalysisErrorKind::Transport,
            AnalysisError::StreamRead(_) => AnalysisErrorKind::StreamRead,
            AnalysisError::Parse(_) => AnalysisErrorKind::Parse,
            AnalysisError::ServerReported(_) => AnalysisErrorKind::ServerReported,
            AnalysisError::MissingResult => AnalysisErrorKind::MissingResult,
            AnalysisError::InvariantViolation(_) => AnalysisErrorKind::InvariantViolation,
            AnalysisError::Cancelled => AnalysisErrorKind::Cancelled,
        }
    }

    /// HTTP status for transport errors that received a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            AnalysisError::Transport { status, .. } => *status,
            _ => None,
        }
    }

    /// Returns true if this error ends the session.
    ///
    /// Parse errors are recovered per frame and never end a session.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, AnalysisError::Parse(_))
    }

    /// Content of the terminal assistant message for this failure.
    pub fn user_message(&self) -> String {
        format!("{}: {}", FAILURE_PREFIX, self)
    }
}

fn transport_description(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) if message.is_empty() => format!("HTTP error! status: {}", code),
        Some(code) => format!("HTTP error! status: {} ({})", code, message),
        None => format!("transport error: {}", message),
    }
}
