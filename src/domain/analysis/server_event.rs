//! Classification of decoded lines into server events.
//!
//! Pure: no I/O and no shared state. Malformed frames are reported on the
//! log side channel and classified as [`ServerEvent::Unknown`].

use serde_json::Value;

use super::AnalysisError;

/// Literal prefix of an event frame.
pub const EVENT_FRAME_PREFIX: &str = "data: ";

/// One event emitted by the analysis service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// Progress line from one of the service's agents.
    Log(String),
    /// Final verdict, display-ready markdown.
    Result(String),
    /// Service-side failure.
    Error(String),
    /// Keep-alive frame.
    Heartbeat,
    /// Anything else: unrecognised `type`, missing payload, malformed JSON.
    Unknown,
}

impl ServerEvent {
    /// Routes one decoded line.
    ///
    /// Returns `None` for lines that are not event frames (blank separators,
    /// comments, other framing); those are skipped without error.
    pub fn from_line(line: &str) -> Option<ServerEvent> {
        let payload = line.strip_prefix(EVENT_FRAME_PREFIX)?;
        Some(Self::from_payload(payload))
    }

    /// Classifies the JSON payload of an event frame.
    ///
    /// Malformed payloads are logged and classified as `Unknown`.
    pub fn from_payload(payload: &str) -> ServerEvent {
        match Self::parse_payload(payload) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(frame = %payload, error = %e, "Skipping malformed event frame");
                ServerEvent::Unknown
            }
        }
    }

    /// Strict variant of [`ServerEvent::from_payload`].
    ///
    /// # Errors
    ///
    /// - `Parse` if the payload is not a JSON object
    pub fn parse_payload(payload: &str) -> Result<ServerEvent, AnalysisError> {
        let value: Value =
            serde_json::from_str(payload).map_err(|e| AnalysisError::parse(e.to_string()))?;

        let frame = value
            .as_object()
            .ok_or_else(|| AnalysisError::parse("event frame is not a JSON object"))?;

        let kind = frame.get("type").and_then(Value::as_str);
        let data = frame.get("data").and_then(Value::as_str).map(str::to_string);

        Ok(match (kind, data) {
            (Some("log"), Some(text)) => ServerEvent::Log(text),
            (Some("result"), Some(text)) => ServerEvent::Result(text),
            (Some("error"), Some(text)) => ServerEvent::Error(text),
            (Some("heartbeat"), _) => ServerEvent::Heartbeat,
            (kind, _) => {
                tracing::debug!(kind = ?kind, "Ignoring unrecognised event frame");
                ServerEvent::Unknown
            }
        })
    }

    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            ServerEvent::Log(_) => "log",
            ServerEvent::Result(_) => "result",
            ServerEvent::Error(_) => "error",
            ServerEvent::Heartbeat => "heartbeat",
            ServerEvent::Unknown => "unknown",
        }
    }
}
