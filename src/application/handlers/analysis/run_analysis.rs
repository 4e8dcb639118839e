//! RunAnalysis handler - drives one analysis session end to end.
//!
//! Builds the request body, submits it, pulls decoded lines from the
//! response, routes each line and applies the result to the conversation
//! store before reading the next one. Only one session runs at a time.

use futures::StreamExt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::domain::analysis::{
    decode_lines, AnalysisError, AnalysisRequest, MultipartBody, ServerEvent,
    DEFAULT_MAX_AD_FILE_BYTES,
};
use crate::domain::foundation::{MessageId, SessionId, StateMachine, Timestamp};
use crate::domain::session::SessionState;
use crate::ports::{AnalysisService, ConversationStore};

/// How a submitted session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The result replaced the loading message.
    Completed {
        session_id: SessionId,
        message_id: MessageId,
    },
    /// An error message replaced the loading message.
    Failed {
        session_id: SessionId,
        message_id: MessageId,
        error: AnalysisError,
    },
}

impl SessionOutcome {
    /// Returns true for a completed session.
    pub fn is_completed(&self) -> bool {
        matches!(self, SessionOutcome::Completed { .. })
    }

    /// The error that ended a failed session.
    pub fn error(&self) -> Option<&AnalysisError> {
        match self {
            SessionOutcome::Completed { .. } => None,
            SessionOutcome::Failed { error, .. } => Some(error),
        }
    }

    /// ID of the terminal message.
    pub fn message_id(&self) -> &MessageId {
        match self {
            SessionOutcome::Completed { message_id, .. }
            | SessionOutcome::Failed { message_id, .. } => message_id,
        }
    }
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Puts the controller back to `Idle` however the session exits, including
/// when the submitting future is dropped.
struct IdleOnDrop<'a> {
    state: &'a Mutex<SessionState>,
}

impl Drop for IdleOnDrop<'_> {
    fn drop(&mut self) {
        *locked(self.state) = SessionState::Idle;
    }
}

/// Single-flight controller for analysis sessions.
pub struct AnalysisSessionController<S, C>
where
    S: AnalysisService,
    C: ConversationStore,
{
    service: Arc<S>,
    store: Arc<C>,
    state: Mutex<SessionState>,
    cancel: Mutex<CancellationToken>,
    max_ad_file_bytes: u64,
}

impl<S, C> AnalysisSessionController<S, C>
where
    S: AnalysisService,
    C: ConversationStore,
{
    /// Creates a controller with the default upload limit.
    pub fn new(service: Arc<S>, store: Arc<C>) -> Self {
        Self {
            service,
            store,
            state: Mutex::new(SessionState::Idle),
            cancel: Mutex::new(CancellationToken::new()),
            max_ad_file_bytes: DEFAULT_MAX_AD_FILE_BYTES,
        }
    }

    /// Sets the largest ad file accepted by `submit`.
    pub fn with_max_ad_file_bytes(mut self, max: u64) -> Self {
        self.max_ad_file_bytes = max;
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        *locked(&self.state)
    }

    /// The conversation store this controller writes to.
    pub fn store(&self) -> &Arc<C> {
        &self.store
    }

    /// Cancels the in-flight session, if any.
    ///
    /// The session ends `Failed` with `Cancelled` and its response stream is
    /// dropped. Has no effect on later sessions.
    pub fn cancel(&self) {
        let _state = locked(&self.state);
        locked(&self.cancel).cancel();
    }

    /// Runs one analysis session.
    ///
    /// Returns `Err` without touching the conversation when the request is
    /// invalid or another session is in flight. Every other failure is
    /// reported as exactly one terminal message and `SessionOutcome::Failed`.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` if the request fails validation
    /// - `InvariantViolation` if a session is already running or the store
    ///   rejects a change
    pub async fn submit(&self, request: AnalysisRequest) -> Result<SessionOutcome, AnalysisError> {
        request.validate(self.max_ad_file_bytes)?;
        let body = MultipartBody::build(&request)?;

        let (_idle, token) = self.begin()?;
        let session_id = SessionId::new();
        let span = tracing::info_span!("analysis_session", session_id = %session_id);

        self.run(session_id, request, body, token).instrument(span).await
    }

    /// Moves `Idle -> Submitting` and hands out this session's cancel token.
    fn begin(&self) -> Result<(IdleOnDrop<'_>, CancellationToken), AnalysisError> {
        let mut state = locked(&self.state);
        if *state != SessionState::Idle {
            return Err(AnalysisError::invariant(format!(
                "analysis already in progress (state: {})",
                *state
            )));
        }
        *state = state
            .transition_to(SessionState::Submitting)
            .map_err(|e| AnalysisError::invariant(e.to_string()))?;

        // Swapped under the state lock so a busy state always has its token.
        let token = CancellationToken::new();
        *locked(&self.cancel) = token.clone();
        drop(state);

        Ok((IdleOnDrop { state: &self.state }, token))
    }

    fn transition(&self, target: SessionState) -> Result<(), AnalysisError> {
        let mut state = locked(&self.state);
        *state = state
            .transition_to(target)
            .map_err(|e| AnalysisError::invariant(e.to_string()))?;
        Ok(())
    }

    async fn run(
        &self,
        session_id: SessionId,
        request: AnalysisRequest,
        body: MultipartBody,
        token: CancellationToken,
    ) -> Result<SessionOutcome, AnalysisError> {
        let started_at = Timestamp::now();
        tracing::info!(ad = %request.ad_input.label(), "Starting analysis");

        self.store.append_user(request.summary()).await?;
        self.store.append_loading_placeholder().await?;

        match self.stream_result(body, &token).await {
            Ok(result) => {
                let message_id = self.store.finalize_success(result).await?;
                self.transition(SessionState::Completed)?;
                tracing::info!(
                    elapsed_ms = started_at.elapsed_millis(),
                    "Analysis completed"
                );
                Ok(SessionOutcome::Completed {
                    session_id,
                    message_id,
                })
            }
            Err(error) => {
                let message_id = self.store.finalize_error(error.user_message()).await?;
                self.transition(SessionState::Failed)?;
                tracing::warn!(
                    kind = %error.kind(),
                    error = %error,
                    elapsed_ms = started_at.elapsed_millis(),
                    "Analysis failed"
                );
                Ok(SessionOutcome::Failed {
                    session_id,
                    message_id,
                    error,
                })
            }
        }
    }

    /// Submits the body and reads the response until it yields a result.
    ///
    /// The response stream is owned by this call and dropped on every exit.
    async fn stream_result(
        &self,
        body: MultipartBody,
        token: &CancellationToken,
    ) -> Result<String, AnalysisError> {
        let bytes = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(AnalysisError::Cancelled),
            response = self.service.analyze_stream(body) => response?,
        };

        self.transition(SessionState::Streaming)?;
        tracing::debug!("Response stream opened");

        let mut lines = decode_lines(bytes);
        let mut result: Option<String> = None;

        loop {
            let next = tokio::select! {
                biased;
                _ = token.cancelled() => return Err(AnalysisError::Cancelled),
                next = lines.next() => next,
            };

            let line = match next {
                Some(line) => line?,
                None => break,
            };

            match ServerEvent::from_line(&line) {
                Some(ServerEvent::Log(text)) => {
                    tracing::debug!(line = %text, "Agent log");
                    self.store.append_log(text).await?;
                }
                Some(ServerEvent::Result(text)) => {
                    if result.is_some() {
                        tracing::warn!("Received more than one result; keeping the latest");
                    }
                    result = Some(text);
                }
                Some(ServerEvent::Error(text)) => {
                    return Err(AnalysisError::server_reported(text));
                }
                Some(ServerEvent::Heartbeat) => tracing::trace!("Heartbeat"),
                Some(ServerEvent::Unknown) | None => {}
            }
        }

        result
            .filter(|text| !text.is_empty())
            .ok_or(AnalysisError::MissingResult)
    }
}
