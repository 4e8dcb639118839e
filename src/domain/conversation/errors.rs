//! Conversation errors.

use thiserror::Error;

use crate::domain::analysis::AnalysisError;
use crate::domain::foundation::MessageId;

/// Errors raised by the conversation reducer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversationError {
    #[error("a loading message already exists: {0}")]
    LoadingMessageExists(MessageId),

    #[error("no loading message to update")]
    NoLoadingMessage,
}

impl From<ConversationError> for AnalysisError {
    fn from(err: ConversationError) -> Self {
        AnalysisError::invariant(err.to_string())
    }
}
