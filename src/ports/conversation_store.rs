//! Conversation Store Port - the message log shared with the host UI.
//!
//! Every mutation is applied atomically: readers see either the state before
//! or after a change, never an intermediate one. Observers are notified after
//! the change is committed.

use async_trait::async_trait;
use std::sync::Arc;

use super::ConversationObserver;
use crate::domain::conversation::{Conversation, ConversationError};
use crate::domain::foundation::MessageId;

/// Port for the conversation message log.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Appends a terminal user message.
    async fn append_user(&self, content: String) -> Result<MessageId, ConversationError>;

    /// Appends the loading placeholder.
    ///
    /// # Errors
    ///
    /// - `LoadingMessageExists` if a loading message is already present
    async fn append_loading_placeholder(&self) -> Result<MessageId, ConversationError>;

    /// Appends a log line to the loading message.
    ///
    /// # Errors
    ///
    /// - `NoLoadingMessage` if no loading message is present
    async fn append_log(&self, line: String) -> Result<(), ConversationError>;

    /// Replaces the loading message with the analysis result.
    async fn finalize_success(&self, result: String) -> Result<MessageId, ConversationError>;

    /// Replaces the loading message with an error message.
    async fn finalize_error(&self, message: String) -> Result<MessageId, ConversationError>;

    /// Returns a consistent copy of the conversation.
    async fn snapshot(&self) -> Conversation;

    /// Registers an observer for committed changes.
    async fn subscribe(&self, observer: Arc<dyn ConversationObserver>);
}
