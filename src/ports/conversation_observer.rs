//! Conversation Observer Port - change notifications for the host UI.

use crate::domain::conversation::ConversationChange;

/// Receives a notification after each committed conversation change.
///
/// Called synchronously by the store once the change is committed, in
/// commit order. Implementations must return quickly and must not call back
/// into the store.
pub trait ConversationObserver: Send + Sync {
    fn on_change(&self, change: &ConversationChange);
}

/// Observer that ignores every change.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ConversationObserver for NoopObserver {
    fn on_change(&self, _change: &ConversationChange) {}
}
