//! In-Memory Conversation Store Adapter
//!
//! Holds the conversation behind a tokio `RwLock`. Each mutation runs the
//! domain reducer against the current value and swaps in the result under
//! the write lock, so snapshots never observe a half-applied change.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::conversation::{
    Conversation, ConversationChange, ConversationError, ConversationEvent,
};
use crate::domain::foundation::MessageId;
use crate::ports::{ConversationObserver, ConversationStore};

/// In-memory conversation store
#[derive(Clone, Default)]
pub struct InMemoryConversationStore {
    conversation: Arc<RwLock<Conversation>>,
    observers: Arc<RwLock<Vec<Arc<dyn ConversationObserver>>>>,
}

impl InMemoryConversationStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with an existing conversation
    #[cfg(test)]
    pub(crate) fn with_conversation(conversation: Conversation) -> Self {
        Self {
            conversation: Arc::new(RwLock::new(conversation)),
            observers: Arc::default(),
        }
    }

    /// Number of registered observers
    #[cfg(test)]
    pub(crate) async fn observer_count(&self) -> usize {
        self.observers.read().await.len()
    }

    /// Applies an event and notifies observers while the write lock is held,
    /// which keeps notifications in commit order.
    async fn commit(&self, event: ConversationEvent) -> Result<ConversationChange, ConversationError> {
        let mut conversation = self.conversation.write().await;
        let (next, change) = conversation.apply(event)?;
        *conversation = next;

        for observer in self.observers.read().await.iter() {
            observer.on_change(&change);
        }

        Ok(change)
    }
}

impl std::fmt::Debug for InMemoryConversationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryConversationStore").finish_non_exhaustive()
    }
}

fn message_id(change: &ConversationChange) -> MessageId {
    match change {
        ConversationChange::UserAppended { message_id }
        | ConversationChange::LoadingStarted { message_id }
        | ConversationChange::LogAppended { message_id, .. }
        | ConversationChange::Finalized { message_id, .. } => *message_id,
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn append_user(&self, content: String) -> Result<MessageId, ConversationError> {
        let change = self
            .commit(ConversationEvent::UserSubmitted { content })
            .await?;
        Ok(message_id(&change))
    }

    async fn append_loading_placeholder(&self) -> Result<MessageId, ConversationError> {
        let change = self.commit(ConversationEvent::AnalysisStarted).await?;
        Ok(message_id(&change))
    }

    async fn append_log(&self, line: String) -> Result<(), ConversationError> {
        self.commit(ConversationEvent::LogReceived { line }).await?;
        Ok(())
    }

    async fn finalize_success(&self, result: String) -> Result<MessageId, ConversationError> {
        let change = self
            .commit(ConversationEvent::AnalysisSucceeded { result })
            .await?;
        Ok(message_id(&change))
    }

    async fn finalize_error(&self, message: String) -> Result<MessageId, ConversationError> {
        let change = self
            .commit(ConversationEvent::AnalysisFailed { message })
            .await?;
        Ok(message_id(&change))
    }

    async fn snapshot(&self) -> Conversation {
        self.conversation.read().await.clone()
    }

    async fn subscribe(&self, observer: Arc<dyn ConversationObserver>) {
        self.observers.write().await.push(observer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingObserver {
        changes: Mutex<Vec<ConversationChange>>,
    }

    impl ConversationObserver for RecordingObserver {
        fn on_change(&self, change: &ConversationChange) {
            self.changes.lock().unwrap().push(change.clone());
        }
    }

    #[tokio::test]
    async fn full_session_leaves_user_and_terminal_messages() {
        let store = InMemoryConversationStore::new();

        store.append_user("📎 Ad URL: x".to_string()).await.unwrap();
        store.append_loading_placeholder().await.unwrap();
        store.append_log("step 1".to_string()).await.unwrap();
        let result_id = store.finalize_success("Score: 8/10".to_string()).await.unwrap();

        let conversation = store.snapshot().await;
        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation.loading_count(), 0);
        assert_eq!(conversation.last().unwrap().id(), &result_id);
    }

    #[tokio::test]
    async fn rejected_change_leaves_state_untouched() {
        let store = InMemoryConversationStore::new();
        store.append_loading_placeholder().await.unwrap();
        let before = store.snapshot().await;

        let err = store.append_loading_placeholder().await.unwrap_err();

        assert!(matches!(err, ConversationError::LoadingMessageExists(_)));
        assert_eq!(store.snapshot().await, before);
    }

    #[tokio::test]
    async fn observers_see_changes_in_commit_order() {
        let store = InMemoryConversationStore::new();
        let observer = Arc::new(RecordingObserver::default());
        store.subscribe(observer.clone()).await;

        store.append_user("u".to_string()).await.unwrap();
        store.append_loading_placeholder().await.unwrap();
        store.append_log("a".to_string()).await.unwrap();
        store.append_log("b".to_string()).await.unwrap();
        store.finalize_error("❌ Analysis failed: boom".to_string()).await.unwrap();

        let changes = observer.changes.lock().unwrap().clone();
        assert_eq!(changes.len(), 5);
        assert!(matches!(changes[0], ConversationChange::UserAppended { .. }));
        assert!(matches!(changes[1], ConversationChange::LoadingStarted { .. }));
        assert!(matches!(changes[2], ConversationChange::LogAppended { log_count: 1, .. }));
        assert!(matches!(changes[3], ConversationChange::LogAppended { log_count: 2, .. }));
        assert!(matches!(changes[4], ConversationChange::Finalized { .. }));
    }

    #[tokio::test]
    async fn rejected_change_is_not_observed() {
        let store = InMemoryConversationStore::new();
        let observer = Arc::new(RecordingObserver::default());
        store.subscribe(observer.clone()).await;

        let _ = store.append_log("orphan".to_string()).await;

        assert!(observer.changes.lock().unwrap().is_empty());
        assert_eq!(store.observer_count().await, 1);
    }

    #[tokio::test]
    async fn seeded_history_is_preserved() {
        let seeded = InMemoryConversationStore::new();
        seeded.append_user("earlier".to_string()).await.unwrap();
        let history = seeded.snapshot().await;

        let store = InMemoryConversationStore::with_conversation(history.clone());
        store.append_user("later".to_string()).await.unwrap();

        assert_eq!(&store.snapshot().await.messages()[..1], history.messages());
    }
}
