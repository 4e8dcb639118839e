//! Conversation aggregate.
//!
//! The conversation is an ordered, append-only message log with at most one
//! loading message. All changes go through [`Conversation::apply`], a pure
//! reducer that either returns the next conversation or rejects the event
//! and leaves the current one untouched.

use serde::Serialize;

use super::{ConversationError, Message};
use crate::domain::foundation::MessageId;

/// Something that happened to the conversation during an analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationEvent {
    /// The user submitted a request.
    UserSubmitted { content: String },
    /// The analysis started; a loading placeholder appears.
    AnalysisStarted,
    /// The service reported progress.
    LogReceived { line: String },
    /// The analysis produced its verdict.
    AnalysisSucceeded { result: String },
    /// The analysis failed; `message` is user-facing.
    AnalysisFailed { message: String },
}

/// How a finalized session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalOutcome {
    Success,
    Error,
}

/// Change notification produced by a successful [`Conversation::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationChange {
    UserAppended {
        message_id: MessageId,
    },
    LoadingStarted {
        message_id: MessageId,
    },
    LogAppended {
        message_id: MessageId,
        line: String,
        log_count: usize,
    },
    /// The loading message was replaced by a terminal message.
    Finalized {
        replaced_id: MessageId,
        message_id: MessageId,
        outcome: FinalOutcome,
    },
}

/// Ordered message log for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Creates an empty conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages in insertion order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if there are no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The in-flight loading message, if any.
    pub fn loading_message(&self) -> Option<&Message> {
        self.messages.iter().find(|m| m.is_loading())
    }

    /// Number of loading messages. Never greater than one.
    pub fn loading_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_loading()).count()
    }

    /// The most recent message.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Applies an event, returning the next conversation and what changed.
    ///
    /// # Errors
    ///
    /// - `LoadingMessageExists` when starting an analysis while one is loading
    /// - `NoLoadingMessage` when logging or finalizing without a loading message
    pub fn apply(
        &self,
        event: ConversationEvent,
    ) -> Result<(Conversation, ConversationChange), ConversationError> {
        match event {
            ConversationEvent::UserSubmitted { content } => {
                let message = Message::user(content);
                let change = ConversationChange::UserAppended {
                    message_id: *message.id(),
                };
                Ok((self.appended(message), change))
            }

            ConversationEvent::AnalysisStarted => {
                if let Some(existing) = self.loading_message() {
                    return Err(ConversationError::LoadingMessageExists(*existing.id()));
                }
                let message = Message::loading_placeholder();
                let change = ConversationChange::LoadingStarted {
                    message_id: *message.id(),
                };
                Ok((self.appended(message), change))
            }

            ConversationEvent::LogReceived { line } => {
                let position = self
                    .messages
                    .iter()
                    .position(Message::is_loading)
                    .ok_or(ConversationError::NoLoadingMessage)?;

                let mut messages = self.messages.clone();
                let updated = messages[position].with_log(line.clone());
                let change = ConversationChange::LogAppended {
                    message_id: *updated.id(),
                    line,
                    log_count: updated.agent_logs().map_or(0, <[String]>::len),
                };
                messages[position] = updated;
                Ok((Conversation { messages }, change))
            }

            ConversationEvent::AnalysisSucceeded { result } => {
                self.finalized(Message::assistant(result), FinalOutcome::Success)
            }

            ConversationEvent::AnalysisFailed { message } => {
                self.finalized(Message::assistant(message), FinalOutcome::Error)
            }
        }
    }

    fn appended(&self, message: Message) -> Conversation {
        let mut messages = self.messages.clone();
        messages.push(message);
        Conversation { messages }
    }

    /// Swaps the loading message for a terminal one in a single step.
    fn finalized(
        &self,
        terminal: Message,
        outcome: FinalOutcome,
    ) -> Result<(Conversation, ConversationChange), ConversationError> {
        let loading = self
            .loading_message()
            .ok_or(ConversationError::NoLoadingMessage)?;

        let change = ConversationChange::Finalized {
            replaced_id: *loading.id(),
            message_id: *terminal.id(),
            outcome,
        };

        let mut messages: Vec<Message> = self
            .messages
            .iter()
            .filter(|m| !m.is_loading())
            .cloned()
            .collect();
        messages.push(terminal);

        Ok((Conversation { messages }, change))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::Role;

    fn apply(conversation: &Conversation, event: ConversationEvent) -> Conversation {
        conversation.apply(event).unwrap().0
    }

    fn loading_conversation() -> Conversation {
        let c = apply(
            &Conversation::new(),
            ConversationEvent::UserSubmitted {
                content: "📤 Ad file: ad.jpg".to_string(),
            },
        );
        apply(&c, ConversationEvent::AnalysisStarted)
    }

    mod append {
        use super::*;

        #[test]
        fn user_submission_appends_user_message() {
            let (c, change) = Conversation::new()
                .apply(ConversationEvent::UserSubmitted {
                    content: "hi".to_string(),
                })
                .unwrap();

            assert_eq!(c.len(), 1);
            assert_eq!(c.messages()[0].role(), Role::User);
            assert_eq!(
                change,
                ConversationChange::UserAppended {
                    message_id: *c.messages()[0].id()
                }
            );
        }

        #[test]
        fn analysis_start_appends_placeholder() {
            let c = loading_conversation();
            assert_eq!(c.len(), 2);
            assert_eq!(c.loading_count(), 1);
            assert_eq!(c.loading_message().unwrap().agent_logs(), Some(&[][..]));
        }

        #[test]
        fn second_placeholder_is_rejected() {
            let c = loading_conversation();
            let loading_id = *c.loading_message().unwrap().id();

            let err = c.apply(ConversationEvent::AnalysisStarted).unwrap_err();
            assert_eq!(err, ConversationError::LoadingMessageExists(loading_id));
            assert_eq!(c.loading_count(), 1);
        }
    }

    mod logs {
        use super::*;

        #[test]
        fn logs_accumulate_in_arrival_order() {
            let mut c = loading_conversation();
            for line in ["step 1", "step 2", "step 3"] {
                c = apply(
                    &c,
                    ConversationEvent::LogReceived {
                        line: line.to_string(),
                    },
                );
            }

            let logs = c.loading_message().unwrap().agent_logs().unwrap();
            assert_eq!(logs, &["step 1", "step 2", "step 3"]);
        }

        #[test]
        fn log_change_reports_count() {
            let c = loading_conversation();
            let (_, change) = c
                .apply(ConversationEvent::LogReceived {
                    line: "step 1".to_string(),
                })
                .unwrap();

            assert!(matches!(
                change,
                ConversationChange::LogAppended { log_count: 1, ref line, .. } if line == "step 1"
            ));
        }

        #[test]
        fn log_without_loading_message_is_rejected() {
            let err = Conversation::new()
                .apply(ConversationEvent::LogReceived {
                    line: "orphan".to_string(),
                })
                .unwrap_err();
            assert_eq!(err, ConversationError::NoLoadingMessage);
        }

        #[test]
        fn original_is_unchanged_by_apply() {
            let c = loading_conversation();
            let _ = c
                .apply(ConversationEvent::LogReceived {
                    line: "x".to_string(),
                })
                .unwrap();
            assert_eq!(c.loading_message().unwrap().agent_logs(), Some(&[][..]));
        }
    }

    mod finalize {
        use super::*;

        #[test]
        fn success_replaces_loading_with_result() {
            let c = loading_conversation();
            let loading_id = *c.loading_message().unwrap().id();

            let (c, change) = c
                .apply(ConversationEvent::AnalysisSucceeded {
                    result: "# Verdict\nScore: 8/10".to_string(),
                })
                .unwrap();

            assert_eq!(c.len(), 2);
            assert_eq!(c.loading_count(), 0);
            let last = c.last().unwrap();
            assert_eq!(last.role(), Role::Assistant);
            assert_eq!(last.content(), "# Verdict\nScore: 8/10");
            assert_eq!(last.agent_logs(), None);
            assert!(matches!(
                change,
                ConversationChange::Finalized { replaced_id, outcome: FinalOutcome::Success, .. }
                    if replaced_id == loading_id
            ));
        }

        #[test]
        fn failure_replaces_loading_with_error() {
            let c = loading_conversation();
            let (c, change) = c
                .apply(ConversationEvent::AnalysisFailed {
                    message: "❌ Analysis failed: invalid image format".to_string(),
                })
                .unwrap();

            assert_eq!(c.loading_count(), 0);
            assert!(c.last().unwrap().content().contains("invalid image format"));
            assert!(matches!(
                change,
                ConversationChange::Finalized { outcome: FinalOutcome::Error, .. }
            ));
        }

        #[test]
        fn finalize_without_loading_is_rejected() {
            let err = Conversation::new()
                .apply(ConversationEvent::AnalysisSucceeded {
                    result: "x".to_string(),
                })
                .unwrap_err();
            assert_eq!(err, ConversationError::NoLoadingMessage);
        }

        #[test]
        fn terminal_history_is_preserved_across_sessions() {
            let first = apply(
                &loading_conversation(),
                ConversationEvent::AnalysisSucceeded {
                    result: "first".to_string(),
                },
            );
            let history: Vec<Message> = first.messages().to_vec();

            let second = apply(
                &first,
                ConversationEvent::UserSubmitted {
                    content: "again".to_string(),
                },
            );
            let second = apply(&second, ConversationEvent::AnalysisStarted);
            let second = apply(
                &second,
                ConversationEvent::AnalysisFailed {
                    message: "boom".to_string(),
                },
            );

            assert_eq!(&second.messages()[..2], &history[..]);
            assert_eq!(second.len(), 4);
        }
    }
}
