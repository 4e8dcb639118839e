//! Conversation domain module.
//!
//! Holds the message log shown to the user while analyses run. The log is
//! append-only for terminal messages and carries at most one loading message.

mod conversation;
mod errors;
mod message;

pub use conversation::{Conversation, ConversationChange, ConversationEvent, FinalOutcome};
pub use errors::ConversationError;
pub use message::{Message, Role, LOADING_CONTENT};
