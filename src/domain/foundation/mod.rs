//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps, validation errors and the state machine
//! trait that the analysis, conversation and session modules build on.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::ValidationError;
pub use ids::{MessageId, SessionId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
