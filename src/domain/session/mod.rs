//! Session module - lifecycle of a single analysis submission.

mod state;

pub use state::SessionState;
