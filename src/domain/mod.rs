//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, state machine)
//! - `analysis` - Analysis request, multipart body, line decoding and event routing
//! - `conversation` - Message log with the single-loading-message invariant
//! - `session` - Session lifecycle states

pub mod analysis;
pub mod conversation;
pub mod foundation;
pub mod session;
