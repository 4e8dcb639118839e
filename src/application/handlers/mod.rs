//! Application handlers.
//!
//! Command handlers that orchestrate domain operations through ports.

pub mod analysis;

pub use analysis::{AnalysisSessionController, SessionOutcome};
