//! Application layer - handlers that coordinate the domain and its ports.

pub mod handlers;

pub use handlers::{AnalysisSessionController, SessionOutcome};
