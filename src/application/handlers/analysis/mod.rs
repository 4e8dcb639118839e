//! Analysis session handlers.

mod run_analysis;

pub use run_analysis::{AnalysisSessionController, SessionOutcome};
