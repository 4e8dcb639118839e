//! Adapters - Implementations of port interfaces.
//!
//! - `analysis` - HTTP client and scripted mock for the analysis service
//! - `conversation` - In-memory conversation store

pub mod analysis;
pub mod conversation;

pub use analysis::{HttpAnalysisClient, MockAnalysisService, MockFailure, MockResponse};
pub use conversation::InMemoryConversationStore;
