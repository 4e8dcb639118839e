//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `AnalysisService` - Remote streaming analysis service
//! - `ConversationStore` - Message log shared with the host UI
//! - `ConversationObserver` - Change notifications from the store

mod analysis_service;
mod conversation_observer;
mod conversation_store;

pub use analysis_service::{AnalysisService, HealthReport, HealthStatus};
pub use conversation_observer::{ConversationObserver, NoopObserver};
pub use conversation_store::ConversationStore;
