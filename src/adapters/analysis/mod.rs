//! Analysis Service Adapters.
//!
//! - `HttpAnalysisClient` - reqwest client for the streaming analysis API
//! - `MockAnalysisService` - Scripted mock for testing

mod http_client;
mod mock_service;

pub use http_client::{HttpAnalysisClient, ANALYZE_STREAM_PATH, HEALTH_PATH};
pub use mock_service::{MockAnalysisService, MockFailure, MockResponse};
