//! Ads Quality Rater - streaming client for the ad analysis service.
//!
//! Submits an ad creative and its landing page for analysis, follows the
//! streamed agent progress, and keeps a conversation log with a single
//! loading message that is replaced by the final verdict or an error.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
