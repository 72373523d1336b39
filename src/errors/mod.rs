//! Centralized error handling module
//!
//! A single structured error type covers token issuance, dispatch, hub
//! operations and configuration.

pub mod types;

pub use types::{PushError, PushResult};
