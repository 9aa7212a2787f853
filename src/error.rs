//! Error types for Session Signals
//!
//! Degraded inputs (missing keypoints, mismatched descriptors) are not errors;
//! they resolve to neutral scores or a non-match. Only lifecycle misuse,
//! configuration problems and provider start-up failures surface here.

use thiserror::Error;

/// Errors that can occur while running a session or handling its data
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Session is not running")]
    SessionInactive,

    #[error("Provider '{provider}' failed to initialize: {reason}")]
    ProviderInitialization { provider: String, reason: String },

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
