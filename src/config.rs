//! Session configuration
//!
//! Tunables a host may override per deployment. The extraction constants
//! (posture gains, displacement scales) are calibrated values and stay fixed.

use crate::error::ComputeError;
use serde::{Deserialize, Serialize};

/// Default minimum gap between two sampled stress points
pub const DEFAULT_THROTTLE_INTERVAL_MS: u64 = 1000;

/// Default maximum descriptor distance accepted as a match
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.6;

/// Default number of movement speeds kept for smoothing
pub const DEFAULT_MOVEMENT_WINDOW: usize = 10;

/// Configuration for one monitoring session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Minimum elapsed time between sampled stress points (ms)
    pub throttle_interval_ms: u64,
    /// Euclidean distance below which a face descriptor matches
    pub match_threshold: f64,
    /// Rolling window size for movement smoothing (frames)
    pub movement_window: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            throttle_interval_ms: DEFAULT_THROTTLE_INTERVAL_MS,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            movement_window: DEFAULT_MOVEMENT_WINDOW,
        }
    }
}

impl SessionConfig {
    /// Check that every field is usable
    pub fn validate(&self) -> Result<(), ComputeError> {
        if !self.match_threshold.is_finite() || self.match_threshold <= 0.0 {
            return Err(ComputeError::InvalidConfig(format!(
                "match_threshold must be a positive finite number, got {}",
                self.match_threshold
            )));
        }
        if self.movement_window == 0 {
            return Err(ComputeError::InvalidConfig(
                "movement_window must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Load and validate configuration from JSON; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        let config: SessionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, ComputeError> {
        serde_json::to_string(self).map_err(ComputeError::JsonError)
    }
}
