//! Core types for the Session Signals pipeline
//!
//! This module defines the data structures that flow out of each stage:
//! per-frame score components, classifications, stress points, and the
//! face-descriptor types consumed and produced by the identity matcher.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Clamp to [0, 1], mapping non-finite values to 0
pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Discrete behavioral stress classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StressState {
    Calm,
    Vigilance,
    Tense,
}

impl StressState {
    /// All states, in rule-table order
    pub const ALL: [StressState; 3] = [StressState::Calm, StressState::Vigilance, StressState::Tense];

    pub fn as_str(&self) -> &'static str {
        match self {
            StressState::Calm => "calm",
            StressState::Vigilance => "vigilance",
            StressState::Tense => "tense",
        }
    }
}

/// Per-frame behavioral sub-scores, each in [0, 1]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StressScoreComponents {
    /// Body alignment quality (1 = upright and level)
    pub posture: f64,
    /// Smoothed whole-body movement speed
    pub movement: f64,
    /// Upper-body and hand displacement between frames
    pub hand_fidgeting: f64,
    /// Vertical knee displacement between frames
    pub leg_bouncing: f64,
}

impl StressScoreComponents {
    /// Build components, clamping every score into [0, 1]
    pub fn new(posture: f64, movement: f64, hand_fidgeting: f64, leg_bouncing: f64) -> Self {
        Self {
            posture: clamp_unit(posture),
            movement: clamp_unit(movement),
            hand_fidgeting: clamp_unit(hand_fidgeting),
            leg_bouncing: clamp_unit(leg_bouncing),
        }
    }

    /// Combined fidgeting: equal weight of hands and legs
    pub fn fidgeting(&self) -> f64 {
        0.5 * self.hand_fidgeting + 0.5 * self.leg_bouncing
    }
}

/// Classifier output for one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub state: StressState,
    /// Confidence in the state (0-1)
    pub confidence: f64,
}

/// One entry of the session stress log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StressPoint {
    /// Milliseconds since the session started
    pub timestamp_ms: u64,
    pub state: StressState,
    /// Confidence in the state (0-1)
    pub confidence: f64,
    pub components: StressScoreComponents,
    /// Question that forced this point, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_ref: Option<String>,
}

impl StressPoint {
    /// Whether this point was forced by a question event rather than sampled
    pub fn is_forced(&self) -> bool {
        self.question_ref.is_some()
    }
}

/// Out-of-band "question asked" event injected by the session UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionEvent {
    pub question_ref: String,
    /// Monotonic clock reading in milliseconds, on the same clock as frames
    pub timestamp_ms: u64,
}

impl QuestionEvent {
    pub fn new(question_ref: impl Into<String>, timestamp_ms: u64) -> Self {
        Self {
            question_ref: question_ref.into(),
            timestamp_ms,
        }
    }
}

/// Facial embedding vector (commonly 128 dimensions)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FaceDescriptor(Vec<f32>);

impl FaceDescriptor {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<f32>> for FaceDescriptor {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}

/// Enrolled descriptor owned by the external identity store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryEntry {
    pub descriptor: FaceDescriptor,
    pub identity_ref: String,
    /// Opaque caller metadata, carried through untouched
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl GalleryEntry {
    pub fn new(descriptor: FaceDescriptor, identity_ref: impl Into<String>) -> Self {
        Self {
            descriptor,
            identity_ref: identity_ref.into(),
            metadata: HashMap::new(),
        }
    }
}

/// Result of matching a descriptor against a gallery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    /// Matched identity, `None` when the face is new
    pub identity_ref: Option<String>,
    /// Distance to the nearest comparable entry (infinite if none)
    pub distance: f64,
    /// Match confidence (0-1), 0 for new identities
    pub confidence: f64,
    pub is_new: bool,
}

impl MatchResult {
    pub(crate) fn matched(identity_ref: String, distance: f64) -> Self {
        Self {
            identity_ref: Some(identity_ref),
            distance,
            confidence: clamp_unit(1.0 - distance),
            is_new: false,
        }
    }

    pub(crate) fn new_identity(nearest_distance: f64) -> Self {
        Self {
            identity_ref: None,
            distance: nearest_distance,
            confidence: 0.0,
            is_new: true,
        }
    }
}
