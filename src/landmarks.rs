//! Pose landmarks and the anatomical index contract
//!
//! Frames follow the 33-point body topology produced by common pose
//! estimators. Only the indices below are read by the feature extractor;
//! any other slots are carried but ignored except for whole-body movement.

use serde::{Deserialize, Serialize};

/// Visibility above which a landmark counts as tracked
pub const VISIBILITY_THRESHOLD: f64 = 0.5;

/// Number of slots in a full-body frame
pub const FULL_BODY_LANDMARKS: usize = 33;

pub const LEFT_EAR: usize = 7;
pub const RIGHT_EAR: usize = 8;
pub const LEFT_SHOULDER: usize = 11;
pub const RIGHT_SHOULDER: usize = 12;
pub const LEFT_WRIST: usize = 15;
pub const RIGHT_WRIST: usize = 16;
pub const LEFT_PINKY: usize = 17;
pub const RIGHT_PINKY: usize = 18;
pub const LEFT_INDEX: usize = 19;
pub const RIGHT_INDEX: usize = 20;
pub const LEFT_THUMB: usize = 21;
pub const RIGHT_THUMB: usize = 22;
pub const LEFT_HIP: usize = 23;
pub const RIGHT_HIP: usize = 24;
pub const LEFT_KNEE: usize = 25;
pub const RIGHT_KNEE: usize = 26;

/// Keypoints tracked for hand fidgeting: ears, shoulders, wrists, fingers
pub const FIDGET_KEYPOINTS: [usize; 12] = [
    LEFT_EAR,
    RIGHT_EAR,
    LEFT_SHOULDER,
    RIGHT_SHOULDER,
    LEFT_WRIST,
    RIGHT_WRIST,
    LEFT_PINKY,
    RIGHT_PINKY,
    LEFT_INDEX,
    RIGHT_INDEX,
    LEFT_THUMB,
    RIGHT_THUMB,
];

/// A tracked body keypoint in normalized image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Horizontal position (0-1)
    pub x: f64,
    /// Vertical position (0-1, downwards)
    pub y: f64,
    /// Tracking confidence (0-1)
    #[serde(default)]
    pub visibility: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, visibility: f64) -> Self {
        Self { x, y, visibility }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.visibility.is_finite()
    }

    pub fn is_visible(&self) -> bool {
        self.visibility > VISIBILITY_THRESHOLD
    }

    pub fn distance_to(&self, other: &Landmark) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// One frame of body landmarks, addressed by the index contract above
///
/// Slots may be empty (`null` in JSON) when the estimator dropped a keypoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoseFrame {
    landmarks: Vec<Option<Landmark>>,
}

impl PoseFrame {
    pub fn new(landmarks: Vec<Option<Landmark>>) -> Self {
        Self { landmarks }
    }

    /// Frame with every slot populated
    pub fn from_landmarks(landmarks: Vec<Landmark>) -> Self {
        Self {
            landmarks: landmarks.into_iter().map(Some).collect(),
        }
    }

    /// Landmark at `index`, or `None` if the slot is absent, empty or non-finite
    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.landmarks
            .get(index)
            .and_then(|slot| slot.as_ref())
            .filter(|lm| lm.is_finite())
    }

    /// Landmark at `index` only if it is tracked above the visibility threshold
    pub fn visible(&self, index: usize) -> Option<&Landmark> {
        self.get(index).filter(|lm| lm.is_visible())
    }

    /// Clear a slot, leaving the rest of the frame intact
    pub fn without(mut self, index: usize) -> Self {
        if let Some(slot) = self.landmarks.get_mut(index) {
            *slot = None;
        }
        self
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_filters_missing_and_non_finite() {
        let frame = PoseFrame::new(vec![
            Some(Landmark::new(0.5, 0.5, 0.9)),
            None,
            Some(Landmark::new(f64::NAN, 0.2, 0.9)),
        ]);

        assert!(frame.get(0).is_some());
        assert!(frame.get(1).is_none());
        assert!(frame.get(2).is_none());
        assert!(frame.get(40).is_none());
    }

    #[test]
    fn test_visible_uses_threshold() {
        let frame = PoseFrame::from_landmarks(vec![
            Landmark::new(0.1, 0.1, 0.5),
            Landmark::new(0.1, 0.1, 0.51),
        ]);

        assert!(frame.visible(0).is_none());
        assert!(frame.visible(1).is_some());
    }

    #[test]
    fn test_without_clears_slot() {
        let frame = PoseFrame::from_landmarks(vec![Landmark::new(0.1, 0.1, 1.0); 3]).without(1);
        assert_eq!(frame.len(), 3);
        assert!(frame.get(1).is_none());
        assert!(frame.get(2).is_some());
    }

    #[test]
    fn test_frame_json_accepts_null_slots() {
        let json = r#"[{"x":0.1,"y":0.2,"visibility":0.9},null,{"x":0.3,"y":0.4}]"#;
        let frame: PoseFrame = serde_json::from_str(json).unwrap();

        assert_eq!(frame.len(), 3);
        assert!(frame.get(1).is_none());
        assert_eq!(frame.get(2).map(|lm| lm.visibility), Some(0.0));
    }
}
