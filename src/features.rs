//! Behavioral feature extraction from pose frames
//!
//! Turns one frame of body landmarks, plus the state retained from earlier
//! frames of the same session, into four bounded sub-scores: posture,
//! movement, hand fidgeting and leg bouncing.
//!
//! Frames must be fed in arrival order. The extractor keeps the previous
//! frame as its reference, so skipping or reordering frames changes scores.

use crate::config::DEFAULT_MOVEMENT_WINDOW;
use crate::landmarks::{
    PoseFrame, FIDGET_KEYPOINTS, LEFT_EAR, LEFT_HIP, LEFT_KNEE, LEFT_SHOULDER, RIGHT_EAR,
    RIGHT_HIP, RIGHT_KNEE, RIGHT_SHOULDER,
};
use crate::types::{clamp_unit, StressScoreComponents};
use std::collections::VecDeque;

/// Posture score used when shoulders, hips or ears are missing
pub const POSTURE_NEUTRAL: f64 = 0.5;

/// Penalty per unit of vertical offset between paired shoulders or hips
const LEVEL_GAIN: f64 = 5.0;

/// Penalty per unit of horizontal offset between stacked midpoints (head, spine)
const ALIGNMENT_GAIN: f64 = 3.0;

/// Scale from mean speed (normalized units / second) to movement score
const MOVEMENT_SCALE: f64 = 10.0;

/// Upper-body displacement per frame that saturates hand fidgeting
const FIDGET_MAX_DISPLACEMENT: f64 = 0.05;

/// Vertical knee displacement per frame that saturates leg bouncing
const KNEE_MAX_DISPLACEMENT: f64 = 0.03;

/// Per-session state carried between frames
#[derive(Debug, Clone, Default)]
pub struct ExtractorState {
    previous_frame: Option<PoseFrame>,
    previous_timestamp_ms: Option<u64>,
    speeds: VecDeque<f64>,
    previous_knees: Option<(f64, f64)>,
}

/// Stateful feature extractor for one session
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    state: ExtractorState,
    window_size: usize,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MOVEMENT_WINDOW)
    }
}

impl FeatureExtractor {
    /// Create an extractor smoothing movement over `window_size` frames
    pub fn new(window_size: usize) -> Self {
        let window_size = window_size.max(1);
        Self {
            state: ExtractorState {
                speeds: VecDeque::with_capacity(window_size),
                ..ExtractorState::default()
            },
            window_size,
        }
    }

    /// Compute all four sub-scores for a frame and advance the retained state
    ///
    /// Every score is measured against the same previous frame; the new frame
    /// becomes the reference only after all of them are computed.
    pub fn extract(&mut self, frame: &PoseFrame, timestamp_ms: u64) -> StressScoreComponents {
        let posture = posture(frame);
        let hand_fidgeting = self.hand_fidgeting(frame);
        let leg_bouncing = self.leg_bouncing(frame);
        let movement = self.movement(frame, timestamp_ms);

        StressScoreComponents::new(posture, movement, hand_fidgeting, leg_bouncing)
    }

    /// Smoothed whole-body movement speed (0-1)
    ///
    /// Returns exactly 0 on the first frame after construction or reset.
    /// Stores `frame` as the new previous-frame reference.
    pub fn movement(&mut self, frame: &PoseFrame, timestamp_ms: u64) -> f64 {
        let measured = match (&self.state.previous_frame, self.state.previous_timestamp_ms) {
            (Some(previous), Some(previous_ts)) => Some((
                mean_displacement(frame, previous, 0..frame.len()),
                timestamp_ms.saturating_sub(previous_ts) as f64 / 1000.0,
            )),
            _ => None,
        };

        let Some((displacement, elapsed_sec)) = measured else {
            self.remember_frame(frame, timestamp_ms);
            return 0.0;
        };

        // A frame that does not advance the clock yields no speed sample
        if elapsed_sec > 0.0 {
            self.state.speeds.push_back(displacement / elapsed_sec);
            while self.state.speeds.len() > self.window_size {
                self.state.speeds.pop_front();
            }
        }

        self.remember_frame(frame, timestamp_ms);
        clamp_unit(self.windowed_speed() * MOVEMENT_SCALE)
    }

    /// Displacement of ears, shoulders, wrists and fingers since the previous frame (0-1)
    ///
    /// Reads but does not replace the previous-frame reference.
    pub fn hand_fidgeting(&self, frame: &PoseFrame) -> f64 {
        match self.state.previous_frame.as_ref() {
            Some(previous) => {
                let displacement =
                    mean_displacement(frame, previous, FIDGET_KEYPOINTS.iter().copied());
                clamp_unit(displacement / FIDGET_MAX_DISPLACEMENT)
            }
            None => 0.0,
        }
    }

    /// Larger vertical knee displacement since the previous frame (0-1)
    ///
    /// Both knees must be visible; otherwise the score is 0 and the knee
    /// reference is dropped so a reappearing knee does not register a jump.
    pub fn leg_bouncing(&mut self, frame: &PoseFrame) -> f64 {
        let knees = match (frame.visible(LEFT_KNEE), frame.visible(RIGHT_KNEE)) {
            (Some(left), Some(right)) => (left.y, right.y),
            _ => {
                self.state.previous_knees = None;
                return 0.0;
            }
        };

        let score = match self.state.previous_knees {
            Some((prev_left, prev_right)) => {
                let delta = (knees.0 - prev_left).abs().max((knees.1 - prev_right).abs());
                clamp_unit(delta / KNEE_MAX_DISPLACEMENT)
            }
            None => 0.0,
        };

        self.state.previous_knees = Some(knees);
        score
    }

    /// Drop all retained state; the next frame is treated as the first
    pub fn reset(&mut self) {
        self.state.previous_frame = None;
        self.state.previous_timestamp_ms = None;
        self.state.speeds.clear();
        self.state.previous_knees = None;
    }

    /// Whether a previous frame is available as reference
    pub fn has_reference(&self) -> bool {
        self.state.previous_frame.is_some()
    }

    /// Number of speed samples currently in the smoothing window
    pub fn window_len(&self) -> usize {
        self.state.speeds.len()
    }

    fn remember_frame(&mut self, frame: &PoseFrame, timestamp_ms: u64) {
        self.state.previous_frame = Some(frame.clone());
        self.state.previous_timestamp_ms = Some(timestamp_ms);
    }

    fn windowed_speed(&self) -> f64 {
        if self.state.speeds.is_empty() {
            return 0.0;
        }
        self.state.speeds.iter().sum::<f64>() / self.state.speeds.len() as f64
    }
}

/// Posture alignment score (0-1)
///
/// Averages four sub-scores, each `max(0, 1 - delta * gain)`:
/// shoulder levelness and hip levelness (vertical offset within the pair),
/// head alignment (ear-pair tilt against shoulder-pair tilt) and spine
/// alignment (shoulder-pair tilt against hip-pair tilt). Returns
/// [`POSTURE_NEUTRAL`] when any of the six keypoints is missing.
pub fn posture(frame: &PoseFrame) -> f64 {
    let (
        Some(left_shoulder),
        Some(right_shoulder),
        Some(left_hip),
        Some(right_hip),
        Some(left_ear),
        Some(right_ear),
    ) = (
        frame.get(LEFT_SHOULDER),
        frame.get(RIGHT_SHOULDER),
        frame.get(LEFT_HIP),
        frame.get(RIGHT_HIP),
        frame.get(LEFT_EAR),
        frame.get(RIGHT_EAR),
    )
    else {
        return POSTURE_NEUTRAL;
    };

    // Signed vertical offset within each pair
    let shoulder_tilt = left_shoulder.y - right_shoulder.y;
    let hip_tilt = left_hip.y - right_hip.y;
    let ear_tilt = left_ear.y - right_ear.y;

    let shoulder_level = alignment_score(shoulder_tilt.abs(), LEVEL_GAIN);
    let hip_level = alignment_score(hip_tilt.abs(), LEVEL_GAIN);
    let head_alignment = alignment_score((ear_tilt - shoulder_tilt).abs(), ALIGNMENT_GAIN);
    let spine_alignment = alignment_score((shoulder_tilt - hip_tilt).abs(), ALIGNMENT_GAIN);

    clamp_unit((shoulder_level + hip_level + head_alignment + spine_alignment) / 4.0)
}

fn alignment_score(delta: f64, gain: f64) -> f64 {
    (1.0 - delta * gain).max(0.0)
}

/// Mean Euclidean displacement over `indices` visible in `current` and present in `previous`
fn mean_displacement(
    current: &PoseFrame,
    previous: &PoseFrame,
    indices: impl Iterator<Item = usize>,
) -> f64 {
    let (total, count) = indices
        .filter_map(|idx| {
            let now = current.visible(idx)?;
            let before = previous.get(idx)?;
            Some(now.distance_to(before))
        })
        .fold((0.0, 0usize), |(sum, n), d| (sum + d, n + 1));

    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}
