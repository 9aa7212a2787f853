//! Session stress log
//!
//! Append-only record of the stress points produced during one session. The
//! log is owned by the running session and handed to the caller on stop;
//! persisting it is left to the caller.

use crate::types::{StressPoint, StressState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ordered stress points for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StressLog {
    session_id: Uuid,
    started_at_utc: DateTime<Utc>,
    points: Vec<StressPoint>,
}

impl StressLog {
    pub fn new(session_id: Uuid, started_at_utc: DateTime<Utc>) -> Self {
        Self {
            session_id,
            started_at_utc,
            points: Vec::new(),
        }
    }

    /// Empty log with a fresh session id, starting now
    pub fn begin() -> Self {
        Self::new(Uuid::new_v4(), Utc::now())
    }

    pub fn append(&mut self, point: StressPoint) {
        self.points.push(point);
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn started_at_utc(&self) -> DateTime<Utc> {
        self.started_at_utc
    }

    pub fn points(&self) -> &[StressPoint] {
        &self.points
    }

    pub fn into_points(self) -> Vec<StressPoint> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points produced by the throttled sampler
    pub fn sampled_points(&self) -> impl Iterator<Item = &StressPoint> {
        self.points.iter().filter(|p| !p.is_forced())
    }

    /// Points forced by question events
    pub fn question_points(&self) -> impl Iterator<Item = &StressPoint> {
        self.points.iter().filter(|p| p.is_forced())
    }

    /// State distribution over the sampled points
    pub fn summary(&self) -> StressSummary {
        StressSummary::from_points(&self.points)
    }
}

/// Distribution of sampled stress states across a session
///
/// Ratios and mean confidence cover sampled points only; question points
/// are counted separately since their state is fixed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressSummary {
    pub total_points: usize,
    pub sampled_points: usize,
    pub question_points: usize,
    pub calm_ratio: f64,
    pub vigilance_ratio: f64,
    pub tense_ratio: f64,
    pub mean_confidence: Option<f64>,
    /// Most frequent sampled state; ties go to the calmer state
    pub dominant_state: Option<StressState>,
}

impl StressSummary {
    pub fn from_points(points: &[StressPoint]) -> Self {
        let sampled: Vec<&StressPoint> = points.iter().filter(|p| !p.is_forced()).collect();
        let n = sampled.len();

        let count = |state: StressState| sampled.iter().filter(|p| p.state == state).count();
        let ratio = |c: usize| if n == 0 { 0.0 } else { c as f64 / n as f64 };

        let mut dominant_state = None;
        let mut dominant_count = 0;
        for state in StressState::ALL {
            let c = count(state);
            if c > dominant_count {
                dominant_count = c;
                dominant_state = Some(state);
            }
        }

        let mean_confidence = if n == 0 {
            None
        } else {
            Some(sampled.iter().map(|p| p.confidence).sum::<f64>() / n as f64)
        };

        Self {
            total_points: points.len(),
            sampled_points: n,
            question_points: points.len() - n,
            calm_ratio: ratio(count(StressState::Calm)),
            vigilance_ratio: ratio(count(StressState::Vigilance)),
            tense_ratio: ratio(count(StressState::Tense)),
            mean_confidence,
            dominant_state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StressScoreComponents;
    use pretty_assertions::assert_eq;

    fn point(timestamp_ms: u64, state: StressState, confidence: f64) -> StressPoint {
        StressPoint {
            timestamp_ms,
            state,
            confidence,
            components: StressScoreComponents::default(),
            question_ref: None,
        }
    }

    fn question(timestamp_ms: u64, question_ref: &str) -> StressPoint {
        StressPoint {
            question_ref: Some(question_ref.to_string()),
            ..point(timestamp_ms, StressState::Vigilance, 0.7)
        }
    }

    #[test]
    fn test_append_preserves_order() {
        let mut log = StressLog::begin();
        log.append(point(0, StressState::Calm, 0.9));
        log.append(question(400, "q-1"));
        log.append(point(1001, StressState::Tense, 0.8));

        let timestamps: Vec<u64> = log.points().iter().map(|p| p.timestamp_ms).collect();
        assert_eq!(timestamps, vec![0, 400, 1001]);
        assert_eq!(log.sampled_points().count(), 2);
        assert_eq!(log.question_points().count(), 1);
    }

    #[test]
    fn test_summary_distribution() {
        let mut log = StressLog::begin();
        log.append(point(0, StressState::Calm, 0.9));
        log.append(point(1001, StressState::Calm, 0.8));
        log.append(point(2002, StressState::Tense, 1.0));
        log.append(point(3003, StressState::Vigilance, 0.7));
        log.append(question(3500, "q-1"));

        let summary = log.summary();
        assert_eq!(summary.total_points, 5);
        assert_eq!(summary.sampled_points, 4);
        assert_eq!(summary.question_points, 1);
        assert_eq!(summary.calm_ratio, 0.5);
        assert_eq!(summary.vigilance_ratio, 0.25);
        assert_eq!(summary.tense_ratio, 0.25);
        assert_eq!(summary.dominant_state, Some(StressState::Calm));
        assert!((summary.mean_confidence.unwrap() - 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_summary_tie_prefers_calmer_state() {
        let points = vec![
            point(0, StressState::Tense, 0.9),
            point(1001, StressState::Vigilance, 0.7),
        ];
        let summary = StressSummary::from_points(&points);
        assert_eq!(summary.dominant_state, Some(StressState::Vigilance));
    }

    #[test]
    fn test_empty_summary() {
        let summary = StressLog::begin().summary();
        assert_eq!(summary.total_points, 0);
        assert_eq!(summary.calm_ratio, 0.0);
        assert_eq!(summary.mean_confidence, None);
        assert_eq!(summary.dominant_state, None);
    }

    #[test]
    fn test_only_questions() {
        let summary = StressSummary::from_points(&[question(10, "q-1"), question(20, "q-2")]);
        assert_eq!(summary.question_points, 2);
        assert_eq!(summary.sampled_points, 0);
        assert_eq!(summary.dominant_state, None);
    }
}
