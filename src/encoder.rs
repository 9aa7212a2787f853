//! Stress log hand-off encoder
//!
//! Wraps a finished session log with producer and provenance metadata so the
//! external session-persistence module receives a self-describing payload.

use crate::error::ComputeError;
use crate::stress_log::{StressLog, StressSummary};
use crate::types::StressPoint;
use crate::{PRODUCER_NAME, SIGNALS_VERSION};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current payload schema version
pub const PAYLOAD_SCHEMA_VERSION: &str = "1.0.0";

/// Producer metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Session provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadSession {
    pub session_id: String,
    pub started_at_utc: String,
    pub computed_at_utc: String,
    /// Timestamp of the latest point (ms since session start)
    pub last_point_ms: Option<u64>,
}

/// Complete hand-off payload for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressLogPayload {
    pub schema_version: String,
    pub producer: PayloadProducer,
    pub session: PayloadSession,
    pub summary: StressSummary,
    pub points: Vec<StressPoint>,
}

/// Encoder for finished stress logs
pub struct StressLogEncoder {
    instance_id: String,
}

impl Default for StressLogEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl StressLogEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Build the payload for a session log
    pub fn encode(&self, log: &StressLog) -> StressLogPayload {
        let producer = PayloadProducer {
            name: PRODUCER_NAME.to_string(),
            version: SIGNALS_VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        let session = PayloadSession {
            session_id: log.session_id().to_string(),
            started_at_utc: log.started_at_utc().to_rfc3339(),
            computed_at_utc: Utc::now().to_rfc3339(),
            last_point_ms: log.points().iter().map(|p| p.timestamp_ms).max(),
        };

        StressLogPayload {
            schema_version: PAYLOAD_SCHEMA_VERSION.to_string(),
            producer,
            session,
            summary: log.summary(),
            points: log.points().to_vec(),
        }
    }

    /// Encode to a pretty-printed JSON string
    pub fn encode_to_json(&self, log: &StressLog) -> Result<String, ComputeError> {
        let payload = self.encode(log);
        serde_json::to_string_pretty(&payload).map_err(|e| ComputeError::EncodingError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{StressScoreComponents, StressState};
    use chrono::TimeZone;

    fn sample_log() -> StressLog {
        let started = Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap();
        let mut log = StressLog::new(Uuid::nil(), started);
        log.append(StressPoint {
            timestamp_ms: 0,
            state: StressState::Calm,
            confidence: 0.9,
            components: StressScoreComponents::new(0.95, 0.05, 0.0, 0.0),
            question_ref: None,
        });
        log.append(StressPoint {
            timestamp_ms: 1200,
            state: StressState::Vigilance,
            confidence: 0.7,
            components: StressScoreComponents::new(0.95, 0.05, 0.0, 0.0),
            question_ref: Some("q-42".to_string()),
        });
        log
    }

    #[test]
    fn test_encode_payload() {
        let encoder = StressLogEncoder::with_instance_id("test-instance".to_string());
        let payload = encoder.encode(&sample_log());

        assert_eq!(payload.schema_version, "1.0.0");
        assert_eq!(payload.producer.name, PRODUCER_NAME);
        assert_eq!(payload.producer.instance_id, "test-instance");
        assert_eq!(payload.session.session_id, Uuid::nil().to_string());
        assert_eq!(payload.session.started_at_utc, "2024-03-04T10:00:00+00:00");
        assert_eq!(payload.session.last_point_ms, Some(1200));
        assert_eq!(payload.points.len(), 2);
        assert_eq!(payload.summary.question_points, 1);
    }

    #[test]
    fn test_encode_to_json() {
        let json = StressLogEncoder::new().encode_to_json(&sample_log()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["producer"]["name"], PRODUCER_NAME);
        assert_eq!(value["points"][0]["state"], "calm");
        assert_eq!(value["points"][1]["questionRef"], "q-42");
        assert_eq!(value["summary"]["dominant_state"], "calm");
        assert!(value["session"]["computed_at_utc"].is_string());
    }

    #[test]
    fn test_empty_log() {
        let payload = StressLogEncoder::new().encode(&StressLog::begin());
        assert!(payload.points.is_empty());
        assert_eq!(payload.session.last_point_ms, None);
    }
}
