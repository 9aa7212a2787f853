//! Temporal aggregation of classifier output
//!
//! Classifier output arrives once per frame. The aggregator thins it into a
//! sparse stress log: at most one sampled point per throttle interval of
//! session-relative time. Samples inside the interval are dropped, never
//! buffered. Question events bypass the throttle entirely.

use crate::classifier::VIGILANCE_CONFIDENCE;
use crate::config::DEFAULT_THROTTLE_INTERVAL_MS;
use crate::types::{
    Classification, QuestionEvent, StressPoint, StressScoreComponents, StressState,
};
use tracing::debug;

/// Throttles classifier output into timestamped stress points
#[derive(Debug, Clone)]
pub struct TemporalAggregator {
    throttle_interval_ms: u64,
    /// Monotonic instant the session started at (ms)
    session_start_ms: u64,
    /// Elapsed time of the last sampled point, `None` until one is emitted
    last_emitted_ms: Option<u64>,
    /// Components of the most recent offered sample
    last_components: Option<StressScoreComponents>,
}

impl Default for TemporalAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_THROTTLE_INTERVAL_MS, 0)
    }
}

impl TemporalAggregator {
    /// Create an aggregator for a session starting at `session_start_ms`
    pub fn new(throttle_interval_ms: u64, session_start_ms: u64) -> Self {
        Self {
            throttle_interval_ms,
            session_start_ms,
            last_emitted_ms: None,
            last_components: None,
        }
    }

    /// Session-relative time; instants before the start count as 0
    pub fn elapsed(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.session_start_ms)
    }

    /// Offer one classifier sample; returns a point only if the throttle allows it
    pub fn offer(
        &mut self,
        classification: Classification,
        components: StressScoreComponents,
        now_ms: u64,
    ) -> Option<StressPoint> {
        self.last_components = Some(components);

        let elapsed = self.elapsed(now_ms);
        let due = match self.last_emitted_ms {
            None => true,
            Some(last) => elapsed.saturating_sub(last) > self.throttle_interval_ms,
        };
        if !due {
            return None;
        }

        self.last_emitted_ms = Some(elapsed);
        debug!(
            elapsed_ms = elapsed,
            state = classification.state.as_str(),
            confidence = classification.confidence,
            "stress point sampled"
        );

        Some(StressPoint {
            timestamp_ms: elapsed,
            state: classification.state,
            confidence: classification.confidence,
            components,
            question_ref: None,
        })
    }

    /// Emit a vigilance point for a question event, ignoring and not touching the throttle
    ///
    /// The event time is read on the same clock as frames and stamped
    /// relative to the session start.
    pub fn force_question(&mut self, event: &QuestionEvent) -> StressPoint {
        let elapsed = self.elapsed(event.timestamp_ms);
        debug!(
            question_ref = %event.question_ref,
            elapsed_ms = elapsed,
            "question point forced"
        );

        StressPoint {
            timestamp_ms: elapsed,
            state: StressState::Vigilance,
            confidence: VIGILANCE_CONFIDENCE,
            components: self.last_components.unwrap_or_default(),
            question_ref: Some(event.question_ref.clone()),
        }
    }

    /// Elapsed time of the last sampled point
    pub fn last_emitted_ms(&self) -> Option<u64> {
        self.last_emitted_ms
    }

    /// Components of the most recent sample, if any
    pub fn last_components(&self) -> Option<StressScoreComponents> {
        self.last_components
    }

    pub fn throttle_interval_ms(&self) -> u64 {
        self.throttle_interval_ms
    }

    /// Restart throttling for a new session starting at `session_start_ms`
    pub fn reset(&mut self, session_start_ms: u64) {
        self.session_start_ms = session_start_ms;
        self.last_emitted_ms = None;
        self.last_components = None;
    }
}
