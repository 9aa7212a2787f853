//! Session pipeline orchestration
//!
//! This module provides the public API for per-session stress monitoring.
//! It runs each pose frame through the full pipeline:
//! Feature Extractor → State Classifier → Temporal Aggregator → stress log.
//!
//! Frames for one session must be processed in arrival order, one at a time.
//! Timestamps are caller-supplied milliseconds from a monotonic clock.

use crate::aggregator::TemporalAggregator;
use crate::classifier::classify;
use crate::config::SessionConfig;
use crate::error::ComputeError;
use crate::features::FeatureExtractor;
use crate::identity::IdentityMatcher;
use crate::landmarks::PoseFrame;
use crate::stress_log::StressLog;
use crate::types::{QuestionEvent, StressPoint, StressScoreComponents};
use tracing::{info, warn};

/// External capability (pose or face provider) that must be ready before a session starts
pub trait CapabilityProvider {
    fn name(&self) -> &str;

    /// Bring the provider up; the error string is surfaced to the caller as-is
    fn initialize(&mut self) -> Result<(), String>;
}

/// Stateful monitor for one counselling session
pub struct SessionMonitor {
    config: SessionConfig,
    extractor: FeatureExtractor,
    aggregator: TemporalAggregator,
    /// Present while the session is running
    log: Option<StressLog>,
}

impl Default for SessionMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionMonitor {
    /// Create a stopped monitor with default settings (1000ms throttle, 10 frame movement window)
    pub fn new() -> Self {
        Self::build(SessionConfig::default())
    }

    /// Create a stopped monitor with custom settings
    pub fn with_config(config: SessionConfig) -> Result<Self, ComputeError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: SessionConfig) -> Self {
        Self {
            extractor: FeatureExtractor::new(config.movement_window),
            aggregator: TemporalAggregator::new(config.throttle_interval_ms, 0),
            log: None,
            config,
        }
    }

    /// Start accepting frames, with `now_ms` as the session-start reference
    ///
    /// Starting a running session discards its unsaved log; use [`restart`]
    /// to keep it.
    ///
    /// [`restart`]: SessionMonitor::restart
    pub fn start(&mut self, now_ms: u64) {
        if let Some(previous) = self.log.take() {
            warn!(
                session_id = %previous.session_id(),
                discarded_points = previous.len(),
                "session started while running"
            );
        }

        self.extractor.reset();
        self.aggregator.reset(now_ms);

        let log = StressLog::begin();
        info!(session_id = %log.session_id(), start_ms = now_ms, "session started");
        self.log = Some(log);
    }

    /// Initialize `provider`, then start; a failed provider leaves the monitor stopped
    pub fn start_with_provider(
        &mut self,
        provider: &mut dyn CapabilityProvider,
        now_ms: u64,
    ) -> Result<(), ComputeError> {
        if let Err(reason) = provider.initialize() {
            warn!(provider = provider.name(), %reason, "provider failed to initialize");
            return Err(ComputeError::ProviderInitialization {
                provider: provider.name().to_string(),
                reason,
            });
        }
        self.start(now_ms);
        Ok(())
    }

    /// Stop the session, discard extractor state and hand back its log
    pub fn stop(&mut self) -> Option<StressLog> {
        self.extractor.reset();
        let log = self.log.take();
        if let Some(log) = &log {
            info!(session_id = %log.session_id(), points = log.len(), "session stopped");
        }
        log
    }

    /// Stop and immediately start again, returning the finished log
    pub fn restart(&mut self, now_ms: u64) -> Option<StressLog> {
        let previous = self.stop();
        self.start(now_ms);
        previous
    }

    /// Process one pose frame; returns the stress point if one was sampled
    pub fn process_frame(
        &mut self,
        frame: &PoseFrame,
        now_ms: u64,
    ) -> Result<Option<StressPoint>, ComputeError> {
        let log = self.log.as_mut().ok_or(ComputeError::SessionInactive)?;

        let components = self.extractor.extract(frame, now_ms);
        let classification = classify(&components);
        let point = self.aggregator.offer(classification, components, now_ms);

        if let Some(point) = &point {
            log.append(point.clone());
        }
        Ok(point)
    }

    /// Record a question being asked; always yields a vigilance point
    ///
    /// `event.timestamp_ms` is read on the same clock as `process_frame`.
    pub fn question_asked(&mut self, event: &QuestionEvent) -> Result<StressPoint, ComputeError> {
        let log = self.log.as_mut().ok_or(ComputeError::SessionInactive)?;
        let point = self.aggregator.force_question(event);
        log.append(point.clone());
        Ok(point)
    }

    pub fn is_running(&self) -> bool {
        self.log.is_some()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Identity matcher using this session's configured threshold
    pub fn identity_matcher(&self) -> IdentityMatcher {
        IdentityMatcher::from_config(&self.config)
    }

    /// Log of the running session
    pub fn log(&self) -> Option<&StressLog> {
        self.log.as_ref()
    }

    /// Components of the most recently processed frame
    pub fn last_components(&self) -> Option<StressScoreComponents> {
        if self.is_running() {
            self.aggregator.last_components()
        } else {
            None
        }
    }
}
