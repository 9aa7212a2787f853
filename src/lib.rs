//! Session Signals - behavioral stress and identity signals for counselling sessions
//!
//! The crate turns externally computed pose landmarks and face descriptors into
//! two signals through deterministic, frame-synchronous stages:
//!
//! - **Stress pipeline**: pose frame → feature extraction → state classification
//!   → throttled aggregation → timestamped stress log
//! - **Identity matching**: face descriptor + enrolled gallery → match or new identity
//!
//! Pose estimation and face embedding happen outside this crate, as do
//! persistence and presentation of the results.

pub mod aggregator;
pub mod classifier;
pub mod config;
pub mod encoder;
pub mod error;
pub mod features;
pub mod identity;
pub mod landmarks;
pub mod pipeline;
pub mod stress_log;
pub mod types;

pub use config::SessionConfig;
pub use error::ComputeError;
pub use identity::{Gallery, IdentityMatcher, SharedGallery};
pub use landmarks::{Landmark, PoseFrame};
pub use pipeline::{CapabilityProvider, SessionMonitor};
pub use stress_log::{StressLog, StressSummary};
pub use types::{
    FaceDescriptor, GalleryEntry, MatchResult, QuestionEvent, StressPoint, StressScoreComponents,
    StressState,
};

/// Crate version embedded in hand-off payloads
pub const SIGNALS_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for hand-off payloads
pub const PRODUCER_NAME: &str = "session-signals";
