//! Face-descriptor identity matching
//!
//! Nearest-neighbor search over an ordered gallery of enrolled descriptors.
//! The scan is linear and deterministic: for a fixed gallery order the same
//! query always yields the same result, and equal distances resolve to the
//! first entry encountered.

use crate::config::{SessionConfig, DEFAULT_MATCH_THRESHOLD};
use crate::error::ComputeError;
use crate::types::{FaceDescriptor, GalleryEntry, MatchResult};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Euclidean distance between two descriptors
///
/// Returns `None` when lengths differ or the result is not finite, so such
/// pairs can never be the nearest match.
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.len() != b.len() {
        return None;
    }
    let sum: f64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| (f64::from(*x) - f64::from(*y)).powi(2))
        .sum();
    let distance = sum.sqrt();
    distance.is_finite().then_some(distance)
}

/// Threshold-based nearest-neighbor matcher
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdentityMatcher {
    threshold: f64,
}

impl Default for IdentityMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_MATCH_THRESHOLD)
    }
}

impl IdentityMatcher {
    /// Create a matcher accepting distances strictly below `threshold`
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Matcher using the deployment's configured `match_threshold`
    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.match_threshold)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Find the nearest gallery entry to `query`
    ///
    /// An empty query, an empty gallery, or no entry closer than the
    /// threshold all produce a new-identity result rather than an error.
    pub fn match_descriptor(&self, query: &FaceDescriptor, gallery: &[GalleryEntry]) -> MatchResult {
        if query.is_empty() {
            return MatchResult::new_identity(f64::INFINITY);
        }

        let mut best: Option<&GalleryEntry> = None;
        let mut best_distance = f64::INFINITY;
        let mut skipped = 0usize;

        for entry in gallery {
            let Some(distance) = euclidean_distance(query.as_slice(), entry.descriptor.as_slice())
            else {
                skipped += 1;
                continue;
            };
            // Strict comparison keeps the first entry on ties
            if distance < best_distance {
                best_distance = distance;
                best = Some(entry);
            }
        }

        if skipped > 0 {
            warn!(
                skipped,
                query_len = query.len(),
                "gallery entries with incomparable descriptors skipped"
            );
        }

        match best {
            Some(entry) if best_distance < self.threshold => {
                debug!(
                    identity_ref = %entry.identity_ref,
                    distance = best_distance,
                    "descriptor matched"
                );
                MatchResult::matched(entry.identity_ref.clone(), best_distance)
            }
            _ => {
                debug!(
                    nearest = best_distance,
                    gallery_size = gallery.len(),
                    "no identity within threshold"
                );
                MatchResult::new_identity(best_distance)
            }
        }
    }
}

/// Ordered collection of enrolled descriptors
///
/// Enrollment appends without deduplication; one identity may own several
/// descriptors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Gallery {
    entries: Vec<GalleryEntry>,
}

impl Gallery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<GalleryEntry>) -> Self {
        Self { entries }
    }

    /// Append a descriptor for `identity_ref`
    pub fn enroll(&mut self, descriptor: FaceDescriptor, identity_ref: impl Into<String>) {
        self.entries.push(GalleryEntry::new(descriptor, identity_ref));
    }

    /// Append a descriptor carrying caller metadata
    pub fn enroll_with_metadata(
        &mut self,
        descriptor: FaceDescriptor,
        identity_ref: impl Into<String>,
        metadata: HashMap<String, serde_json::Value>,
    ) {
        let mut entry = GalleryEntry::new(descriptor, identity_ref);
        entry.metadata = metadata;
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[GalleryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Descriptors enrolled for one identity, in enrollment order
    pub fn descriptors_for<'a>(
        &'a self,
        identity_ref: &'a str,
    ) -> impl Iterator<Item = &'a FaceDescriptor> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.identity_ref == identity_ref)
            .map(|e| &e.descriptor)
    }

    /// Number of distinct identities
    pub fn identity_count(&self) -> usize {
        self.entries
            .iter()
            .map(|e| e.identity_ref.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Load a gallery snapshot from JSON
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the gallery to JSON
    pub fn to_json(&self) -> Result<String, ComputeError> {
        serde_json::to_string(self).map_err(ComputeError::JsonError)
    }
}

/// Gallery shared between concurrent matchers and an enrolling writer
///
/// Each match holds the read lock for its whole scan, so it observes one
/// consistent snapshot even while another thread enrolls.
#[derive(Debug, Clone, Default)]
pub struct SharedGallery {
    inner: Arc<RwLock<Gallery>>,
}

impl SharedGallery {
    pub fn new(gallery: Gallery) -> Self {
        Self {
            inner: Arc::new(RwLock::new(gallery)),
        }
    }

    pub fn enroll(&self, descriptor: FaceDescriptor, identity_ref: impl Into<String>) {
        self.inner.write().enroll(descriptor, identity_ref);
    }

    pub fn enroll_with_metadata(
        &self,
        descriptor: FaceDescriptor,
        identity_ref: impl Into<String>,
        metadata: HashMap<String, serde_json::Value>,
    ) {
        self.inner
            .write()
            .enroll_with_metadata(descriptor, identity_ref, metadata);
    }

    /// Match `query` against the current gallery contents
    pub fn match_descriptor(&self, matcher: &IdentityMatcher, query: &FaceDescriptor) -> MatchResult {
        let gallery = self.inner.read();
        matcher.match_descriptor(query, gallery.entries())
    }

    /// Owned copy of the current gallery
    pub fn snapshot(&self) -> Gallery {
        self.inner.read().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}
