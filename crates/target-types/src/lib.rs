//! Shared scrape-target type definitions
//!
//! This crate contains the types exchanged between the pod discovery core and
//! the reconciler that maintains the live scrape-target set: the label set
//! describing one endpoint and the synchronization event carrying upserts and
//! tombstones.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

/// Label name to value mapping for one scrape target.
///
/// Ordered so that serialized output and test expectations are reproducible.
pub type LabelSet = BTreeMap<String, String>;

/// Synchronization event produced for one observed resource.
///
/// `labels` is `Some` for an upsert (possibly with zero label sets when the
/// resource currently exposes no scrape-able endpoint) and `None` for a
/// tombstone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncEvent {
    /// Label sets for every endpoint of the resource, absent on delete
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<LabelSet>>,
    /// Stable key identifying the resource within its kind and section
    pub key: String,
    /// Name of the discovery section that produced the event
    pub section: String,
}

impl SyncEvent {
    /// Creates an upsert event.
    pub fn upsert(labels: Vec<LabelSet>, key: String, section: String) -> Self {
        Self {
            labels: Some(labels),
            key,
            section,
        }
    }

    /// Creates a tombstone event.
    pub fn tombstone(key: String, section: String) -> Self {
        Self {
            labels: None,
            key,
            section,
        }
    }

    pub const fn is_tombstone(&self) -> bool {
        self.labels.is_none()
    }
}

impl std::fmt::Display for SyncEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.labels {
            Some(labels) => write!(f, "upsert {} ({} targets)", self.key, labels.len()),
            None => write!(f, "delete {}", self.key),
        }
    }
}
