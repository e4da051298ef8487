//! Merges synchronization events into the live scrape-target set.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use target_types::LabelSet;
use target_types::SyncEvent;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::infrastructure::metrics::SectionMetrics;

/// Effect of applying one event to a [`TargetSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Inserted,
    Updated,
    Removed,
    Unchanged,
}

/// Scrape targets keyed by sync key.
///
/// Applying the same event twice leaves the set as the first application did,
/// so duplicate deliveries and resyncs are harmless.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TargetSet {
    targets: BTreeMap<String, Vec<LabelSet>>,
}

impl TargetSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies an upsert or tombstone.
    ///
    /// An upsert without any label set removes the key, the resource has
    /// nothing left to scrape.
    pub fn apply(&mut self, event: SyncEvent) -> Change {
        match event.labels {
            Some(labels) if !labels.is_empty() => match self.targets.get_mut(&event.key) {
                Some(existing) if *existing == labels => Change::Unchanged,
                Some(existing) => {
                    *existing = labels;
                    Change::Updated
                }
                None => {
                    self.targets.insert(event.key, labels);
                    Change::Inserted
                }
            },
            _ => match self.targets.remove(&event.key) {
                Some(_) => Change::Removed,
                None => Change::Unchanged,
            },
        }
    }

    pub fn get(&self, key: &str) -> Option<&[LabelSet]> {
        self.targets.get(key).map(Vec::as_slice)
    }

    /// Number of resources with at least one target.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Total number of scrape targets across all resources.
    pub fn target_count(&self) -> usize {
        self.targets.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[LabelSet])> {
        self.targets
            .iter()
            .map(|(key, labels)| (key.as_str(), labels.as_slice()))
    }
}

/// Consume the section's events until the channel closes or cancellation.
///
/// Returns the target set as it stood when the loop ended.
pub async fn run_reconciler(
    section: &str,
    mut receiver: mpsc::Receiver<SyncEvent>,
    metrics: Arc<SectionMetrics>,
    cancellation_token: CancellationToken,
) -> TargetSet {
    let mut targets = TargetSet::new();

    loop {
        tokio::select! {
            _ = cancellation_token.cancelled() => {
                tracing::info!(section = %section, "Reconciler shutdown requested");
                break;
            }
            event = receiver.recv() => {
                let Some(event) = event else {
                    tracing::info!(section = %section, "Event channel closed");
                    break;
                };
                let key = event.key.clone();
                let change = targets.apply(event);
                if change != Change::Unchanged {
                    tracing::debug!(section = %section, key = %key, ?change, "Target set changed");
                    metrics.set_active_targets(targets.target_count());
                }
            }
        }
    }

    targets
}
