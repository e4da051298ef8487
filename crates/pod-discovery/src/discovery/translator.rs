//! Translation of watch actions into synchronization events.

use std::fmt;
use std::sync::Arc;

use error_stack::Report;
use target_types::SyncEvent;
use tokio::sync::mpsc;

use crate::discovery::error::DiscoveryError;
use crate::discovery::sync_key::build_sync_key;
use crate::discovery::sync_key::POD_KIND;
use crate::discovery::types::Pod;
use crate::infrastructure::metrics::SectionMetrics;

/// Action carried by a watch notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchAction {
    Added,
    Modified,
    Deleted,
    Error,
}

impl WatchAction {
    /// Parses the raw action string of a watch event.
    pub fn parse(action: &str) -> Option<Self> {
        match action {
            "ADDED" => Some(Self::Added),
            "MODIFIED" => Some(Self::Modified),
            "DELETED" => Some(Self::Deleted),
            "ERROR" => Some(Self::Error),
            _ => None,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "ADDED",
            Self::Modified => "MODIFIED",
            Self::Deleted => "DELETED",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for WatchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receives diagnostics about input the translator cannot act on.
pub trait DiagnosticReporter: Send + Sync {
    fn unexpected_action(&self, section: &str, action: &str);
}

/// Reports diagnostics through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl DiagnosticReporter for TracingReporter {
    fn unexpected_action(&self, section: &str, action: &str) {
        tracing::warn!(section = %section, "unexpected action: {action}");
    }
}

/// Turns pod watch notifications of one discovery section into
/// [`SyncEvent`]s on the section's channel.
///
/// The translator keeps no state between calls. Sending waits for channel
/// capacity, so a slow consumer slows down the caller.
pub struct EventTranslator {
    section: String,
    sender: mpsc::Sender<SyncEvent>,
    reporter: Arc<dyn DiagnosticReporter>,
    metrics: Arc<SectionMetrics>,
}

impl EventTranslator {
    pub fn new(
        section: impl Into<String>,
        sender: mpsc::Sender<SyncEvent>,
        reporter: Arc<dyn DiagnosticReporter>,
        metrics: Arc<SectionMetrics>,
    ) -> Self {
        Self {
            section: section.into(),
            sender,
            reporter,
            metrics,
        }
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    /// Whether the consuming side of the channel has been dropped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Handles one watch notification for `pod`.
    ///
    /// `ADDED` and `MODIFIED` emit an upsert with freshly synthesized labels,
    /// `DELETED` emits a tombstone. `ERROR` and unknown actions emit nothing;
    /// unknown actions are reported to the diagnostic reporter.
    ///
    /// # Errors
    ///
    /// - [`DiscoveryError::ChannelClosed`] if the consumer has gone away
    pub async fn process_pod(&self, pod: &Pod, action: &str) -> Result<(), Report<DiscoveryError>> {
        let event = match WatchAction::parse(action) {
            Some(WatchAction::Added | WatchAction::Modified) => {
                self.metrics.record_upsert();
                SyncEvent::upsert(pod.target_labels(), self.sync_key(pod), self.section.clone())
            }
            Some(WatchAction::Deleted) => {
                self.metrics.record_tombstone();
                SyncEvent::tombstone(self.sync_key(pod), self.section.clone())
            }
            Some(WatchAction::Error) => {
                // stream-level signal, the watch loop handles it
                self.metrics.record_error_action();
                return Ok(());
            }
            None => {
                self.metrics.record_unexpected_action();
                self.reporter.unexpected_action(&self.section, action);
                return Ok(());
            }
        };

        tracing::debug!(section = %self.section, "{event}");
        self.sender.send(event).await.map_err(|_| {
            Report::new(DiscoveryError::ChannelClosed {
                section: self.section.clone(),
            })
        })
    }

    fn sync_key(&self, pod: &Pod) -> String {
        build_sync_key(POD_KIND, &self.section, &pod.key())
    }
}
