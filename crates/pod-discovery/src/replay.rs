//! Offline runs of the discovery pipeline over recorded payloads.

use std::sync::Arc;

use error_stack::Report;
use error_stack::ResultExt;
use serde::Serialize;
use target_types::LabelSet;
use target_types::SyncEvent;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::discovery::parse_pod_list;
use crate::discovery::parse_watch_event;
use crate::discovery::run_reconciler;
use crate::discovery::watch_event_pod;
use crate::discovery::DiagnosticReporter;
use crate::discovery::DiscoveryError;
use crate::discovery::EventTranslator;
use crate::discovery::TargetSet;
use crate::infrastructure::metrics::SectionMetrics;

/// Targets synthesized for one pod of a pod list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PodTargets {
    pub pod: String,
    pub targets: Vec<LabelSet>,
}

/// Decodes a pod list and synthesizes the targets of every pod.
///
/// # Errors
///
/// - [`DiscoveryError::Decode`] if `data` is not a valid pod list
pub fn pod_targets(data: &[u8]) -> Result<Vec<PodTargets>, Report<DiscoveryError>> {
    let list = parse_pod_list(data)?;
    Ok(list
        .items
        .iter()
        .map(|pod| PodTargets {
            pod: pod.key(),
            targets: pod.target_labels(),
        })
        .collect())
}

/// Feeds newline-delimited watch events through a translator and reconciler
/// for `section` and returns the resulting target set.
///
/// Blank lines are skipped. `ERROR` lines are counted and otherwise ignored,
/// whatever status object they carry. The channel between translator and reconciler is
/// bounded by `capacity`, as in the daemon.
///
/// # Errors
///
/// - [`DiscoveryError::Decode`] for the first line that is not a valid watch
///   event; the line number is attached
pub async fn replay_events(
    data: &[u8],
    section: &str,
    capacity: usize,
    reporter: Arc<dyn DiagnosticReporter>,
    metrics: Arc<SectionMetrics>,
) -> Result<TargetSet, Report<DiscoveryError>> {
    let (sender, receiver) = mpsc::channel::<SyncEvent>(capacity.max(1));
    let translator = EventTranslator::new(section, sender, reporter, metrics.clone());

    let feed = async move {
        for (index, line) in data.split(|b| *b == b'\n').enumerate() {
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            let event = parse_watch_event(line)
                .attach_printable_lazy(|| format!("line {}", index + 1))?;
            let pod = watch_event_pod(&event)
                .attach_printable_lazy(|| format!("line {}", index + 1))?
                .unwrap_or_default();
            translator.process_pod(&pod, &event.action).await?;
        }
        // dropping the translator closes the channel and ends the reconciler
        Ok::<_, Report<DiscoveryError>>(())
    };

    let (fed, targets) = tokio::join!(
        feed,
        run_reconciler(section, receiver, metrics, CancellationToken::new())
    );
    fed?;
    Ok(targets)
}
