//! Discovery counters and their periodic reporting.
//!
//! Counters are created once at startup and handed to each section's
//! translator and reconciler; the reporter task reads them and writes one
//! encoded line per section on the `metrics` tracing target.

use std::collections::BTreeMap;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use tokio_util::sync::CancellationToken;

pub mod encoders;
use encoders::create_encoder;

/// Counters for one discovery section.
#[derive(Debug, Default)]
pub struct SectionMetrics {
    upserts: AtomicU64,
    tombstones: AtomicU64,
    error_actions: AtomicU64,
    unexpected_actions: AtomicU64,
    active_targets: AtomicU64,
}

/// Point-in-time copy of [`SectionMetrics`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionSnapshot {
    pub upserts: u64,
    pub tombstones: u64,
    pub error_actions: u64,
    pub unexpected_actions: u64,
    pub active_targets: u64,
}

impl SectionMetrics {
    pub fn record_upsert(&self) {
        self.upserts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_tombstone(&self) {
        self.tombstones.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error_action(&self) {
        self.error_actions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unexpected_action(&self) {
        self.unexpected_actions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_active_targets(&self, count: usize) {
        self.active_targets.store(count as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> SectionSnapshot {
        SectionSnapshot {
            upserts: self.upserts.load(Ordering::Relaxed),
            tombstones: self.tombstones.load(Ordering::Relaxed),
            error_actions: self.error_actions.load(Ordering::Relaxed),
            unexpected_actions: self.unexpected_actions.load(Ordering::Relaxed),
            active_targets: self.active_targets.load(Ordering::Relaxed),
        }
    }
}

/// Process-wide registry of per-section counters.
#[derive(Debug, Default)]
pub struct DiscoveryMetrics {
    sections: BTreeMap<String, Arc<SectionMetrics>>,
}

impl DiscoveryMetrics {
    pub fn new<I, S>(sections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sections: sections
                .into_iter()
                .map(|name| (name.into(), Arc::default()))
                .collect(),
        }
    }

    /// Counters of the named section, if it was registered.
    pub fn section(&self, name: &str) -> Option<Arc<SectionMetrics>> {
        self.sections.get(name).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SectionMetrics)> {
        self.sections
            .iter()
            .map(|(name, metrics)| (name.as_str(), metrics.as_ref()))
    }
}

/// Report section counters every `interval` until cancelled.
pub(crate) async fn run_metrics(
    metrics: Arc<DiscoveryMetrics>,
    interval: Duration,
    metrics_format: &str,
    cancellation_token: CancellationToken,
) {
    let encoder = create_encoder(metrics_format);
    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancellation_token.cancelled() => {
                tracing::info!("Metrics reporting shutdown requested");
                break;
            }
            _ = ticker.tick() => {
                let timestamp = current_time();
                for (section, section_metrics) in metrics.iter() {
                    let metrics_str =
                        encoder.encode_section_metrics(section, &section_metrics.snapshot(), timestamp);
                    tracing::info!(target: "metrics", "{metrics_str}");
                }
            }
        }
    }
}

fn current_time() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as i64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use super::*;

    #[test]
    fn counters_are_tracked_per_section() {
        let metrics = DiscoveryMetrics::new(["a", "b"]);
        let a = metrics.section("a").unwrap();

        a.record_upsert();
        a.record_upsert();
        a.record_tombstone();
        a.record_unexpected_action();
        a.set_active_targets(4);

        assert_eq!(
            a.snapshot(),
            SectionSnapshot {
                upserts: 2,
                tombstones: 1,
                error_actions: 0,
                unexpected_actions: 1,
                active_targets: 4,
            }
        );
        assert_eq!(metrics.section("b").unwrap().snapshot(), SectionSnapshot::default());
        assert!(metrics.section("c").is_none());
    }

    #[test]
    fn section_handles_share_counters() {
        let metrics = DiscoveryMetrics::new(["a"]);

        metrics.section("a").unwrap().record_error_action();

        assert_eq!(metrics.section("a").unwrap().snapshot().error_actions, 1);
        let names: Vec<_> = metrics.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["a"]);
    }

    #[tokio::test]
    async fn run_metrics_stops_on_cancellation() {
        let token = CancellationToken::new();
        token.cancel();

        tokio::time::timeout(
            Duration::from_secs(1),
            run_metrics(
                Arc::new(DiscoveryMetrics::new(["a"])),
                Duration::from_millis(10),
                "influx",
                token,
            ),
        )
        .await
        .unwrap();
    }
}
