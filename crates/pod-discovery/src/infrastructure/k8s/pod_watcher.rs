use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use error_stack::Report;
use futures::stream;
use futures::StreamExt;
use k8s_openapi::api::core::v1::Pod as ApiPod;
use kube::runtime::watcher;
use kube::Api;
use kube::Client;
use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::config::SectionConfig;
use crate::discovery::EventTranslator;
use crate::discovery::Pod;
use crate::discovery::WatchAction;
use crate::infrastructure::k8s::types::KubernetesError;
use crate::infrastructure::kube_client;

/// Pause between a failed watch and the next attempt.
const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Watches the pods selected by one discovery section.
///
/// Every pod notification is handed to the section's translator. Reconnects
/// and restarts live here; the translator only ever sees single actions.
pub struct SectionWatcher {
    section: SectionConfig,
    kubeconfig: Option<PathBuf>,
}

impl SectionWatcher {
    pub fn new(section: SectionConfig, kubeconfig: Option<PathBuf>) -> Self {
        Self {
            section,
            kubeconfig,
        }
    }

    /// Start watching pods for changes.
    ///
    /// This method runs until cancelled or until the translator's consumer
    /// goes away. A failed watch is retried after a short delay.
    ///
    /// # Errors
    ///
    /// - [`KubernetesError::ConnectionFailed`] if no client can be created
    #[tracing::instrument(skip_all, fields(section = %self.section.name))]
    pub async fn run(
        &self,
        translator: EventTranslator,
        cancellation_token: CancellationToken,
    ) -> Result<(), Report<KubernetesError>> {
        info!("Starting pod watcher");
        let client = kube_client::init_kube_client(self.kubeconfig.clone()).await?;
        // survives reconnects so a relist can retire pods lost in between
        let mut known = KnownPods::default();
        loop {
            select! {
                _ = cancellation_token.cancelled() => {
                    info!("Pod watcher shutdown requested");
                    break;
                }
                result = self.watch_pods(&client, &translator, &mut known) => {
                    if translator.is_closed() {
                        warn!("Event consumer is gone, stopping pod watcher");
                        break;
                    }
                    match result {
                        Ok(()) => {
                            warn!("Pod watch stream ended unexpectedly, restarting...");
                        }
                        Err(e) => {
                            error!("Pod watch failed: {e:?}");
                            select! {
                                _ = cancellation_token.cancelled() => break,
                                _ = tokio::time::sleep(RETRY_DELAY) => {}
                            }
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Watch pods and process events.
    ///
    /// # Errors
    ///
    /// - [`KubernetesError::WatchFailed`] if the watch stream fails
    async fn watch_pods(
        &self,
        client: &Client,
        translator: &EventTranslator,
        known: &mut KnownPods,
    ) -> Result<(), Report<KubernetesError>> {
        let config = self.watcher_config();
        let watches = self
            .apis(client)
            .into_iter()
            .enumerate()
            .map(|(stream, api)| {
                watcher::watcher(api, config.clone())
                    .map(move |event| (stream, event))
                    .boxed()
            });
        let mut events = stream::select_all(watches);

        while let Some((stream, event)) = events.next().await {
            let event = event.map_err(|e| {
                Report::new(KubernetesError::WatchFailed {
                    message: format!("Watch stream error: {e}"),
                })
            })?;

            for (action, pod) in known.actions(stream, event) {
                debug!(action = %action, pod = %pod.key(), "Pod event");
                if let Err(e) = translator.process_pod(&pod, action.as_str()).await {
                    error!("Failed to handle pod event: {e:?}");
                    return Ok(());
                }
            }
        }

        Ok(())
    }

    fn apis(&self, client: &Client) -> Vec<Api<ApiPod>> {
        if self.section.namespaces.is_empty() {
            return vec![Api::all(client.clone())];
        }
        self.section
            .namespaces
            .iter()
            .map(|ns| Api::namespaced(client.clone(), ns))
            .collect()
    }

    fn watcher_config(&self) -> watcher::Config {
        let mut config = watcher::Config::default();
        if let Some(label) = &self.section.selectors.label {
            config = config.labels(label);
        }
        if let Some(field) = &self.section.selectors.field {
            config = config.fields(field);
        }
        config
    }
}

/// Pods last seen on each watch stream, keyed by [`Pod::key`].
///
/// Streams are identified by their position in [`SectionWatcher::apis`],
/// which is stable for the lifetime of a watcher.
#[derive(Debug, Default)]
struct KnownPods {
    streams: BTreeMap<usize, BTreeMap<String, Pod>>,
}

impl KnownPods {
    /// Maps a watcher event onto the watch actions understood by the
    /// translator.
    ///
    /// The watcher does not tell additions from modifications, so applied
    /// objects are reported as `MODIFIED`; both produce the same upsert. A
    /// restart relists the stream: pods missing from the new list are
    /// reported as `DELETED`, then every listed pod as `ADDED`.
    fn actions(&mut self, stream: usize, event: watcher::Event<ApiPod>) -> Vec<(WatchAction, Pod)> {
        let known = self.streams.entry(stream).or_default();
        match event {
            watcher::Event::Applied(pod) => {
                let pod = Pod::from(pod);
                known.insert(pod.key(), pod.clone());
                vec![(WatchAction::Modified, pod)]
            }
            watcher::Event::Deleted(pod) => {
                let pod = Pod::from(pod);
                known.remove(&pod.key());
                vec![(WatchAction::Deleted, pod)]
            }
            watcher::Event::Restarted(pods) => {
                let listed: BTreeMap<String, Pod> = pods
                    .into_iter()
                    .map(|pod| {
                        let pod = Pod::from(pod);
                        (pod.key(), pod)
                    })
                    .collect();
                let previous = std::mem::replace(known, listed.clone());

                let mut actions: Vec<_> = previous
                    .into_iter()
                    .filter(|(key, _)| !listed.contains_key(key))
                    .map(|(_, pod)| (WatchAction::Deleted, pod))
                    .collect();
                actions.extend(listed.into_values().map(|pod| (WatchAction::Added, pod)));
                actions
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use similar_asserts::assert_eq;

    use super::*;
    use crate::config::Selectors;

    fn create_test_pod(name: &str) -> ApiPod {
        ApiPod {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some("default".to_string()),
                ..Default::default()
            },
            spec: None,
            status: None,
        }
    }

    fn keys(actions: &[(WatchAction, Pod)]) -> Vec<(WatchAction, String)> {
        actions
            .iter()
            .map(|(action, pod)| (*action, pod.key()))
            .collect()
    }

    #[test]
    fn applied_maps_to_modified() {
        let actions = KnownPods::default().actions(0, watcher::Event::Applied(create_test_pod("a")));

        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].0, WatchAction::Modified);
        assert_eq!(actions[0].1.key(), "default/a");
    }

    #[test]
    fn deleted_maps_to_deleted() {
        let actions = KnownPods::default().actions(0, watcher::Event::Deleted(create_test_pod("a")));

        assert_eq!(actions[0].0, WatchAction::Deleted);
    }

    #[test]
    fn restart_relists_every_pod_as_added() {
        let actions = KnownPods::default().actions(
            0,
            watcher::Event::Restarted(vec![create_test_pod("a"), create_test_pod("b")]),
        );

        assert_eq!(
            keys(&actions),
            vec![
                (WatchAction::Added, "default/a".to_string()),
                (WatchAction::Added, "default/b".to_string()),
            ]
        );
    }

    #[test]
    fn relist_tombstones_pods_missing_since_last_list() {
        let mut known = KnownPods::default();
        known.actions(
            0,
            watcher::Event::Restarted(vec![create_test_pod("a"), create_test_pod("b")]),
        );

        let actions = known.actions(0, watcher::Event::Restarted(vec![create_test_pod("a")]));

        assert_eq!(
            keys(&actions),
            vec![
                (WatchAction::Deleted, "default/b".to_string()),
                (WatchAction::Added, "default/a".to_string()),
            ]
        );
    }

    #[test]
    fn relist_tombstones_applied_pods_and_forgets_deleted_ones() {
        let mut known = KnownPods::default();
        known.actions(0, watcher::Event::Restarted(vec![create_test_pod("a")]));
        known.actions(0, watcher::Event::Applied(create_test_pod("b")));
        known.actions(0, watcher::Event::Applied(create_test_pod("c")));
        known.actions(0, watcher::Event::Deleted(create_test_pod("a")));

        let actions = known.actions(0, watcher::Event::Restarted(vec![create_test_pod("c")]));

        assert_eq!(
            keys(&actions),
            vec![
                (WatchAction::Deleted, "default/b".to_string()),
                (WatchAction::Added, "default/c".to_string()),
            ]
        );
    }

    #[test]
    fn relist_only_affects_its_own_stream() {
        let mut known = KnownPods::default();
        known.actions(0, watcher::Event::Restarted(vec![create_test_pod("a")]));
        known.actions(1, watcher::Event::Restarted(vec![create_test_pod("b")]));

        let actions = known.actions(1, watcher::Event::Restarted(Vec::new()));

        assert_eq!(
            keys(&actions),
            vec![(WatchAction::Deleted, "default/b".to_string())]
        );
        let actions = known.actions(0, watcher::Event::Restarted(vec![create_test_pod("a")]));
        assert_eq!(
            keys(&actions),
            vec![(WatchAction::Added, "default/a".to_string())]
        );
    }

    #[test]
    fn watcher_config_carries_selectors() {
        let watcher = SectionWatcher::new(
            SectionConfig {
                name: "a".to_string(),
                namespaces: Vec::new(),
                selectors: Selectors {
                    label: Some("app=web".to_string()),
                    field: Some("spec.nodeName=node-1".to_string()),
                },
            },
            None,
        );

        let config = watcher.watcher_config();

        assert_eq!(config.label_selector.as_deref(), Some("app=web"));
        assert_eq!(config.field_selector.as_deref(), Some("spec.nodeName=node-1"));
    }
}
