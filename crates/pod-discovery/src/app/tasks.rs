use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use anyhow::Result;
use target_types::SyncEvent;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::app::core::Application;
use crate::config::SectionConfig;
use crate::discovery::run_reconciler;
use crate::discovery::EventTranslator;
use crate::infrastructure::k8s::SectionWatcher;
use crate::infrastructure::metrics;

/// Task manager, responsible for starting and managing all background tasks
pub struct Tasks {
    pub tasks: Vec<JoinHandle<()>>,
    cancellation_token: CancellationToken,
}

impl Default for Tasks {
    fn default() -> Self {
        Self::new()
    }
}

impl Tasks {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Start all background tasks
    pub fn spawn_all_tasks(&mut self, app: &Application) -> Result<()> {
        // Each section gets its own channel, watcher and reconciler
        for section in &app.config().sections {
            let capacity = app.daemon_args().channel_capacity.max(1);
            let (event_sender, event_receiver) = mpsc::channel::<SyncEvent>(capacity);

            let section_metrics = app
                .metrics()
                .section(&section.name)
                .with_context(|| format!("no metrics registered for section {}", section.name))?;

            let reconciler_task =
                self.spawn_reconciler_task(section.name.clone(), event_receiver, section_metrics.clone());
            self.tasks.push(reconciler_task);

            let translator = EventTranslator::new(
                section.name.clone(),
                event_sender,
                app.reporter().clone(),
                section_metrics,
            );
            let watcher_task = self.spawn_watcher_task(app, section.clone(), translator);
            self.tasks.push(watcher_task);
        }

        let metrics_task = self.spawn_metrics_task(app);
        self.tasks.push(metrics_task);

        Ok(())
    }

    /// wait for tasks to complete or receive shutdown signal
    pub async fn wait_for_completion(&mut self) -> Result<()> {
        let signal_handler = {
            #[cfg(unix)]
            {
                use tokio::signal::unix::{signal, SignalKind};
                let mut sigterm = signal(SignalKind::terminate())?;
                let mut sigint = signal(SignalKind::interrupt())?;

                tokio::spawn(async move {
                    tokio::select! {
                        _ = sigterm.recv() => {
                            tracing::info!("Received SIGTERM, initiating graceful shutdown");
                        }
                        _ = sigint.recv() => {
                            tracing::info!("Received SIGINT, initiating graceful shutdown");
                        }
                    }
                })
            }
            #[cfg(not(unix))]
            {
                tokio::spawn(async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        tracing::error!("Failed to listen for Ctrl+C: {e}");
                    }
                    tracing::info!("Received Ctrl+C, initiating graceful shutdown");
                })
            }
        };

        tokio::select! {
            _ = signal_handler => {
                tracing::info!("Shutdown signal received, cancelling all tasks");
                self.cancellation_token.cancel();

                self.wait_for_tasks_with_timeout(Duration::from_secs(30)).await;
            }
            result = futures::future::select_all(&mut self.tasks) => {
                let (result, _index, _remaining) = result;
                self.cancellation_token.cancel();
                if let Err(e) = result {
                    tracing::error!("Task completed with error: {e}");
                    return Err(e.into());
                }
                tracing::warn!("Task completed unexpectedly");
            }
        }

        Ok(())
    }

    async fn wait_for_tasks_with_timeout(&mut self, timeout: Duration) {
        tokio::time::timeout(timeout, async {
            for task in &mut self.tasks {
                if let Err(e) = task.await {
                    tracing::error!("Task failed during shutdown: {e}");
                }
            }
        })
        .await
        .unwrap_or_else(|_| {
            tracing::warn!("Task shutdown timed out after {:?}", timeout);
        });
    }

    fn spawn_metrics_task(&self, app: &Application) -> JoinHandle<()> {
        let cli = app.daemon_args();
        let discovery_metrics = app.metrics().clone();
        let interval = Duration::from_secs(cli.metrics_interval_secs.max(1));
        let metrics_format = cli.metrics_format.clone();
        let token = self.cancellation_token.clone();

        tokio::spawn(async move {
            tracing::info!("Starting metrics reporting task");
            metrics::run_metrics(discovery_metrics, interval, &metrics_format, token).await;
            tracing::info!("Metrics reporting task completed");
        })
    }

    fn spawn_watcher_task(
        &self,
        app: &Application,
        section: SectionConfig,
        translator: EventTranslator,
    ) -> JoinHandle<()> {
        let token = self.cancellation_token.clone();
        let section_name = section.name.clone();
        let watcher = SectionWatcher::new(section, app.daemon_args().kubeconfig.clone());
        tokio::spawn(async move {
            tracing::info!(section = %section_name, "Starting pod watcher task");
            if let Err(e) = watcher.run(translator, token).await {
                tracing::error!(section = %section_name, "Pod watcher failed: {e:?}");
            } else {
                tracing::info!(section = %section_name, "Pod watcher completed");
            }
        })
    }

    fn spawn_reconciler_task(
        &self,
        section: String,
        event_receiver: mpsc::Receiver<SyncEvent>,
        section_metrics: Arc<metrics::SectionMetrics>,
    ) -> JoinHandle<()> {
        let token = self.cancellation_token.clone();
        tokio::spawn(async move {
            tracing::info!(section = %section, "Starting reconciler task");
            let targets = run_reconciler(&section, event_receiver, section_metrics, token).await;
            tracing::info!(
                section = %section,
                "Reconciler completed with {} targets",
                targets.target_count()
            );
        })
    }
}
