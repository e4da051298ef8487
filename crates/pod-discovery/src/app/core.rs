use std::sync::Arc;

use anyhow::Result;

use crate::app::tasks::Tasks;
use crate::config::DaemonArgs;
use crate::config::DiscoveryConfig;
use crate::discovery::DiagnosticReporter;
use crate::infrastructure::metrics::DiscoveryMetrics;

/// Application core structure with explicit dependencies
pub struct Application {
    daemon_args: DaemonArgs,
    config: DiscoveryConfig,
    metrics: Arc<DiscoveryMetrics>,
    reporter: Arc<dyn DiagnosticReporter>,
}

impl Application {
    pub fn new(
        daemon_args: DaemonArgs,
        config: DiscoveryConfig,
        metrics: Arc<DiscoveryMetrics>,
        reporter: Arc<dyn DiagnosticReporter>,
    ) -> Self {
        Self {
            daemon_args,
            config,
            metrics,
            reporter,
        }
    }

    pub fn daemon_args(&self) -> &DaemonArgs {
        &self.daemon_args
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<DiscoveryMetrics> {
        &self.metrics
    }

    pub fn reporter(&self) -> &Arc<dyn DiagnosticReporter> {
        &self.reporter
    }

    /// Run application, start all tasks and wait for completion
    pub async fn run(&self) -> Result<()> {
        tracing::info!("Starting all application tasks...");

        let mut tasks = Tasks::new();

        if let Err(e) = tasks.spawn_all_tasks(self) {
            tracing::error!("Failed to spawn application tasks: {}", e);
            return Err(e);
        }

        if let Err(e) = tasks.wait_for_completion().await {
            tracing::error!("Error during task execution: {}", e);
            return Err(e);
        }

        tracing::info!("Application run completed");
        Ok(())
    }
}
