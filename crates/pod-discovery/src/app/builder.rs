use std::sync::Arc;

use anyhow::Result;

use crate::app::core::Application;
use crate::config::DaemonArgs;
use crate::config::DiscoveryConfig;
use crate::discovery::TracingReporter;
use crate::infrastructure::metrics::DiscoveryMetrics;

/// Builds the [`Application`] from daemon arguments.
pub struct ApplicationBuilder {
    daemon_args: DaemonArgs,
}

impl ApplicationBuilder {
    pub fn new(daemon_args: DaemonArgs) -> Self {
        Self { daemon_args }
    }

    /// Load the section file and create the shared services.
    pub fn build(self) -> Result<Application> {
        let config = DiscoveryConfig::load(&self.daemon_args.config)?;
        tracing::info!(
            "Loaded {} discovery section(s) from {}",
            config.sections.len(),
            self.daemon_args.config.display()
        );

        let metrics = Arc::new(DiscoveryMetrics::new(
            config.sections.iter().map(|section| section.name.clone()),
        ));

        Ok(Application::new(
            self.daemon_args,
            config,
            metrics,
            Arc::new(TracingReporter),
        ))
    }
}
