use std::sync::Arc;

use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use pod_discovery::app::ApplicationBuilder;
use pod_discovery::config::Cli;
use pod_discovery::config::Commands;
use pod_discovery::config::DaemonArgs;
use pod_discovery::config::ReplayArgs;
use pod_discovery::config::TargetsArgs;
use pod_discovery::discovery::TracingReporter;
use pod_discovery::logging;
use pod_discovery::metrics::SectionMetrics;
use pod_discovery::replay;
use utils::version;

/// Sets up global panic hooks.
fn setup_global_hooks() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        default_hook(panic_info);
        tracing::error!("Thread panicked: {}", panic_info);
    }));
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_global_hooks();

    let cli = Cli::parse();

    match cli.command {
        Commands::Daemon(daemon_args) => run_daemon(*daemon_args).await,
        Commands::Targets(targets_args) => run_targets(targets_args).await,
        Commands::Replay(replay_args) => run_replay(replay_args).await,
    }
}

async fn run_daemon(daemon_args: DaemonArgs) -> Result<()> {
    let _guard = logging::init(&daemon_args.metrics_file);

    tracing::info!("Starting pod discovery daemon {}", &**version::VERSION);

    let app = ApplicationBuilder::new(daemon_args).build()?;
    app.run().await?;

    Ok(())
}

async fn run_targets(targets_args: TargetsArgs) -> Result<()> {
    utils::logging::init();

    let data = tokio::fs::read(&targets_args.file)
        .await
        .with_context(|| format!("failed to read {}", targets_args.file.display()))?;
    let targets = replay::pod_targets(&data).map_err(|e| anyhow::anyhow!("{e:?}"))?;

    println!("{}", serde_json::to_string_pretty(&targets)?);
    Ok(())
}

async fn run_replay(replay_args: ReplayArgs) -> Result<()> {
    utils::logging::init();

    let data = tokio::fs::read(&replay_args.file)
        .await
        .with_context(|| format!("failed to read {}", replay_args.file.display()))?;
    let metrics = Arc::new(SectionMetrics::default());
    let targets = replay::replay_events(
        &data,
        &replay_args.section,
        replay_args.channel_capacity,
        Arc::new(TracingReporter),
        metrics.clone(),
    )
    .await
    .map_err(|e| anyhow::anyhow!("{e:?}"))?;

    tracing::info!("Replay finished: {:?}", metrics.snapshot());
    println!("{}", serde_json::to_string_pretty(&targets)?);
    Ok(())
}
