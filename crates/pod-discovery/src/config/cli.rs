use clap::{Parser, Subcommand};
use utils::version;

use crate::config::daemon::DaemonArgs;
use crate::config::tools::{ReplayArgs, TargetsArgs};

#[derive(Parser)]
#[command(about, long_about, version = &**version::VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Watch the cluster and maintain the scrape-target set
    Daemon(Box<DaemonArgs>),
    /// Print the targets synthesized from a pod list file
    Targets(TargetsArgs),
    /// Replay a recorded watch stream and print the resulting target set
    Replay(ReplayArgs),
}
