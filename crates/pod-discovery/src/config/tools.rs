use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Clone, Debug)]
pub struct TargetsArgs {
    #[arg(
        long,
        value_hint = clap::ValueHint::FilePath,
        help = "JSON pod list, e.g. the output of `kubectl get pods -o json`"
    )]
    pub file: PathBuf,
}

#[derive(Parser, Clone, Debug)]
pub struct ReplayArgs {
    #[arg(
        long,
        value_hint = clap::ValueHint::FilePath,
        help = "Newline-delimited JSON watch events"
    )]
    pub file: PathBuf,

    #[arg(long, default_value = "default", help = "Discovery section name for the replay")]
    pub section: String,

    #[arg(long, default_value = "1024", help = "Capacity of the replay event channel")]
    pub channel_capacity: usize,
}
