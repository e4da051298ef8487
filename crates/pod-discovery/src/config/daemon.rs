use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Clone, Debug)]
pub struct DaemonArgs {
    #[arg(
        long,
        env = "POD_DISCOVERY_CONFIG",
        value_hint = clap::ValueHint::FilePath,
        help = "Path for the discovery section file, e.g. /etc/pod-discovery/sections.yaml"
    )]
    pub config: PathBuf,

    #[arg(
        long,
        env = "KUBECONFIG",
        value_hint = clap::ValueHint::FilePath,
        help = "Path to kubeconfig file (defaults to cluster config or ~/.kube/config)"
    )]
    pub kubeconfig: Option<PathBuf>,

    #[arg(
        long,
        env = "DISCOVERY_CHANNEL_CAPACITY",
        default_value = "1024",
        help = "Capacity of each section's event channel; a full channel pauses its watcher"
    )]
    pub channel_capacity: usize,

    #[arg(
        long,
        env = "DISCOVERY_METRICS_FILE",
        value_hint = clap::ValueHint::FilePath,
        default_value = "/logs/discovery-metrics.log",
        help = "Path for printing discovery metrics, e.g. /logs/discovery-metrics.log"
    )]
    pub metrics_file: PathBuf,

    #[arg(
        long,
        env = "DISCOVERY_METRICS_FORMAT",
        default_value = "influx",
        help = "Metrics output format: influx or json"
    )]
    pub metrics_format: String,

    #[arg(
        long,
        env = "DISCOVERY_METRICS_INTERVAL_SECS",
        default_value = "30",
        help = "Seconds between two metrics reports"
    )]
    pub metrics_interval_secs: u64,
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use clap::CommandFactory;
    use similar_asserts::assert_eq;

    use super::*;

    fn env_of(id: &str) -> Option<String> {
        DaemonArgs::command()
            .get_arguments()
            .find(|arg| arg.get_id() == id)
            .and_then(|arg| arg.get_env())
            .map(|env| env.to_string_lossy().into_owned())
    }

    #[test]
    fn every_tunable_has_an_env_fallback() {
        assert_eq!(env_of("config").as_deref(), Some("POD_DISCOVERY_CONFIG"));
        assert_eq!(env_of("kubeconfig").as_deref(), Some("KUBECONFIG"));
        assert_eq!(
            env_of("channel_capacity").as_deref(),
            Some("DISCOVERY_CHANNEL_CAPACITY")
        );
        assert_eq!(env_of("metrics_file").as_deref(), Some("DISCOVERY_METRICS_FILE"));
        assert_eq!(
            env_of("metrics_format").as_deref(),
            Some("DISCOVERY_METRICS_FORMAT")
        );
        assert_eq!(
            env_of("metrics_interval_secs").as_deref(),
            Some("DISCOVERY_METRICS_INTERVAL_SECS")
        );
    }

    #[test]
    fn defaults_apply_without_flags() {
        let args = DaemonArgs::try_parse_from([
            "daemon",
            "--config",
            "sections.yaml",
            "--metrics-format",
            "json",
        ])
        .unwrap();

        assert_eq!(args.channel_capacity, 1024);
        assert_eq!(args.metrics_file, Path::new("/logs/discovery-metrics.log"));
        assert_eq!(args.metrics_format, "json");
        assert_eq!(args.metrics_interval_secs, 30);
    }
}
