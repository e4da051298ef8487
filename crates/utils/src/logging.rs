//! provides logging helpers

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing::Subscriber;
use tracing_subscriber::filter::{self};
use tracing_subscriber::fmt::layer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

/// Environment variable naming a file that receives the regular log output.
/// Logs go to stderr when it is unset or the file cannot be opened.
pub const LOG_PATH_ENV_VAR: &str = "LOG_PATH";

/// Builds the formatting layer for regular (non-metrics) log output.
pub fn get_fmt_layer<S, P>(log_path: Option<P>) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a> + 'static,
    P: AsRef<Path>,
{
    let file = log_path.and_then(|path| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())
            .ok()
    });

    match file {
        Some(file) => layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_target(true)
            .boxed(),
        None => layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed(),
    }
}

/// initiate the global tracing subscriber
pub fn init() {
    let env_filter = filter::EnvFilter::builder()
        .with_default_directive(filter::LevelFilter::INFO.into())
        .from_env_lossy();

    let fmt_layer = get_fmt_layer(std::env::var(LOG_PATH_ENV_VAR).ok()).with_filter(env_filter);

    registry().with(fmt_layer).init();
}

#[cfg(test)]
mod tests {
    use tracing_subscriber::Registry;

    use super::*;

    #[test]
    fn fmt_layer_creates_missing_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("discovery.log");

        let _layer = get_fmt_layer::<Registry, _>(Some(&path));

        assert!(path.exists());
    }

    #[test]
    fn fmt_layer_falls_back_to_stderr_for_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("discovery.log");

        let _layer = get_fmt_layer::<Registry, _>(Some(&path));

        assert!(!path.exists());
    }
}
