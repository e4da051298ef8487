//! Subscriber setup for the daemon.
//!
//! Diagnostics go through the shared fmt layer from `utils`, filtered by
//! `RUST_LOG`. Events on the `metrics` target bypass it and land verbatim in a
//! daily rolling file, one encoded metrics line per event.

use std::env;
use std::fmt::{self};
use std::path::Path;
use std::path::PathBuf;

use tracing::field::Field;
use tracing::field::Visit;
use tracing::Event;
use tracing::Subscriber;
use tracing_appender::rolling::RollingFileAppender;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::filter::FilterExt;
use tracing_subscriber::filter::{self};
use tracing_subscriber::fmt::format;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::fmt::FormatEvent;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry;
use utils::logging::LOG_PATH_ENV_VAR;

const DEFAULT_METRICS_PREFIX: &str = "discovery-metrics.log";

/// Writes the bare message of an event, which already holds an encoded
/// metrics line.
struct MetricsLineFormatter;

/// Collects the message field only; metrics events carry nothing else.
#[derive(Default)]
struct MessageVisitor {
    line: String,
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.line.push_str(value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.line.push_str(&format!("{value:?}"));
        }
    }
}

impl<S, N> FormatEvent<S, N> for MetricsLineFormatter
where
    S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        // encoders end each line with a newline already
        write!(writer, "{}", visitor.line)
    }
}

/// Splits the metrics file setting into rotation directory and file prefix.
///
/// A directory gets the default prefix; a missing parent means the current
/// directory.
fn metrics_file_location(metrics_file: &Path) -> (PathBuf, String) {
    if metrics_file.is_dir() {
        return (metrics_file.to_path_buf(), DEFAULT_METRICS_PREFIX.to_string());
    }
    let parent = metrics_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let prefix = metrics_file
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(DEFAULT_METRICS_PREFIX);
    (parent.to_path_buf(), prefix.to_string())
}

/// Installs the global subscriber and returns the guard flushing the
/// metrics file. Keep the guard alive for the lifetime of the daemon.
pub fn init(metrics_file: &Path) -> tracing_appender::non_blocking::WorkerGuard {
    let log_path = env::var(LOG_PATH_ENV_VAR).ok();
    let fmt_layer = utils::logging::get_fmt_layer(log_path);

    let (rotation_dir, prefix) = metrics_file_location(metrics_file);

    let env_filter = filter::EnvFilter::builder()
        .with_default_directive(filter::LevelFilter::INFO.into())
        .from_env_lossy();

    let fmt_layer = fmt_layer.with_filter(env_filter.and(filter::filter_fn(|metadata| {
        !metadata.target().eq("metrics")
    })));

    let (file_writer, file_guard) = match RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(&prefix)
        .max_log_files(3)
        .build(&rotation_dir)
    {
        Ok(appender) => tracing_appender::non_blocking(appender),
        Err(err) => {
            eprintln!(
                "failed to create metrics rolling file appender at {}: {err}; falling back to stdout",
                rotation_dir.display()
            );
            tracing_appender::non_blocking(std::io::stdout())
        }
    };

    let metrics_layer = layer()
        .event_format(MetricsLineFormatter {})
        .fmt_fields(format::DefaultFields::new())
        .with_writer(file_writer)
        .with_ansi(false)
        .with_filter(filter::filter_fn(|metadata| {
            metadata.target().eq("metrics")
        }));

    registry().with(fmt_layer).with(metrics_layer).init();
    file_guard
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use super::*;

    #[test]
    fn metrics_file_in_directory() {
        let (dir, prefix) = metrics_file_location(Path::new("/var/log/discovery.log"));

        assert_eq!(dir, PathBuf::from("/var/log"));
        assert_eq!(prefix, "discovery.log");
    }

    #[test]
    fn bare_file_name_uses_current_directory() {
        let (dir, prefix) = metrics_file_location(Path::new("metrics.log"));

        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(prefix, "metrics.log");
    }

    #[test]
    fn metrics_events_are_written_verbatim() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let metrics_layer = layer()
            .event_format(MetricsLineFormatter)
            .with_writer(std::sync::Mutex::new(file.reopen().unwrap()))
            .with_ansi(false);
        let subscriber = registry().with(metrics_layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "metrics", section = "a", "{}", "pod_discovery,section=a upserts=1u 1\n");
        });

        let written = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(written, "pod_discovery,section=a upserts=1u 1\n");
    }

    #[test]
    fn existing_directory_gets_default_prefix() {
        let tmp = tempfile::tempdir().unwrap();

        let (dir, prefix) = metrics_file_location(tmp.path());

        assert_eq!(dir, tmp.path().to_path_buf());
        assert_eq!(prefix, DEFAULT_METRICS_PREFIX);
    }
}
