//! Pod discovery core.
//!
//! This module turns observed pods into scrape-target label sets and watch
//! notifications into synchronization events for the target reconciler.
//!
//! The main components are:
//! - [`parse_pod_list`] / [`parse_watch_event`]: decode raw API payloads
//! - [`Pod::target_labels`]: synthesizes one label set per endpoint
//! - [`build_sync_key`]: stable event keys
//! - [`EventTranslator`]: emits upserts and tombstones onto a section channel
//! - [`TargetSet`]: merges events into the live target set

pub mod decode;
pub mod error;
pub mod labels;
mod pod;
pub mod reconciler;
pub mod sync_key;
pub mod translator;
pub mod types;

pub use decode::parse_pod_list;
pub use decode::parse_watch_event;
pub use decode::watch_event_pod;
pub use error::DiscoveryError;
pub use reconciler::run_reconciler;
pub use reconciler::Change;
pub use reconciler::TargetSet;
pub use sync_key::build_sync_key;
pub use sync_key::POD_KIND;
pub use translator::DiagnosticReporter;
pub use translator::EventTranslator;
pub use translator::TracingReporter;
pub use translator::WatchAction;
pub use types::Pod;
pub use types::PodList;
pub use types::WatchEvent;
