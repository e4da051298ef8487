//! Kubernetes integration module.
//!
//! This module connects the discovery core to a live cluster: it converts
//! typed API objects into the discovery pod model and drives one watch per
//! discovery section, feeding every notification to the section's
//! [`EventTranslator`](crate::discovery::EventTranslator).

pub mod convert;
pub mod pod_watcher;
pub mod types;

pub use pod_watcher::SectionWatcher;
pub use types::KubernetesError;
