//! Label vocabulary shared with the relabeling stage.
//!
//! The names follow the Prometheus `kubernetes_sd_configs` pod role and must
//! not change.

use std::collections::BTreeMap;

use target_types::LabelSet;

pub const ADDRESS_LABEL: &str = "__address__";
pub const NAMESPACE_LABEL: &str = "__meta_kubernetes_namespace";

/// Prefix for all pod-scoped meta labels.
pub const POD_PREFIX: &str = "__meta_kubernetes_pod";

pub const POD_NAME_LABEL: &str = "__meta_kubernetes_pod_name";
pub const POD_IP_LABEL: &str = "__meta_kubernetes_pod_ip";
pub const POD_READY_LABEL: &str = "__meta_kubernetes_pod_ready";
pub const POD_PHASE_LABEL: &str = "__meta_kubernetes_pod_phase";
pub const POD_NODE_NAME_LABEL: &str = "__meta_kubernetes_pod_node_name";
pub const POD_HOST_IP_LABEL: &str = "__meta_kubernetes_pod_host_ip";
pub const POD_UID_LABEL: &str = "__meta_kubernetes_pod_uid";
pub const POD_CONTROLLER_KIND_LABEL: &str = "__meta_kubernetes_pod_controller_kind";
pub const POD_CONTROLLER_NAME_LABEL: &str = "__meta_kubernetes_pod_controller_name";

pub const CONTAINER_INIT_LABEL: &str = "__meta_kubernetes_pod_container_init";
pub const CONTAINER_NAME_LABEL: &str = "__meta_kubernetes_pod_container_name";
pub const CONTAINER_PORT_NAME_LABEL: &str = "__meta_kubernetes_pod_container_port_name";
pub const CONTAINER_PORT_NUMBER_LABEL: &str = "__meta_kubernetes_pod_container_port_number";
pub const CONTAINER_PORT_PROTOCOL_LABEL: &str = "__meta_kubernetes_pod_container_port_protocol";

/// Copies resource labels and annotations into `labels` under `prefix`.
///
/// Each resource label `k=v` yields `<prefix>_label_<k>=v` and
/// `<prefix>_labelpresent_<k>=true`; annotations use `annotation` and
/// `annotationpresent`. `k` is sanitized to a valid label name.
pub fn register_labels_and_annotations(
    prefix: &str,
    resource_labels: &BTreeMap<String, String>,
    annotations: &BTreeMap<String, String>,
    labels: &mut LabelSet,
) {
    register(prefix, "label", resource_labels, labels);
    register(prefix, "annotation", annotations, labels);
}

fn register(
    prefix: &str,
    kind: &str,
    source: &BTreeMap<String, String>,
    labels: &mut LabelSet,
) {
    for (name, value) in source {
        let name = sanitize_label_name(name);
        labels.insert(format!("{prefix}_{kind}_{name}"), value.clone());
        labels.insert(format!("{prefix}_{kind}present_{name}"), "true".to_string());
    }
}

/// Replaces every character outside `[A-Za-z0-9_]` with `_`.
pub fn sanitize_label_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Joins host and port, bracketing IPv6 literals.
pub fn join_host_port(host: &str, port: i32) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}
