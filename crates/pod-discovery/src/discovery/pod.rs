//! Scrape-target label synthesis for pods.

use target_types::LabelSet;

use crate::discovery::labels::*;
use crate::discovery::types::Container;
use crate::discovery::types::ContainerPort;
use crate::discovery::types::OwnerReference;
use crate::discovery::types::Pod;
use crate::discovery::types::PodCondition;

impl Pod {
    /// Returns one label set per scrape-able endpoint of the pod.
    ///
    /// Regular containers come first, then init containers, each in declared
    /// order. Every declared port yields one label set; a container without
    /// ports yields a single label set addressed by the bare pod IP. A pod
    /// without an IP yields nothing.
    pub fn target_labels(&self) -> Vec<LabelSet> {
        let mut ms = Vec::new();
        self.append_target_labels(&mut ms);
        ms
    }

    /// Appends the pod's label sets to `ms`, see [`Pod::target_labels`].
    pub fn append_target_labels(&self, ms: &mut Vec<LabelSet>) {
        if self.status.pod_ip.is_empty() {
            // no address, nothing to scrape
            return;
        }
        self.append_containers_labels(ms, &self.spec.containers, false);
        self.append_containers_labels(ms, &self.spec.init_containers, true);
    }

    fn append_containers_labels(
        &self,
        ms: &mut Vec<LabelSet>,
        containers: &[Container],
        is_init: bool,
    ) {
        for container in containers {
            if container.ports.is_empty() {
                ms.push(self.endpoint_labels(container, None, is_init));
                continue;
            }
            for port in &container.ports {
                ms.push(self.endpoint_labels(container, Some(port), is_init));
            }
        }
    }

    fn endpoint_labels(
        &self,
        container: &Container,
        port: Option<&ContainerPort>,
        is_init: bool,
    ) -> LabelSet {
        let address = match port {
            Some(port) => join_host_port(&self.status.pod_ip, port.container_port),
            None => self.status.pod_ip.clone(),
        };

        let mut m = LabelSet::new();
        m.insert(ADDRESS_LABEL.to_string(), address);
        m.insert(CONTAINER_INIT_LABEL.to_string(), is_init.to_string());
        self.append_common_labels(&mut m);
        append_container_labels(&mut m, container, port);
        m
    }

    fn append_common_labels(&self, m: &mut LabelSet) {
        let meta = &self.metadata;
        m.insert(POD_NAME_LABEL.to_string(), meta.name.clone());
        m.insert(POD_IP_LABEL.to_string(), self.status.pod_ip.clone());
        m.insert(
            POD_READY_LABEL.to_string(),
            ready_status(&self.status.conditions),
        );
        m.insert(POD_PHASE_LABEL.to_string(), self.status.phase.clone());
        m.insert(POD_NODE_NAME_LABEL.to_string(), self.spec.node_name.clone());
        m.insert(POD_HOST_IP_LABEL.to_string(), self.status.host_ip.clone());
        m.insert(POD_UID_LABEL.to_string(), meta.uid.clone());
        m.insert(NAMESPACE_LABEL.to_string(), meta.namespace.clone());

        if let Some(controller) = controller_reference(&meta.owner_references) {
            if !controller.kind.is_empty() {
                m.insert(
                    POD_CONTROLLER_KIND_LABEL.to_string(),
                    controller.kind.clone(),
                );
            }
            if !controller.name.is_empty() {
                m.insert(
                    POD_CONTROLLER_NAME_LABEL.to_string(),
                    controller.name.clone(),
                );
            }
        }

        register_labels_and_annotations(POD_PREFIX, &meta.labels, &meta.annotations, m);
    }
}

fn append_container_labels(m: &mut LabelSet, container: &Container, port: Option<&ContainerPort>) {
    m.insert(CONTAINER_NAME_LABEL.to_string(), container.name.clone());
    if let Some(port) = port {
        m.insert(CONTAINER_PORT_NAME_LABEL.to_string(), port.name.clone());
        m.insert(
            CONTAINER_PORT_NUMBER_LABEL.to_string(),
            port.container_port.to_string(),
        );
        m.insert(CONTAINER_PORT_PROTOCOL_LABEL.to_string(), port.protocol.clone());
    }
}

/// First owner reference with the controller flag set.
fn controller_reference(owners: &[OwnerReference]) -> Option<&OwnerReference> {
    owners.iter().find(|owner| owner.controller)
}

/// Lower-cased status of the `Ready` condition, or `unknown` when absent.
fn ready_status(conditions: &[PodCondition]) -> String {
    conditions
        .iter()
        .find(|c| c.condition_type == "Ready")
        .map(|c| c.status.to_lowercase())
        .unwrap_or_else(|| "unknown".to_string())
}
