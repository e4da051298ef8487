//! Conversion from typed API objects into the discovery pod model.

use k8s_openapi::api::core::v1 as api;
use k8s_openapi::apimachinery::pkg::apis::meta::v1 as meta;

use crate::discovery::types::Container;
use crate::discovery::types::ContainerPort;
use crate::discovery::types::ObjectMeta;
use crate::discovery::types::OwnerReference;
use crate::discovery::types::Pod;
use crate::discovery::types::PodCondition;
use crate::discovery::types::PodSpec;
use crate::discovery::types::PodStatus;

impl From<api::Pod> for Pod {
    fn from(pod: api::Pod) -> Self {
        Self {
            metadata: pod.metadata.into(),
            spec: pod.spec.map(Into::into).unwrap_or_default(),
            status: pod.status.map(Into::into).unwrap_or_default(),
        }
    }
}

impl From<meta::ObjectMeta> for ObjectMeta {
    fn from(metadata: meta::ObjectMeta) -> Self {
        Self {
            name: metadata.name.unwrap_or_default(),
            namespace: metadata.namespace.unwrap_or_default(),
            uid: metadata.uid.unwrap_or_default(),
            owner_references: metadata
                .owner_references
                .unwrap_or_default()
                .into_iter()
                .map(|owner| OwnerReference {
                    kind: owner.kind,
                    name: owner.name,
                    controller: owner.controller.unwrap_or(false),
                })
                .collect(),
            labels: metadata.labels.unwrap_or_default(),
            annotations: metadata.annotations.unwrap_or_default(),
        }
    }
}

impl From<api::PodSpec> for PodSpec {
    fn from(spec: api::PodSpec) -> Self {
        Self {
            node_name: spec.node_name.unwrap_or_default(),
            containers: spec.containers.into_iter().map(Into::into).collect(),
            init_containers: spec
                .init_containers
                .unwrap_or_default()
                .into_iter()
                .map(Into::into)
                .collect(),
        }
    }
}

impl From<api::Container> for Container {
    fn from(container: api::Container) -> Self {
        Self {
            name: container.name,
            ports: container
                .ports
                .unwrap_or_default()
                .into_iter()
                .map(|port| ContainerPort {
                    name: port.name.unwrap_or_default(),
                    container_port: port.container_port,
                    protocol: port.protocol.unwrap_or_default(),
                })
                .collect(),
        }
    }
}

impl From<api::PodStatus> for PodStatus {
    fn from(status: api::PodStatus) -> Self {
        Self {
            phase: status.phase.unwrap_or_default(),
            pod_ip: status.pod_ip.unwrap_or_default(),
            host_ip: status.host_ip.unwrap_or_default(),
            conditions: status
                .conditions
                .unwrap_or_default()
                .into_iter()
                .map(|condition| PodCondition {
                    condition_type: condition.type_,
                    status: condition.status,
                })
                .collect(),
        }
    }
}
