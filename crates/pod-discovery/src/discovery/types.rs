//! Pod resource model as decoded from the orchestration API.
//!
//! Only the fields needed for target synthesis are kept. Every field defaults
//! when absent or `null`, so partially populated objects still decode.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

use crate::discovery::sync_key::escape_component;

/// A list of pods, as returned by a list request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PodList {
    #[serde(deserialize_with = "null_as_default")]
    pub items: Vec<Pod>,
    #[serde(deserialize_with = "null_as_default")]
    pub metadata: ListMeta,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListMeta {
    #[serde(deserialize_with = "null_as_default")]
    pub resource_version: String,
}

/// One line of a raw watch stream.
///
/// The object stays undecoded: `ERROR` events carry a `Status` rather than a
/// pod, so its shape depends on the action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchEvent {
    /// Raw action string, e.g. `ADDED` or `DELETED`
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub action: String,
    pub object: serde_json::Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pod {
    #[serde(deserialize_with = "null_as_default")]
    pub metadata: ObjectMeta,
    #[serde(deserialize_with = "null_as_default")]
    pub spec: PodSpec,
    #[serde(deserialize_with = "null_as_default")]
    pub status: PodStatus,
}

impl Pod {
    /// Resource-local identity, `namespace/name` with both parts escaped.
    pub fn key(&self) -> String {
        format!(
            "{}/{}",
            escape_component(&self.metadata.namespace),
            escape_component(&self.metadata.name)
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub namespace: String,
    #[serde(deserialize_with = "null_as_default")]
    pub uid: String,
    #[serde(deserialize_with = "null_as_default")]
    pub owner_references: Vec<OwnerReference>,
    #[serde(deserialize_with = "null_as_default")]
    pub labels: BTreeMap<String, String>,
    #[serde(deserialize_with = "null_as_default")]
    pub annotations: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OwnerReference {
    #[serde(deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub controller: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PodSpec {
    #[serde(deserialize_with = "null_as_default")]
    pub node_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub containers: Vec<Container>,
    #[serde(deserialize_with = "null_as_default")]
    pub init_containers: Vec<Container>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Container {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub ports: Vec<ContainerPort>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContainerPort {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub container_port: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub protocol: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PodStatus {
    #[serde(deserialize_with = "null_as_default")]
    pub phase: String,
    #[serde(rename = "podIP", deserialize_with = "null_as_default")]
    pub pod_ip: String,
    #[serde(rename = "hostIP", deserialize_with = "null_as_default")]
    pub host_ip: String,
    #[serde(deserialize_with = "null_as_default")]
    pub conditions: Vec<PodCondition>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PodCondition {
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub condition_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
}

/// Treats an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use super::*;

    #[test]
    fn decodes_platform_field_names() {
        let json = r#"{
            "metadata": {
                "name": "web-0",
                "namespace": "prod",
                "uid": "8c1b",
                "ownerReferences": [{"kind": "StatefulSet", "name": "web", "controller": true}],
                "labels": {"app": "web"}
            },
            "spec": {
                "nodeName": "node-a",
                "containers": [{"name": "app", "ports": [{"name": "http", "containerPort": 8080, "protocol": "TCP"}]}],
                "initContainers": [{"name": "setup"}]
            },
            "status": {
                "phase": "Running",
                "podIP": "10.1.2.3",
                "hostIP": "192.168.0.10",
                "conditions": [{"type": "Ready", "status": "True"}]
            }
        }"#;

        let pod: Pod = serde_json::from_str(json).unwrap();

        assert_eq!(pod.metadata.owner_references[0].kind, "StatefulSet");
        assert!(pod.metadata.owner_references[0].controller);
        assert_eq!(pod.spec.node_name, "node-a");
        assert_eq!(pod.spec.containers[0].ports[0].container_port, 8080);
        assert_eq!(pod.spec.init_containers[0].name, "setup");
        assert!(pod.spec.init_containers[0].ports.is_empty());
        assert_eq!(pod.status.pod_ip, "10.1.2.3");
        assert_eq!(pod.status.host_ip, "192.168.0.10");
        assert_eq!(pod.status.conditions[0].condition_type, "Ready");
    }

    #[test]
    fn null_fields_degrade_to_defaults() {
        let json = r#"{
            "metadata": {"name": "p", "namespace": null, "ownerReferences": null},
            "spec": {"containers": [{"name": "c", "ports": null}]},
            "status": null
        }"#;

        let pod: Pod = serde_json::from_str(json).unwrap();

        assert_eq!(pod.metadata.namespace, "");
        assert!(pod.metadata.owner_references.is_empty());
        assert!(pod.spec.containers[0].ports.is_empty());
        assert_eq!(pod.status, PodStatus::default());
    }

    #[test]
    fn key_escapes_separator_in_components() {
        let pod = Pod {
            metadata: ObjectMeta {
                name: "a/b".to_string(),
                namespace: "ns".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };

        assert_eq!(pod.key(), "ns/a%2Fb");
    }
}
