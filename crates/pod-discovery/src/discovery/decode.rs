//! Decoding of raw API payloads into the pod model.

use error_stack::Report;
use error_stack::ResultExt;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::discovery::error::DiscoveryError;
use crate::discovery::translator::WatchAction;
use crate::discovery::types::Pod;
use crate::discovery::types::PodList;
use crate::discovery::types::WatchEvent;

/// Longest payload excerpt embedded into a decode error.
const MAX_PAYLOAD_EXCERPT: usize = 512;

/// Parses a pod list from `data`.
///
/// # Errors
///
/// - [`DiscoveryError::Decode`] if `data` is not a valid pod list. No partial
///   list is returned.
pub fn parse_pod_list(data: &[u8]) -> Result<PodList, Report<DiscoveryError>> {
    decode(data, "PodList")
}

/// Parses a single watch stream event from `data`.
///
/// # Errors
///
/// - [`DiscoveryError::Decode`] if `data` is not a valid watch event
pub fn parse_watch_event(data: &[u8]) -> Result<WatchEvent, Report<DiscoveryError>> {
    decode(data, "WatchEvent")
}

/// Decodes the pod carried by a watch event.
///
/// Only `ADDED`, `MODIFIED` and `DELETED` carry a pod. `ERROR` and unknown
/// actions return `None` without looking at the object.
///
/// # Errors
///
/// - [`DiscoveryError::Decode`] if a pod-carrying event has a malformed object
pub fn watch_event_pod(event: &WatchEvent) -> Result<Option<Pod>, Report<DiscoveryError>> {
    match WatchAction::parse(&event.action) {
        Some(WatchAction::Added | WatchAction::Modified | WatchAction::Deleted) => {}
        Some(WatchAction::Error) | None => return Ok(None),
    }
    if event.object.is_null() {
        return Ok(Some(Pod::default()));
    }
    Pod::deserialize(&event.object)
        .map(Some)
        .change_context_lazy(|| DiscoveryError::Decode {
            kind: "Pod",
            payload: payload_excerpt(event.object.to_string().as_bytes()),
        })
}

fn decode<T: DeserializeOwned>(
    data: &[u8],
    kind: &'static str,
) -> Result<T, Report<DiscoveryError>> {
    serde_json::from_slice(data).change_context_lazy(|| DiscoveryError::Decode {
        kind,
        payload: payload_excerpt(data),
    })
}

fn payload_excerpt(data: &[u8]) -> String {
    if data.len() <= MAX_PAYLOAD_EXCERPT {
        return format!("{:?}", String::from_utf8_lossy(data));
    }
    format!(
        "{:?}... ({} bytes total)",
        String::from_utf8_lossy(&data[..MAX_PAYLOAD_EXCERPT]),
        data.len()
    )
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use super::*;

    #[test]
    fn parses_pod_list() {
        let data = br#"{
            "kind": "PodList",
            "metadata": {"resourceVersion": "42"},
            "items": [
                {"metadata": {"name": "a", "namespace": "ns"}, "status": {"podIP": "10.0.0.1"}},
                {"metadata": {"name": "b", "namespace": "ns"}}
            ]
        }"#;

        let list = parse_pod_list(data).unwrap();

        assert_eq!(list.metadata.resource_version, "42");
        assert_eq!(list.items.len(), 2);
        assert_eq!(list.items[0].status.pod_ip, "10.0.0.1");
        assert_eq!(list.items[1].metadata.name, "b");
    }

    #[test]
    fn malformed_payload_fails_whole_decode() {
        let data = br#"{"items": [{"metadata": {"name": "a"}}, {"metadata": 7}]}"#;

        let err = parse_pod_list(data).unwrap_err();

        match err.current_context() {
            DiscoveryError::Decode { kind, payload } => {
                assert_eq!(*kind, "PodList");
                assert!(payload.contains(r#"\"metadata\": 7"#));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().starts_with("cannot unmarshal PodList from"));
    }

    #[test]
    fn decode_error_keeps_serde_source() {
        let err = parse_pod_list(b"not json").unwrap_err();

        let formatted = format!("{err:?}");
        assert!(formatted.contains("line 1 column"));
    }

    #[test]
    fn large_payload_is_truncated() {
        let mut data = b"[".to_vec();
        data.extend(std::iter::repeat(b'x').take(4096));

        let err = parse_pod_list(&data).unwrap_err();

        let DiscoveryError::Decode { payload, .. } = err.current_context() else {
            panic!("expected decode error");
        };
        assert!(payload.ends_with("... (4097 bytes total)"));
        assert!(payload.len() < 600);
    }

    #[test]
    fn parses_watch_event_envelope() {
        let data = br#"{"type": "DELETED", "object": {"metadata": {"name": "p", "namespace": "ns"}}}"#;

        let event = parse_watch_event(data).unwrap();

        assert_eq!(event.action, "DELETED");
        let pod = watch_event_pod(&event).unwrap().unwrap();
        assert_eq!(pod.key(), "ns/p");
    }

    #[test]
    fn expired_status_error_event_carries_no_pod() {
        let data = br#"{"type":"ERROR","object":{"kind":"Status","apiVersion":"v1","metadata":{},"status":"Failure","message":"too old resource version: 1 (2048)","reason":"Expired","code":410}}"#;

        let event = parse_watch_event(data).unwrap();

        assert_eq!(event.action, "ERROR");
        assert_eq!(event.object["code"], 410);
        assert_eq!(watch_event_pod(&event).unwrap(), None);
    }

    #[test]
    fn unknown_action_object_is_not_decoded() {
        let data = br#"{"type":"BOOKMARK","object":{"kind":"Pod","status":"not a pod status"}}"#;

        let event = parse_watch_event(data).unwrap();

        assert_eq!(watch_event_pod(&event).unwrap(), None);
    }

    #[test]
    fn malformed_pod_object_is_a_decode_error() {
        let data = br#"{"type":"ADDED","object":{"metadata":{"name":"p"},"status":"Failure"}}"#;

        let event = parse_watch_event(data).unwrap();
        let err = watch_event_pod(&event).unwrap_err();

        let DiscoveryError::Decode { kind, payload } = err.current_context() else {
            panic!("expected decode error");
        };
        assert_eq!(*kind, "Pod");
        assert!(payload.contains("Failure"));
    }

    #[test]
    fn missing_object_decodes_as_empty_pod() {
        let event = parse_watch_event(br#"{"type":"DELETED"}"#).unwrap();

        assert_eq!(watch_event_pod(&event).unwrap(), Some(Pod::default()));
    }
}
