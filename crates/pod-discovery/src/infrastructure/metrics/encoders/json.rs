use std::collections::HashMap;

use serde_json::json;

use super::MetricsEncoder;

/// JSON encoder for metrics
pub struct JsonEncoder;

impl JsonEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl MetricsEncoder for JsonEncoder {
    fn encode_metrics(
        &self,
        measurement: &str,
        tags: &HashMap<String, String>,
        fields: &HashMap<String, u64>,
        timestamp: i64,
    ) -> String {
        let json_fields: serde_json::Map<String, serde_json::Value> = fields
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::from(*v)))
            .collect();

        let metrics = json!({
            "measure": measurement,
            "ts": timestamp,
            "tag": tags,
            "field": json_fields,
        });
        metrics.to_string() + "\n"
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;
    use similar_asserts::assert_eq;

    use super::*;
    use crate::infrastructure::metrics::SectionSnapshot;

    #[test]
    fn encode_section_metrics_as_json() {
        let encoder = JsonEncoder::new();
        let snapshot = SectionSnapshot {
            upserts: 5,
            active_targets: 2,
            ..Default::default()
        };

        let result = encoder.encode_section_metrics("a", &snapshot, 42);
        let parsed: Value = serde_json::from_str(result.trim()).unwrap();

        assert_eq!(parsed["measure"], "pod_discovery");
        assert_eq!(parsed["ts"], 42);
        assert_eq!(parsed["tag"]["section"], "a");
        assert_eq!(parsed["field"]["upserts"], 5);
        assert_eq!(parsed["field"]["active_targets"], 2);
        assert_eq!(parsed["field"]["tombstones"], 0);
    }

    #[test]
    fn encode_metrics_keeps_tags_and_counters() {
        let encoder = JsonEncoder::new();
        let mut tags = HashMap::new();
        tags.insert("section".to_string(), "b".to_string());
        let mut fields = HashMap::new();
        fields.insert("upserts".to_string(), u64::MAX);

        let result = encoder.encode_metrics("m", &tags, &fields, 0);
        let parsed: Value = serde_json::from_str(result.trim()).unwrap();

        assert_eq!(parsed["tag"]["section"], "b");
        assert_eq!(parsed["field"]["upserts"], u64::MAX);
    }
}
