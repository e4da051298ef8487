use std::collections::HashMap;

use influxdb_line_protocol::LineProtocolBuilder;

use super::MetricsEncoder;

/// InfluxDB line protocol encoder
pub struct InfluxEncoder;

impl InfluxEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl MetricsEncoder for InfluxEncoder {
    fn encode_metrics(
        &self,
        measurement: &str,
        tags: &HashMap<String, String>,
        fields: &HashMap<String, u64>,
        timestamp: i64,
    ) -> String {
        let mut builder = LineProtocolBuilder::new().measurement(measurement);

        // Sorted tags and fields keep the output stable
        let mut tag_entries: Vec<_> = tags.iter().collect();
        tag_entries.sort_by_key(|(k, _)| *k);
        for (key, value) in tag_entries {
            builder = builder.tag(key, value);
        }

        let mut field_entries: Vec<_> = fields.iter().collect();
        field_entries.sort_by_key(|(k, _)| *k);

        // The first field moves the builder into its AfterField state
        let Some((first_key, first_value)) = field_entries.first() else {
            let lp_built = builder
                .field("_empty", true)
                .timestamp(timestamp)
                .close_line()
                .build();
            return String::from_utf8_lossy(&lp_built).into_owned();
        };

        let mut after_first_field = builder.field(first_key, **first_value);
        for (key, value) in field_entries.iter().skip(1) {
            after_first_field = after_first_field.field(key, **value);
        }

        let lp_built = after_first_field.timestamp(timestamp).close_line().build();
        String::from_utf8_lossy(&lp_built).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use similar_asserts::assert_eq;

    use super::*;
    use crate::infrastructure::metrics::SectionSnapshot;

    #[test]
    fn encode_section_metrics_line() {
        let encoder = InfluxEncoder::new();
        let snapshot = SectionSnapshot {
            upserts: 4,
            tombstones: 1,
            error_actions: 0,
            unexpected_actions: 2,
            active_targets: 3,
        };

        let result = encoder.encode_section_metrics("kubernetes-pods", &snapshot, 1609459200000000000);

        assert_eq!(
            result,
            "pod_discovery,kind=pods,section=kubernetes-pods active_targets=3u,error_actions=0u,tombstones=1u,unexpected_actions=2u,upserts=4u 1609459200000000000\n"
        );
    }

    #[test]
    fn encode_metrics_without_fields() {
        let encoder = InfluxEncoder::new();
        let mut tags = HashMap::new();
        tags.insert("section".to_string(), "a".to_string());

        let result = encoder.encode_metrics("empty", &tags, &HashMap::new(), 1);

        assert!(result.starts_with("empty,section=a _empty=true 1"));
    }
}
