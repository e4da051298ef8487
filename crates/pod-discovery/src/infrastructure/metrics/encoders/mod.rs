use std::collections::HashMap;

use crate::infrastructure::metrics::SectionSnapshot;

pub mod influx;
pub mod json;

/// Trait for encoding metrics data into different formats
pub trait MetricsEncoder: Send + Sync {
    /// Encode metrics with measurement name, tags, counter fields, and timestamp
    fn encode_metrics(
        &self,
        measurement: &str,
        tags: &HashMap<String, String>,
        fields: &HashMap<String, u64>,
        timestamp: i64,
    ) -> String;

    /// Encode the counters of one discovery section (convenience method)
    fn encode_section_metrics(
        &self,
        section: &str,
        snapshot: &SectionSnapshot,
        timestamp: i64,
    ) -> String {
        let mut tags = HashMap::new();
        tags.insert("section".to_string(), section.to_string());
        tags.insert("kind".to_string(), "pods".to_string());

        let mut fields = HashMap::new();
        fields.insert("upserts".to_string(), snapshot.upserts);
        fields.insert("tombstones".to_string(), snapshot.tombstones);
        fields.insert("error_actions".to_string(), snapshot.error_actions);
        fields.insert("unexpected_actions".to_string(), snapshot.unexpected_actions);
        fields.insert("active_targets".to_string(), snapshot.active_targets);

        self.encode_metrics("pod_discovery", &tags, &fields, timestamp)
    }
}

/// Factory function to create encoders based on format string
pub fn create_encoder(format: &str) -> Box<dyn MetricsEncoder + Send + Sync> {
    match format.to_lowercase().as_str() {
        "json" => Box::new(json::JsonEncoder::new()),
        _ => Box::new(influx::InfluxEncoder::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_encoder_falls_back_to_influx() {
        let snapshot = SectionSnapshot {
            upserts: 3,
            ..Default::default()
        };

        let line = create_encoder("unknown").encode_section_metrics("a", &snapshot, 1);
        assert!(line.starts_with("pod_discovery,"));

        let json = create_encoder("JSON").encode_section_metrics("a", &snapshot, 1);
        assert!(json.starts_with('{'));
    }
}
