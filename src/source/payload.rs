//! Wire types for metrics snapshots.
//!
//! These types match the JSON body served by a metrics endpoint (and by the
//! fallback dataset file). They are the common format between whatever
//! produces the measurements and this dashboard consumer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A complete snapshot of metrics state.
///
/// Top-level structure mapping metric names to their measurement series.
pub type MetricsSnapshot = BTreeMap<String, SeriesPayload>;

/// One named measurement series as it appears on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesPayload {
    /// Ordered samples, oldest first.
    pub samples: Vec<f64>,

    /// Display unit (e.g., "%", "ms", "h").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Lower bound of the gauge scale for this metric. Defaults to 0.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gauge_min: Option<f64>,

    /// Upper bound of the gauge scale for this metric. Defaults to 100.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gauge_max: Option<f64>,
}

impl SeriesPayload {
    /// Gauge scale for this metric, applying the 0..100 defaults.
    pub fn gauge_bounds(&self) -> (f64, f64) {
        (self.gauge_min.unwrap_or(0.0), self.gauge_max.unwrap_or(100.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_snapshot() {
        let json = r#"{
            "cycle_time": {
                "samples": [54.2, 55.1, 53.8],
                "unit": "h",
                "gauge_min": 40.0,
                "gauge_max": 70.0
            },
            "efficiency": {
                "samples": [91.0, 88.5]
            }
        }"#;

        let snapshot: MetricsSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.len(), 2);

        let cycle = snapshot.get("cycle_time").unwrap();
        assert_eq!(cycle.samples.len(), 3);
        assert_eq!(cycle.unit.as_deref(), Some("h"));
        assert_eq!(cycle.gauge_bounds(), (40.0, 70.0));

        let eff = snapshot.get("efficiency").unwrap();
        assert!(eff.unit.is_none());
        assert_eq!(eff.gauge_bounds(), (0.0, 100.0));
    }

    #[test]
    fn test_roundtrip_omits_absent_fields() {
        let payload = SeriesPayload {
            samples: vec![1.0],
            unit: None,
            gauge_min: None,
            gauge_max: None,
        };
        let json = serde_json::to_string(&payload).unwrap();
        assert!(!json.contains("gauge_min"));
        assert!(!json.contains("unit"));
    }
}
