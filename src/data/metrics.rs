//! Metric processing and control-status classification.
//!
//! This module transforms raw metrics snapshots into processed data with
//! statistics and control status computed for each series, ready for
//! display.

use std::time::Instant;

use crate::source::{MetricsSnapshot, SeriesPayload};

use super::stats::{self, ControlLimits, SeriesSummary};

/// Sigma-unit thresholds for control-status classification.
///
/// The control limits themselves are always the classic three-sigma
/// Shewhart limits; these thresholds only decide how a metric's latest
/// sample is labeled for display.
#[derive(Debug, Clone)]
pub struct Thresholds {
    /// Deviation (in sigmas) beyond which a metric shows a warning.
    pub warning_sigmas: f64,
    /// Deviation (in sigmas) beyond which a metric is out of control.
    pub critical_sigmas: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            warning_sigmas: 2.0,
            critical_sigmas: 3.0,
        }
    }
}

/// Control status for a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ControlStatus {
    Stable,
    Warning,
    OutOfControl,
}

impl ControlStatus {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            ControlStatus::Stable => "OK",
            ControlStatus::Warning => "WARN",
            ControlStatus::OutOfControl => "OOC",
        }
    }

    /// Returns the full label for display.
    pub fn label(&self) -> &'static str {
        match self {
            ControlStatus::Stable => "Stable",
            ControlStatus::Warning => "Warning",
            ControlStatus::OutOfControl => "Out of control",
        }
    }
}

/// One metric with derived statistics and status.
#[derive(Debug, Clone)]
pub struct MetricData {
    pub name: String,
    pub unit: Option<String>,
    pub samples: Vec<f64>,
    /// Moving average of `samples`, same length.
    pub smoothed: Vec<f64>,
    /// `None` when the series is empty.
    pub summary: Option<SeriesSummary>,
    /// `None` when the series is empty.
    pub limits: Option<ControlLimits>,
    /// Indices of samples outside the control limits.
    pub violations: Vec<usize>,
    pub status: ControlStatus,
    pub gauge_min: f64,
    pub gauge_max: f64,
}

/// Complete processed dashboard data ready for display.
#[derive(Debug, Clone)]
pub struct DashboardData {
    pub metrics: Vec<MetricData>,
    pub last_updated: Instant,
}

impl DashboardData {
    /// Convert a raw snapshot into processed dashboard data.
    ///
    /// `window` is the moving-average width; values below 1 are treated
    /// as 1 (no smoothing). Metrics sort worst status first, then by name.
    pub fn from_snapshot(
        snapshot: MetricsSnapshot,
        thresholds: &Thresholds,
        window: usize,
    ) -> Self {
        let mut metrics: Vec<MetricData> = snapshot
            .into_iter()
            .map(|(name, payload)| Self::build_metric(name, payload, thresholds, window))
            .collect();

        metrics.sort_by(|a, b| b.status.cmp(&a.status).then_with(|| a.name.cmp(&b.name)));

        Self {
            metrics,
            last_updated: Instant::now(),
        }
    }

    fn build_metric(
        name: String,
        payload: SeriesPayload,
        thresholds: &Thresholds,
        window: usize,
    ) -> MetricData {
        let (gauge_min, gauge_max) = payload.gauge_bounds();
        let samples = payload.samples;

        // window >= 1 by construction, so this cannot fail.
        let smoothed = stats::moving_average(&samples, window.max(1)).unwrap_or_default();
        let summary = stats::summarize(&samples).ok();
        let limits = stats::control_limits(&samples).ok();
        let violations = limits
            .as_ref()
            .map(|l| l.out_of_control(&samples))
            .unwrap_or_default();
        let status = Self::classify(limits.as_ref(), summary.as_ref(), thresholds);

        MetricData {
            name,
            unit: payload.unit,
            samples,
            smoothed,
            summary,
            limits,
            violations,
            status,
            gauge_min,
            gauge_max,
        }
    }

    /// Metrics whose latest sample is currently out of control.
    pub fn out_of_control_metrics(&self) -> Vec<&MetricData> {
        self.metrics
            .iter()
            .filter(|m| m.status == ControlStatus::OutOfControl)
            .collect()
    }

    /// Classify a metric by how far its latest sample sits from the
    /// center line. Empty series are Stable (there is nothing to flag).
    fn classify(
        limits: Option<&ControlLimits>,
        summary: Option<&SeriesSummary>,
        thresholds: &Thresholds,
    ) -> ControlStatus {
        let (Some(limits), Some(summary)) = (limits, summary) else {
            return ControlStatus::Stable;
        };

        // A collapsed-sigma series with an off-center latest sample yields
        // an infinite deviation, which lands in OutOfControl as it should.
        let deviation = limits.deviation_sigmas(summary.last);
        if deviation > thresholds.critical_sigmas {
            ControlStatus::OutOfControl
        } else if deviation > thresholds.warning_sigmas {
            ControlStatus::Warning
        } else {
            ControlStatus::Stable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn payload(samples: &[f64]) -> SeriesPayload {
        SeriesPayload {
            samples: samples.to_vec(),
            unit: None,
            gauge_min: None,
            gauge_max: None,
        }
    }

    fn snapshot_of(entries: &[(&str, &[f64])]) -> MetricsSnapshot {
        entries
            .iter()
            .map(|(name, samples)| (name.to_string(), payload(samples)))
            .collect::<BTreeMap<_, _>>()
    }

    #[test]
    fn test_build_metric_derives_statistics() {
        let snapshot = snapshot_of(&[("cycle", &[1.0, 2.0, 3.0, 4.0, 5.0])]);
        let data = DashboardData::from_snapshot(snapshot, &Thresholds::default(), 3);

        let metric = &data.metrics[0];
        assert_eq!(metric.name, "cycle");
        assert_eq!(metric.smoothed, vec![1.0, 1.5, 2.0, 3.0, 4.0]);
        assert_eq!(metric.summary.unwrap().last, 5.0);
        let limits = metric.limits.unwrap();
        assert!(limits.lower_limit <= limits.center && limits.center <= limits.upper_limit);
        assert!(metric.violations.is_empty());
    }

    #[test]
    fn test_constant_series_is_stable() {
        let snapshot = snapshot_of(&[("steady", &[10.0, 10.0, 10.0])]);
        let data = DashboardData::from_snapshot(snapshot, &Thresholds::default(), 3);

        let metric = &data.metrics[0];
        assert_eq!(metric.status, ControlStatus::Stable);
        let limits = metric.limits.unwrap();
        assert_eq!(limits.sigma, 0.0);
        assert_eq!(limits.upper_limit, limits.lower_limit);
    }

    #[test]
    fn test_empty_series_does_not_crash() {
        let snapshot = snapshot_of(&[("empty", &[])]);
        let data = DashboardData::from_snapshot(snapshot, &Thresholds::default(), 3);

        let metric = &data.metrics[0];
        assert!(metric.limits.is_none());
        assert!(metric.summary.is_none());
        assert!(metric.smoothed.is_empty());
        assert_eq!(metric.status, ControlStatus::Stable);
    }

    #[test]
    fn test_deviant_latest_sample_warns() {
        // One deviant sample among n equal ones sits sqrt(n-1) sigmas out:
        // n = 6 gives ~2.24 sigmas, inside the limits but past the 2-sigma
        // warning threshold.
        let snapshot = snapshot_of(&[("drift", &[5.0, 5.0, 5.0, 5.0, 5.0, 6.0])]);
        let data = DashboardData::from_snapshot(snapshot, &Thresholds::default(), 3);
        assert_eq!(data.metrics[0].status, ControlStatus::Warning);
    }

    #[test]
    fn test_deviant_latest_sample_out_of_control() {
        // n = 11 gives sqrt(10) ~= 3.16 sigmas.
        let mut samples = vec![5.0; 10];
        samples.push(6.0);
        let snapshot = snapshot_of(&[("broken", &samples)]);
        let data = DashboardData::from_snapshot(snapshot, &Thresholds::default(), 3);

        let metric = &data.metrics[0];
        assert_eq!(metric.status, ControlStatus::OutOfControl);
        assert_eq!(metric.violations, vec![10]);
    }

    #[test]
    fn test_metrics_sort_worst_first() {
        let mut samples = vec![5.0; 10];
        samples.push(6.0);
        let snapshot = snapshot_of(&[
            ("aaa_steady", &[1.0, 1.0, 1.0]),
            ("zzz_broken", &samples),
        ]);
        let data = DashboardData::from_snapshot(snapshot, &Thresholds::default(), 3);

        assert_eq!(data.metrics[0].name, "zzz_broken");
        assert_eq!(data.metrics[1].name, "aaa_steady");
    }

    #[test]
    fn test_out_of_control_metrics() {
        let mut samples = vec![5.0; 10];
        samples.push(6.0);
        let snapshot = snapshot_of(&[
            ("steady", &[1.0, 1.0, 1.0]),
            ("broken", &samples),
        ]);
        let data = DashboardData::from_snapshot(snapshot, &Thresholds::default(), 3);

        let out = data.out_of_control_metrics();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "broken");
    }

    #[test]
    fn test_single_sample_is_stable() {
        let snapshot = snapshot_of(&[("one", &[42.0])]);
        let data = DashboardData::from_snapshot(snapshot, &Thresholds::default(), 3);
        assert_eq!(data.metrics[0].status, ControlStatus::Stable);
    }
}
