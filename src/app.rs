//! Application state and navigation logic.

use std::time::{Duration, Instant};

use crate::data::{DashboardData, MetricData, Thresholds};
use crate::source::{FetchPhase, FetchSnapshot, MetricsSnapshot, PollingSource};
use crate::ui::Theme;

/// The current view/tab in the TUI.
///
/// Metric detail is shown as an overlay (controlled by
/// `App::show_detail_overlay`) rather than as a separate view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Table of all metrics with statistics and status.
    Overview,
    /// Gauge cards, one per metric.
    Gauges,
}

impl View {
    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Overview => View::Gauges,
            View::Gauges => View::Overview,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        self.next()
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Overview => "Overview",
            View::Gauges => "Gauges",
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,
    pub show_detail_overlay: bool,

    // Data source
    source: PollingSource<MetricsSnapshot>,
    pub data: Option<DashboardData>,
    pub phase: FetchPhase,
    pub fetch_error: Option<String>,
    pub thresholds: Thresholds,
    /// Moving-average window applied to every metric.
    pub window: usize,

    // Navigation state
    pub selected_metric_index: usize,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App around an already-started polling source.
    pub fn new(
        source: PollingSource<MetricsSnapshot>,
        thresholds: Thresholds,
        window: usize,
    ) -> Self {
        Self {
            running: true,
            current_view: View::Overview,
            show_help: false,
            show_detail_overlay: false,
            source,
            data: None,
            phase: FetchPhase::Idle,
            fetch_error: None,
            thresholds,
            window,
            selected_metric_index: 0,
            theme: Theme::auto_detect(),
            status_message: None,
        }
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// True while a fetch cycle is in flight.
    pub fn loading(&self) -> bool {
        self.phase == FetchPhase::Loading
    }

    /// Drain the source for a new snapshot.
    ///
    /// Returns true if the published fetch state changed.
    pub fn refresh(&mut self) -> bool {
        match self.source.poll() {
            Some(snapshot) => {
                self.apply_snapshot(snapshot);
                true
            }
            None => false,
        }
    }

    /// Re-apply the current snapshot unconditionally (manual reload).
    pub fn reload(&mut self) {
        let snapshot = self.source.snapshot();
        self.apply_snapshot(snapshot);
        self.set_status_message("Recomputed from latest snapshot".to_string());
    }

    fn apply_snapshot(&mut self, snapshot: FetchSnapshot<MetricsSnapshot>) {
        self.phase = snapshot.phase;
        self.fetch_error = snapshot.error;

        // Loading carries the previous payload forward; only completed
        // cycles change what is displayed. Derived data is recomputed
        // wholesale, never patched.
        if matches!(snapshot.phase, FetchPhase::Ready | FetchPhase::Failed) {
            if let Some(payload) = snapshot.data {
                let data = DashboardData::from_snapshot(payload, &self.thresholds, self.window);
                if self.selected_metric_index >= data.metrics.len() {
                    self.selected_metric_index = data.metrics.len().saturating_sub(1);
                }
                self.data = Some(data);
            }
        }
    }

    /// The currently selected metric, if any.
    pub fn selected_metric(&self) -> Option<&MetricData> {
        self.data.as_ref()?.metrics.get(self.selected_metric_index)
    }

    fn metric_count(&self) -> usize {
        self.data.as_ref().map_or(0, |d| d.metrics.len())
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    /// Move selection down by one metric.
    pub fn select_next(&mut self) {
        let max = self.metric_count().saturating_sub(1);
        self.selected_metric_index = (self.selected_metric_index + 1).min(max);
    }

    /// Move selection up by one metric.
    pub fn select_prev(&mut self) {
        self.selected_metric_index = self.selected_metric_index.saturating_sub(1);
    }

    /// Jump to the first metric.
    pub fn select_first(&mut self) {
        self.selected_metric_index = 0;
    }

    /// Jump to the last metric.
    pub fn select_last(&mut self) {
        self.selected_metric_index = self.metric_count().saturating_sub(1);
    }

    /// Open the detail overlay for the currently selected metric.
    pub fn enter_detail(&mut self) {
        if self.selected_metric().is_some() {
            self.show_detail_overlay = true;
        }
    }

    /// Close the detail overlay if open.
    pub fn close_overlay(&mut self) {
        self.show_detail_overlay = false;
    }

    /// Navigate back: close overlay first, then return to the overview.
    pub fn go_back(&mut self) {
        if self.show_detail_overlay {
            self.show_detail_overlay = false;
        } else if self.current_view != View::Overview {
            self.current_view = View::Overview;
        }
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SeriesPayload;

    fn snapshot_with(names: &[&str]) -> FetchSnapshot<MetricsSnapshot> {
        let payload: MetricsSnapshot = names
            .iter()
            .map(|name| {
                (
                    name.to_string(),
                    SeriesPayload {
                        samples: vec![1.0, 2.0, 3.0],
                        unit: None,
                        gauge_min: None,
                        gauge_max: None,
                    },
                )
            })
            .collect();
        FetchSnapshot {
            phase: FetchPhase::Ready,
            data: Some(payload),
            error: None,
        }
    }

    fn test_app() -> App {
        App::new(PollingSource::new(), Thresholds::default(), 3)
    }

    #[test]
    fn test_apply_snapshot_builds_dashboard_data() {
        let mut app = test_app();
        app.apply_snapshot(snapshot_with(&["a", "b"]));

        assert_eq!(app.phase, FetchPhase::Ready);
        assert_eq!(app.data.as_ref().unwrap().metrics.len(), 2);
        assert!(app.fetch_error.is_none());
    }

    #[test]
    fn test_loading_keeps_previous_data() {
        let mut app = test_app();
        app.apply_snapshot(snapshot_with(&["a"]));

        app.apply_snapshot(FetchSnapshot {
            phase: FetchPhase::Loading,
            data: None,
            error: None,
        });

        assert!(app.loading());
        assert!(app.data.is_some(), "loading must not blank the dashboard");
    }

    #[test]
    fn test_selection_clamped_when_metrics_shrink() {
        let mut app = test_app();
        app.apply_snapshot(snapshot_with(&["a", "b", "c"]));
        app.select_last();
        assert_eq!(app.selected_metric_index, 2);

        app.apply_snapshot(snapshot_with(&["a"]));
        assert_eq!(app.selected_metric_index, 0);
    }

    #[test]
    fn test_view_cycling() {
        let mut app = test_app();
        assert_eq!(app.current_view, View::Overview);
        app.next_view();
        assert_eq!(app.current_view, View::Gauges);
        app.next_view();
        assert_eq!(app.current_view, View::Overview);
    }
}
