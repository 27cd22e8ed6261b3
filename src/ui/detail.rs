//! Detail overlay rendering.
//!
//! Displays a modal overlay with a control chart and the full statistics
//! of the selected metric.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::{ewma, gauge_geometry, sparkline_points, MetricData};
use crate::ui::Theme;

use super::overview::format_value;

/// Minimum width required for the detail overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 50;
/// Minimum height required for the detail overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 16;

/// Render the metric detail as a modal overlay.
///
/// Shows the latest value, summary statistics, control limits, gauge
/// geometry, and a control chart with out-of-control samples highlighted.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    // Skip rendering if terminal is too small for the overlay
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }

    let Some(metric) = app.selected_metric() else {
        return;
    };

    let overlay_width = (area.width * 90 / 100).clamp(MIN_OVERLAY_WIDTH, 110);
    let overlay_height = (area.height * 85 / 100).clamp(MIN_OVERLAY_HEIGHT, 40);

    let x = area.x + (area.width.saturating_sub(overlay_width)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_height)) / 2;
    let overlay_area = Rect::new(x, y, overlay_width, overlay_height);

    // Clear the area behind the overlay
    frame.render_widget(Clear, overlay_area);

    let chunks = Layout::vertical([
        Constraint::Length(6), // Header with statistics
        Constraint::Min(8),    // Control chart
        Constraint::Length(1), // Footer
    ])
    .split(overlay_area);

    render_header(frame, app, metric, chunks[0]);
    render_chart(frame, app, metric, chunks[1]);

    let footer = Paragraph::new(" j/k:switch metric  Esc:close ")
        .style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(footer, chunks[2]);
}

fn render_header(frame: &mut Frame, app: &App, metric: &MetricData, area: Rect) {
    let status_style = app.theme.status_style(metric.status);
    let unit = metric.unit.as_deref();

    // Current EWMA level, with the conventional 0.2 smoothing factor
    let ewma_level = ewma(&metric.samples, 0.2)
        .ok()
        .and_then(|z| z.last().copied());

    let stats_line = match metric.summary {
        Some(summary) => Line::from(vec![
            Span::raw(" Last: "),
            Span::styled(
                format_value(summary.last, unit),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(
                "   Mean: {}   Min: {}   Max: {}   EWMA: {}   Samples: {}",
                format_value(summary.mean, unit),
                format_value(summary.min, unit),
                format_value(summary.max, unit),
                ewma_level.map_or_else(|| "-".to_string(), |v| format_value(v, unit)),
                summary.count
            )),
        ]),
        None => Line::from(" no samples"),
    };

    let limits_line = match metric.limits {
        Some(limits) => Line::from(format!(
            " UCL: {}   CL: {}   LCL: {}   σ: {}   violations: {}",
            format_value(limits.upper_limit, unit),
            format_value(limits.center, unit),
            format_value(limits.lower_limit, unit),
            format_value(limits.sigma, None),
            metric.violations.len()
        )),
        None => Line::from(" control limits undefined (empty series)"),
    };

    // The gauge needle position for this metric's scale
    let gauge_line = match metric.summary.map(|s| {
        gauge_geometry(s.last, metric.gauge_min, metric.gauge_max)
    }) {
        Some(Ok(geometry)) => Line::from(format!(
            " Gauge: {:.1}% of {}..{} (needle at {:+.0}°)",
            geometry.percentage, metric.gauge_min, metric.gauge_max, geometry.rotation_degrees
        )),
        _ => Line::from(" Gauge: scale undefined"),
    };

    let header_lines = vec![
        Line::from(vec![
            Span::styled(
                format!(" {} ", metric.name),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("[{}]", metric.status.label()),
                status_style.add_modifier(Modifier::BOLD),
            ),
        ]),
        stats_line,
        limits_line,
        gauge_line,
    ];

    let block = Block::default()
        .title(" Metric Detail ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    frame.render_widget(Paragraph::new(header_lines).block(block), area);
}

fn render_chart(frame: &mut Frame, app: &App, metric: &MetricData, area: Rect) {
    let block = Block::default()
        .title(" Control Chart  • raw  · avg  ┄ limits ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.width < 2 || inner.height < 2 {
        return;
    }

    let lines = chart_lines(
        metric,
        inner.width as usize,
        inner.height as usize,
        &app.theme,
    );
    frame.render_widget(Paragraph::new(lines), inner);
}

/// Grid cell content, later cells overwrite earlier ones.
#[derive(Clone, Copy, PartialEq)]
enum ChartCell {
    Empty,
    Guide,
    Smooth,
    Point,
    Violation,
}

/// Plot the series into a character grid.
///
/// Guide rows mark the control limits and center line where they fall
/// inside the plotted value range; the moving average draws under the raw
/// samples, and out-of-control samples are highlighted.
fn chart_lines(metric: &MetricData, width: usize, height: usize, theme: &Theme) -> Vec<Line<'static>> {
    let Ok(points) = sparkline_points(
        &metric.samples,
        (width - 1) as f64,
        (height - 1) as f64,
    ) else {
        return vec![Line::from(" not enough samples to draw a chart")];
    };

    let mut grid = vec![vec![ChartCell::Empty; width]; height];

    // Guides first, so everything else draws over them
    if let Some(limits) = metric.limits {
        for guide in [limits.upper_limit, limits.center, limits.lower_limit] {
            if let Some(row) = value_row(&metric.samples, guide, height) {
                for cell in &mut grid[row] {
                    *cell = ChartCell::Guide;
                }
            }
        }
    }

    // Moving-average trend on the same scale as the raw samples
    let x_step = (width - 1) as f64 / (metric.smoothed.len() - 1) as f64;
    for (i, &v) in metric.smoothed.iter().enumerate() {
        if let Some(row) = value_row(&metric.samples, v, height) {
            let col = ((i as f64 * x_step).round() as usize).min(width - 1);
            grid[row][col] = ChartCell::Smooth;
        }
    }

    for (i, point) in points.iter().enumerate() {
        let col = (point.x.round() as usize).min(width - 1);
        let row = (point.y.round() as usize).min(height - 1);
        grid[row][col] = if metric.violations.binary_search(&i).is_ok() {
            ChartCell::Violation
        } else {
            ChartCell::Point
        };
    }

    let point_style = Style::default().fg(theme.highlight);
    let smooth_style = Style::default().fg(theme.stable).add_modifier(Modifier::DIM);
    let guide_style = Style::default().fg(theme.border).add_modifier(Modifier::DIM);
    let violation_style = Style::default().fg(theme.critical).add_modifier(Modifier::BOLD);

    grid.into_iter()
        .map(|row| {
            let spans: Vec<Span> = row
                .into_iter()
                .map(|cell| match cell {
                    ChartCell::Empty => Span::raw(" "),
                    ChartCell::Guide => Span::styled("┄", guide_style),
                    ChartCell::Smooth => Span::styled("·", smooth_style),
                    ChartCell::Point => Span::styled("•", point_style),
                    ChartCell::Violation => Span::styled("●", violation_style),
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

/// Map a value onto a chart row using the same scale as the samples.
///
/// Returns `None` when the value falls outside the plotted range or the
/// range is degenerate.
fn value_row(samples: &[f64], value: f64, height: usize) -> Option<usize> {
    let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
    let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if range <= 0.0 || value < min || value > max {
        return None;
    }

    let row = (height - 1) as f64 - (value - min) / range * (height - 1) as f64;
    Some((row.round() as usize).min(height - 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DashboardData, Thresholds};
    use crate::source::SeriesPayload;
    use std::collections::BTreeMap;

    fn metric_with(samples: &[f64]) -> MetricData {
        let mut snapshot = BTreeMap::new();
        snapshot.insert(
            "m".to_string(),
            SeriesPayload {
                samples: samples.to_vec(),
                unit: None,
                gauge_min: None,
                gauge_max: None,
            },
        );
        DashboardData::from_snapshot(snapshot, &Thresholds::default(), 3)
            .metrics
            .remove(0)
    }

    #[test]
    fn test_chart_lines_dimensions() {
        let metric = metric_with(&[1.0, 2.0, 3.0, 2.0]);
        let lines = chart_lines(&metric, 20, 8, &Theme::dark());
        assert_eq!(lines.len(), 8);
    }

    #[test]
    fn test_chart_lines_short_series_message() {
        let metric = metric_with(&[1.0]);
        let lines = chart_lines(&metric, 20, 8, &Theme::dark());
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn test_value_row_scales_and_inverts() {
        let samples = [0.0, 10.0];
        assert_eq!(value_row(&samples, 0.0, 5), Some(4));
        assert_eq!(value_row(&samples, 10.0, 5), Some(0));
        assert_eq!(value_row(&samples, 5.0, 5), Some(2));
        assert_eq!(value_row(&samples, 11.0, 5), None);
    }

    #[test]
    fn test_value_row_degenerate_range() {
        assert_eq!(value_row(&[3.0, 3.0], 3.0, 5), None);
    }
}
