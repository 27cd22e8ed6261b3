//! Overview rendering.
//!
//! Displays a table of all metrics with their latest value, center line,
//! sigma, control limits, trend sparkline, and control status.

use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::{sparkline_points, MetricData};

/// Sparkline characters (8 levels of height).
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Number of samples shown in the trend column.
const TREND_WIDTH: usize = 8;

/// Render the Overview showing all metrics in a table.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let Some(ref data) = app.data else {
        return;
    };

    let header = Row::new(vec![
        Cell::from("Metric"),
        Cell::from("Last"),
        Cell::from("Mean"),
        Cell::from("Sigma"),
        Cell::from("LCL"),
        Cell::from("UCL"),
        Cell::from("Trend"),
        Cell::from("Status"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = data
        .metrics
        .iter()
        .map(|m| {
            let status_style = app.theme.status_style(m.status);

            let (last, mean) = match m.summary {
                Some(s) => (format_value(s.last, m.unit.as_deref()), format_value(s.mean, None)),
                None => ("-".to_string(), "-".to_string()),
            };
            let (sigma, lcl, ucl) = match m.limits {
                Some(l) => (
                    format_value(l.sigma, None),
                    format_value(l.lower_limit, None),
                    format_value(l.upper_limit, None),
                ),
                None => ("-".to_string(), "-".to_string(), "-".to_string()),
            };

            Row::new(vec![
                Cell::from(m.name.clone()),
                Cell::from(last),
                Cell::from(mean),
                Cell::from(sigma),
                Cell::from(lcl),
                Cell::from(ucl),
                Cell::from(trend_cell(m)),
                Cell::from(m.status.symbol()).style(status_style),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(3), // Metric - gets 3x share (largest)
        Constraint::Fill(1), // Last
        Constraint::Fill(1), // Mean
        Constraint::Fill(1), // Sigma
        Constraint::Fill(1), // LCL
        Constraint::Fill(1), // UCL
        Constraint::Min(TREND_WIDTH as u16),
        Constraint::Min(6), // Status - fixed minimum
    ];

    let selected = app.selected_metric_index.min(data.metrics.len().saturating_sub(1));
    let title = format!(
        " Metrics ({}) [{}/{}] ",
        data.metrics.len(),
        selected + 1,
        data.metrics.len().max(1)
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected));

    frame.render_stateful_widget(table, area, &mut state);
}

/// Render the tail of a series as an 8-level sparkline cell.
///
/// The y coordinates come from the geometry mapper; fewer than two
/// samples produce a blank cell.
fn trend_cell(metric: &MetricData) -> String {
    let tail_start = metric.samples.len().saturating_sub(TREND_WIDTH);
    let tail = &metric.samples[tail_start..];

    let Ok(points) = sparkline_points(tail, tail.len().saturating_sub(1) as f64, 7.0) else {
        return " ".repeat(TREND_WIDTH);
    };

    let bars: String = points
        .iter()
        .map(|p| {
            let level = (7.0 - p.y).round().clamp(0.0, 7.0) as usize;
            SPARKLINE_CHARS[level]
        })
        .collect();

    // Right-align short trends within the column
    format!("{:>width$}", bars, width = TREND_WIDTH)
}

/// Format a value for a table cell, appending the unit when it is short.
pub fn format_value(v: f64, unit: Option<&str>) -> String {
    let number = if v.abs() >= 1000.0 {
        format!("{:.0}", v)
    } else {
        format!("{:.2}", v)
    };
    match unit {
        Some(u) if u.len() <= 3 => format!("{}{}", number, u),
        _ => number,
    }
}
