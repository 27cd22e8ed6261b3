//! Gauges view rendering.
//!
//! Displays a card per metric with a gauge bar driven by the geometry
//! mapper. The gauge consumes `percentage` only; cell geometry (bar
//! length, label placement) belongs to this layer, not the mapper.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::{gauge_geometry, ControlStatus, MetricData};

use super::overview::format_value;

/// Height of one gauge card, including borders.
const CARD_HEIGHT: u16 = 5;
/// Minimum card width before the grid drops a column.
const CARD_MIN_WIDTH: u16 = 26;

/// Render the Gauges view as a grid of cards.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let Some(ref data) = app.data else {
        return;
    };
    if data.metrics.is_empty() {
        return;
    }

    let columns = ((area.width / CARD_MIN_WIDTH).max(1) as usize).min(data.metrics.len());
    let visible_rows = ((area.height / CARD_HEIGHT).max(1) as usize)
        .min(data.metrics.len().div_ceil(columns));

    let row_areas = Layout::vertical(vec![Constraint::Length(CARD_HEIGHT); visible_rows])
        .split(area);

    for (row_idx, row_area) in row_areas.iter().enumerate() {
        let col_areas = Layout::horizontal(vec![
            Constraint::Ratio(1, columns as u32);
            columns
        ])
        .split(*row_area);

        for (col_idx, card_area) in col_areas.iter().enumerate() {
            let metric_idx = row_idx * columns + col_idx;
            if let Some(metric) = data.metrics.get(metric_idx) {
                render_card(frame, app, metric, metric_idx, *card_area);
            }
        }
    }
}

fn render_card(frame: &mut Frame, app: &App, metric: &MetricData, index: usize, area: Rect) {
    let border_style = if index == app.selected_metric_index {
        Style::default().fg(app.theme.highlight)
    } else {
        Style::default().fg(app.theme.border)
    };
    let block = Block::default()
        .title(format!(" {} ", metric.name))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(border_style);

    let Some(summary) = metric.summary else {
        frame.render_widget(Paragraph::new(" no samples").block(block), area);
        return;
    };

    match gauge_geometry(summary.last, metric.gauge_min, metric.gauge_max) {
        Ok(geometry) => {
            let label = format!(
                "{} ({:.0}%)",
                format_value(summary.last, metric.unit.as_deref()),
                geometry.percentage
            );
            let gauge = Gauge::default()
                .block(block)
                .gauge_style(Style::default().fg(bar_color(app, metric.status)))
                .ratio(geometry.percentage / 100.0)
                .label(label);
            frame.render_widget(gauge, area);
        }
        Err(_) => {
            // gauge_min == gauge_max; nothing sensible to draw
            frame.render_widget(Paragraph::new(" empty gauge scale").block(block), area);
        }
    }
}

fn bar_color(app: &App, status: ControlStatus) -> Color {
    match status {
        ControlStatus::Stable => app.theme.gauge,
        ControlStatus::Warning => app.theme.warning,
        ControlStatus::OutOfControl => app.theme.critical,
    }
}
