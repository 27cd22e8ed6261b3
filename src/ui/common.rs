//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::data::ControlStatus;

/// Render the header bar with an overall control-status overview.
///
/// Displays: status indicator, metric counts by status, fetch state.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        let line = Line::from(vec![
            Span::styled(" SPCWATCH ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("| Waiting for first snapshot..."),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    // Count metrics by control status
    let mut stable = 0;
    let mut warning = 0;
    let mut out_of_control = 0;

    for metric in &data.metrics {
        match metric.status {
            ControlStatus::Stable => stable += 1,
            ControlStatus::Warning => warning += 1,
            ControlStatus::OutOfControl => out_of_control += 1,
        }
    }

    // Overall status indicator
    let (status_icon, status_style) = if out_of_control > 0 {
        ("●", app.theme.status_style(ControlStatus::OutOfControl))
    } else if warning > 0 {
        ("●", app.theme.status_style(ControlStatus::Warning))
    } else {
        ("●", app.theme.status_style(ControlStatus::Stable))
    };

    let mut spans = vec![
        Span::styled(format!(" {} ", status_icon), status_style),
        Span::styled("SPCWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(format!("{}", stable), Style::default().fg(app.theme.stable)),
        Span::raw(" stable "),
        if warning > 0 {
            Span::styled(format!("{}", warning), Style::default().fg(app.theme.warning))
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        },
        Span::raw(" warn "),
        if out_of_control > 0 {
            Span::styled(
                format!("{}", out_of_control),
                Style::default().fg(app.theme.critical).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        },
        Span::raw(" ooc │ "),
        Span::styled(
            format!("{}", data.metrics.len()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" metrics"),
    ];

    if app.loading() {
        spans.push(Span::styled(
            " │ fetching...",
            Style::default().add_modifier(Modifier::DIM),
        ));
    }
    if app.fetch_error.is_some() {
        // Non-blocking indicator; the dashboard keeps rendering fallback data
        spans.push(Span::styled(
            " │ ⚠ fallback data",
            Style::default().fg(app.theme.warning).add_modifier(Modifier::BOLD),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = vec![Line::from(" 1:Overview "), Line::from(" 2:Gauges ")];

    let selected = match app.current_view {
        View::Overview => 0,
        View::Gauges => 1,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows: data source, time since last update, fetch errors, controls.
/// Also displays temporary status messages.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    // Check for temporary status message first
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = "↑↓:select Tab:switch Enter:detail r:recompute ?:help q:quit";

    let status = if let Some(ref data) = app.data {
        let elapsed = data.last_updated.elapsed();
        match &app.fetch_error {
            Some(err) => format!(
                " {} | {} | updated {:.1}s ago | {}",
                app.source_description(),
                err,
                elapsed.as_secs_f64(),
                controls,
            ),
            None => format!(
                " {} | updated {:.1}s ago | {}",
                app.source_description(),
                elapsed.as_secs_f64(),
                controls,
            ),
        }
    } else if let Some(ref err) = app.fetch_error {
        format!(" {} | {} | q:quit", app.source_description(), err)
    } else {
        format!(" {} | loading... | q:quit", app.source_description())
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Navigation",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ←/→ h/l     Switch views"),
        Line::from("  ↑/↓ j/k     Select metric"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  Enter       Metric detail"),
        Line::from("  Esc         Go back"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  r         Recompute from latest snapshot"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 40u16.min(area.width.saturating_sub(4));
    let help_height = 17u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    // Clear the area behind the help
    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
