// Binary includes library modules - some public API items are only for library consumers
#![allow(unused)]

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::Event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use tracing_subscriber::EnvFilter;

mod app;
mod config;
mod data;
mod events;
mod source;
mod ui;

use app::{App, View};
use crate::config::{Overrides, Settings};
use source::{MetricsSnapshot, PollingSource};

#[derive(Parser, Debug)]
#[command(name = "spcwatch")]
#[command(about = "Terminal dashboard for live statistical process control metrics")]
struct Args {
    /// Metrics endpoint URL
    #[arg(short, long)]
    url: Option<String>,

    /// JSON fallback dataset substituted when a fetch fails
    #[arg(short, long)]
    fallback: Option<PathBuf>,

    /// Refresh interval in seconds (0 fetches once and never refreshes)
    #[arg(short, long)]
    refresh: Option<u64>,

    /// Moving-average window in samples
    #[arg(short, long)]
    window: Option<usize>,

    /// Warning threshold in sigmas
    #[arg(long)]
    warn_sigmas: Option<f64>,

    /// Out-of-control threshold in sigmas
    #[arg(long)]
    crit_sigmas: Option<f64>,

    /// TOML config file (CLI flags take precedence)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so they never fight the TUI for stdout; enable
    // them with RUST_LOG.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let file_config = args
        .config
        .as_deref()
        .map(crate::config::load_file_config)
        .transpose()?;

    let settings = Settings::resolve(
        Overrides {
            url: args.url,
            refresh_secs: args.refresh,
            window: args.window,
            warning_sigmas: args.warn_sigmas,
            critical_sigmas: args.crit_sigmas,
            fallback: args.fallback,
        },
        file_config,
    )?;

    let fallback = match &settings.fallback_path {
        Some(path) => crate::config::load_fallback(path)?,
        None => MetricsSnapshot::new(),
    };

    // The poller runs on a background runtime; the TUI renders
    // synchronously on the main thread.
    let runtime = tokio::runtime::Runtime::new()?;
    let _enter = runtime.enter();

    let mut source = PollingSource::new();
    source.start(settings.url.clone(), fallback, settings.refresh);

    run_tui(source, &settings)
}

/// Run the TUI around the given polling source
fn run_tui(source: PollingSource<MetricsSnapshot>, settings: &Settings) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    let mut app = App::new(source, settings.thresholds.clone(), settings.window);
    app.refresh();

    // Run the main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 12;

    while app.running {
        // Draw UI
        terminal.draw(|frame| {
            let area = frame.area();

            // Check for minimum terminal size
            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let centered = ratatui::layout::Rect::new(0, area.height / 2 - 2, area.width, 5);
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Length(1), // Tabs
                Constraint::Min(8),    // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::common::render_tabs(frame, app, chunks[1]);

            match app.current_view {
                View::Overview => ui::overview::render(frame, app, chunks[2]),
                View::Gauges => ui::gauges::render(frame, app, chunks[2]),
            }

            ui::common::render_status_bar(frame, app, chunks[3]);

            if app.show_detail_overlay {
                ui::detail::render_overlay(frame, app, area);
            }

            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        // Poll for events with a short timeout
        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }

        // Drain the source; the poller publishes on its own schedule
        app.refresh();
    }

    Ok(())
}
