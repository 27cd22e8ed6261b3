// Library crate: public API items may not be used by the binary
#![allow(unused)]

//! # spcwatch
//!
//! A terminal dashboard and library for live statistical-process-control
//! metrics.
//!
//! This crate polls an HTTP endpoint for named measurement series,
//! degrades gracefully to a caller-supplied fallback dataset when a fetch
//! fails, derives SPC statistics (moving average, EWMA, Shewhart control
//! limits, out-of-control points) from each series, and renders the result
//! as gauges and trend lines in an interactive terminal UI.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│ │
//! │  │ (state) │    │(stats +  │    │(render) │    │         │ │
//! │  └────┬────┘    │ geometry)│    └─────────┘    └─────────┘ │
//! │       │         └──────────┘                                │
//! │       ▼                                                     │
//! │  ┌─────────┐                                                │
//! │  │ source  │◀── HTTP endpoint (fallback dataset on failure)│
//! │  │ (poll)  │                                                │
//! │  └─────────┘                                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Application state, view navigation, and user interaction
//! - **[`source`]**: HTTP polling with `{data, loading, error}` snapshots
//!   ([`PollingSource`]) and the wire format ([`MetricsSnapshot`])
//! - **[`data`]**: Statistics ([`data::stats`]), geometry mapping
//!   ([`data::geometry`]), and the processed dashboard model
//! - **[`ui`]**: Terminal rendering using ratatui - overview table, gauge
//!   cards, control-chart detail overlay, theme support
//! - **[`config`]**: Settings resolution from defaults, config file, and
//!   CLI flags
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Poll an endpoint every 5 seconds, falling back to a static dataset
//! spcwatch --url http://localhost:8080/metrics --fallback baseline.json
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use std::time::Duration;
//! use spcwatch::source::{MetricsSnapshot, PollingSource};
//! use spcwatch::data::{control_limits, moving_average};
//!
//! # tokio_test::block_on(async {
//! let mut source: PollingSource<MetricsSnapshot> = PollingSource::new();
//! source.start(
//!     "http://localhost:8080/metrics",
//!     MetricsSnapshot::new(),
//!     Some(Duration::from_secs(5)),
//! );
//!
//! if let Some(payload) = source.snapshot().data() {
//!     for (name, series) in payload {
//!         let smoothed = moving_average(&series.samples, 3).unwrap();
//!         let limits = control_limits(&series.samples);
//!         println!("{}: {:?}", name, limits);
//!     }
//! }
//! # });
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod events;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use data::{
    ControlLimits, ControlStatus, DashboardData, GaugeGeometry, GeometryError, MetricData, Point,
    SeriesSummary, StatsError, Thresholds,
};
pub use source::{FetchPhase, FetchSnapshot, MetricsSnapshot, PollingSource, SeriesPayload};
