//! Data processing for metrics snapshots.
//!
//! This module turns raw measurement series into statistics and
//! render-ready geometry.
//!
//! ## Submodules
//!
//! - [`stats`]: Pure statistical transforms - moving average, EWMA,
//!   Shewhart control limits, series summaries
//! - [`geometry`]: Pure geometry mapping - gauge percentage/rotation and
//!   sparkline point layout
//! - [`metrics`]: Processed dashboard model ([`DashboardData`],
//!   [`MetricData`]) with control status computed from [`Thresholds`]
//!
//! ## Data Flow
//!
//! ```text
//! MetricsSnapshot (raw JSON)
//!        │
//!        ▼
//! DashboardData::from_snapshot()
//!        │
//!        ├──▶ stats:    moving_average / control_limits / summarize
//!        │
//!        └──▶ MetricData (with ControlStatus)
//!                │
//!                ▼
//!        geometry: gauge_geometry / sparkline_points (at render time)
//! ```

pub mod geometry;
pub mod metrics;
pub mod stats;

pub use geometry::{gauge_geometry, sparkline_points, GaugeGeometry, GeometryError, Point};
pub use metrics::{ControlStatus, DashboardData, MetricData, Thresholds};
pub use stats::{
    control_limits, ewma, moving_average, summarize, ControlLimits, SeriesSummary, StatsError,
};
