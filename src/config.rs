//! Configuration loading and resolution.
//!
//! Settings come from three layers: built-in defaults, an optional TOML
//! config file, and CLI flags. CLI flags win over the file, the file wins
//! over defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::data::Thresholds;
use crate::source::MetricsSnapshot;

/// Default metrics endpoint.
pub const DEFAULT_URL: &str = "http://localhost:8080/metrics";
/// Default refresh period in seconds.
pub const DEFAULT_REFRESH_SECS: u64 = 5;
/// Default moving-average window in samples.
pub const DEFAULT_WINDOW: usize = 3;

/// Raw contents of a config file. All keys are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub url: Option<String>,
    pub refresh_secs: Option<u64>,
    pub window: Option<usize>,
    pub warning_sigmas: Option<f64>,
    pub critical_sigmas: Option<f64>,
    pub fallback: Option<PathBuf>,
}

/// CLI-provided overrides, prior to resolution.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub refresh_secs: Option<u64>,
    pub window: Option<usize>,
    pub warning_sigmas: Option<f64>,
    pub critical_sigmas: Option<f64>,
    pub fallback: Option<PathBuf>,
}

/// Fully resolved settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub url: String,
    /// `None` disables the schedule: fetch once, never refresh.
    pub refresh: Option<Duration>,
    pub window: usize,
    pub thresholds: Thresholds,
    pub fallback_path: Option<PathBuf>,
}

impl Settings {
    /// Merge CLI overrides over file config over defaults.
    ///
    /// A refresh of 0 seconds means "fetch once"; a window of 0 is
    /// rejected rather than silently clamped.
    pub fn resolve(cli: Overrides, file: Option<FileConfig>) -> Result<Self> {
        let file = file.unwrap_or_default();
        let defaults = Thresholds::default();

        let refresh_secs = cli
            .refresh_secs
            .or(file.refresh_secs)
            .unwrap_or(DEFAULT_REFRESH_SECS);
        let refresh = (refresh_secs > 0).then(|| Duration::from_secs(refresh_secs));

        let window = cli.window.or(file.window).unwrap_or(DEFAULT_WINDOW);
        if window == 0 {
            bail!("moving-average window must be at least 1");
        }

        let thresholds = Thresholds {
            warning_sigmas: cli
                .warning_sigmas
                .or(file.warning_sigmas)
                .unwrap_or(defaults.warning_sigmas),
            critical_sigmas: cli
                .critical_sigmas
                .or(file.critical_sigmas)
                .unwrap_or(defaults.critical_sigmas),
        };
        if thresholds.critical_sigmas < thresholds.warning_sigmas {
            bail!(
                "critical threshold ({}σ) is below the warning threshold ({}σ)",
                thresholds.critical_sigmas,
                thresholds.warning_sigmas
            );
        }

        Ok(Self {
            url: cli.url.or(file.url).unwrap_or_else(|| DEFAULT_URL.to_string()),
            refresh,
            window,
            thresholds,
            fallback_path: cli.fallback.or(file.fallback),
        })
    }
}

/// Load a config file (TOML).
pub fn load_file_config(path: &Path) -> Result<FileConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .build()
        .with_context(|| format!("failed to read config file {}", path.display()))?;

    settings
        .try_deserialize()
        .with_context(|| format!("invalid config file {}", path.display()))
}

/// Load a fallback dataset from a JSON file.
///
/// The dataset is passed verbatim to the polling source; nothing is
/// synthesized.
pub fn load_fallback(path: &Path) -> Result<MetricsSnapshot> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read fallback dataset {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("fallback dataset {} is not a metrics snapshot", path.display()))
}
