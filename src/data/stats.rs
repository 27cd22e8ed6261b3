//! Statistical transforms for measurement series.
//!
//! Pure functions over `&[f64]` slices: trailing moving average, EWMA
//! smoothing, Shewhart control limits, and descriptive summaries. No state,
//! no I/O; every function is deterministic and safe to call from any thread.

use thiserror::Error;

/// Contract violations in the statistics layer.
///
/// These signal bad caller input; there is no fallback data to substitute
/// at this level, so callers guard before invoking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StatsError {
    /// The series is empty; mean and variance are undefined.
    #[error("series is empty")]
    EmptySeries,
    /// The moving-average window must contain at least one sample.
    #[error("window size must be at least 1")]
    ZeroWindow,
    /// The EWMA smoothing factor must lie in (0, 1].
    #[error("smoothing factor must be in (0, 1]")]
    InvalidLambda,
}

/// Shewhart control limits derived from a single series.
///
/// Recomputed wholesale whenever the source series changes; never mutated
/// in place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlLimits {
    /// Center line (arithmetic mean).
    pub center: f64,
    /// Population standard deviation (divisor N).
    pub sigma: f64,
    /// Upper control limit: center + 3·sigma.
    pub upper_limit: f64,
    /// Lower control limit: center − 3·sigma.
    pub lower_limit: f64,
}

impl ControlLimits {
    /// Indices of samples strictly outside the control limits.
    ///
    /// A length-1 series has sigma 0 and collapsed limits; any sample equal
    /// to the center is in control.
    pub fn out_of_control(&self, series: &[f64]) -> Vec<usize> {
        series
            .iter()
            .enumerate()
            .filter(|(_, &v)| v > self.upper_limit || v < self.lower_limit)
            .map(|(i, _)| i)
            .collect()
    }

    /// How many sigmas the value sits from the center line.
    ///
    /// Returns 0 for an exact hit and infinity when sigma is 0 and the
    /// value is off-center (the limits have collapsed to a single point).
    pub fn deviation_sigmas(&self, value: f64) -> f64 {
        let distance = (value - self.center).abs();
        if distance == 0.0 {
            0.0
        } else if self.sigma == 0.0 {
            f64::INFINITY
        } else {
            distance / self.sigma
        }
    }
}

/// Trailing moving average with a variable-width start.
///
/// `result[i]` is the mean of `series[max(0, i-window+1) ..= i]`: the window
/// grows until it reaches full width at `i = window - 1`. Output length
/// always equals input length; an empty series yields an empty result.
pub fn moving_average(series: &[f64], window: usize) -> Result<Vec<f64>, StatsError> {
    if window == 0 {
        return Err(StatsError::ZeroWindow);
    }

    let mut out = Vec::with_capacity(series.len());
    for i in 0..series.len() {
        let start = (i + 1).saturating_sub(window);
        let slice = &series[start..=i];
        out.push(slice.iter().sum::<f64>() / slice.len() as f64);
    }

    Ok(out)
}

/// Compute three-sigma Shewhart limits for a series.
///
/// Sigma is the population standard deviation (divisor N, not N−1). A
/// length-1 series is valid: sigma is 0 and both limits equal the center.
pub fn control_limits(series: &[f64]) -> Result<ControlLimits, StatsError> {
    if series.is_empty() {
        return Err(StatsError::EmptySeries);
    }

    let n = series.len() as f64;
    let center = series.iter().sum::<f64>() / n;
    let variance = series.iter().map(|v| (v - center).powi(2)).sum::<f64>() / n;
    let sigma = variance.sqrt();

    Ok(ControlLimits {
        center,
        sigma,
        upper_limit: center + 3.0 * sigma,
        lower_limit: center - 3.0 * sigma,
    })
}

/// Exponentially weighted moving average.
///
/// Seeded with the series mean: `z[0] = mean(series)`, then
/// `z[i] = lambda·series[i] + (1−lambda)·z[i−1]`. Output length equals
/// input length.
pub fn ewma(series: &[f64], lambda: f64) -> Result<Vec<f64>, StatsError> {
    if series.is_empty() {
        return Err(StatsError::EmptySeries);
    }
    if !(lambda > 0.0 && lambda <= 1.0) {
        return Err(StatsError::InvalidLambda);
    }

    let mean = series.iter().sum::<f64>() / series.len() as f64;
    let mut out = Vec::with_capacity(series.len());
    let mut z = mean;
    out.push(z);

    for &v in &series[1..] {
        z = lambda * v + (1.0 - lambda) * z;
        out.push(z);
    }

    Ok(out)
}

/// Descriptive summary of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesSummary {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Most recent sample.
    pub last: f64,
}

/// Count, mean, extrema, and latest sample of a series.
pub fn summarize(series: &[f64]) -> Result<SeriesSummary, StatsError> {
    if series.is_empty() {
        return Err(StatsError::EmptySeries);
    }

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    for &v in series {
        min = min.min(v);
        max = max.max(v);
        sum += v;
    }

    Ok(SeriesSummary {
        count: series.len(),
        mean: sum / series.len() as f64,
        min,
        max,
        last: series[series.len() - 1],
    })
}
