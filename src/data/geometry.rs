//! Geometry mapping for gauges and sparklines.
//!
//! Pure functions turning scalar values or series into normalized drawing
//! coordinates. Rendering layers own their arc radii, stroke widths, and
//! cell sizes; this module only produces percentages, angles, and points.

use thiserror::Error;

/// Contract violations in the geometry layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeometryError {
    /// The gauge scale is empty (min equals max).
    #[error("gauge range is empty (min == max)")]
    InvalidRange,
    /// Sparkline geometry needs at least two samples.
    #[error("sparkline needs at least two samples")]
    InsufficientData,
}

/// Angular representation of a scalar on a semicircular dial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaugeGeometry {
    /// Position on the scale, clamped to 0..=100.
    pub percentage: f64,
    /// Needle rotation: 0% maps to −90°, 100% to +90°.
    pub rotation_degrees: f64,
}

/// Map a value onto a semicircular gauge scale.
///
/// The percentage is clamped to 0..=100, so values outside `[min, max]`
/// pin the needle at an end stop rather than producing out-of-range
/// geometry. Fails when the scale is empty (`min == max`).
pub fn gauge_geometry(value: f64, min: f64, max: f64) -> Result<GaugeGeometry, GeometryError> {
    if max == min {
        return Err(GeometryError::InvalidRange);
    }

    let percentage = ((value - min) / (max - min) * 100.0).clamp(0.0, 100.0);
    let rotation_degrees = percentage * 180.0 / 100.0 - 90.0;

    Ok(GaugeGeometry {
        percentage,
        rotation_degrees,
    })
}

/// A point in drawing space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Map a series onto a `width` × `height` drawing area, one point per
/// sample.
///
/// The x axis spreads samples evenly; the y axis is inverted so larger
/// values plot higher. When every sample is equal the vertical range
/// collapses; the points are placed on a horizontal line at half height
/// rather than failing. Fails with `InsufficientData` below two samples
/// (the x step divides by `len − 1`).
pub fn sparkline_points(
    series: &[f64],
    width: f64,
    height: f64,
) -> Result<Vec<Point>, GeometryError> {
    if series.len() < 2 {
        return Err(GeometryError::InsufficientData);
    }

    let min = series.iter().copied().fold(f64::INFINITY, f64::min);
    let max = series.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    let x_step = width / (series.len() - 1) as f64;

    let points = series
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let y = if range == 0.0 {
                height / 2.0
            } else {
                height - (v - min) / range * height
            };
            Point {
                x: i as f64 * x_step,
                y,
            }
        })
        .collect();

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn test_gauge_endpoints() {
        let low = gauge_geometry(20.0, 20.0, 80.0).unwrap();
        assert_close(low.percentage, 0.0);
        assert_close(low.rotation_degrees, -90.0);

        let high = gauge_geometry(80.0, 20.0, 80.0).unwrap();
        assert_close(high.percentage, 100.0);
        assert_close(high.rotation_degrees, 90.0);
    }

    #[test]
    fn test_gauge_midpoint_is_vertical() {
        let mid = gauge_geometry(50.0, 0.0, 100.0).unwrap();
        assert_close(mid.percentage, 50.0);
        assert_close(mid.rotation_degrees, 0.0);
    }

    #[test]
    fn test_gauge_clamps_out_of_scale_values() {
        assert_close(gauge_geometry(-10.0, 0.0, 100.0).unwrap().percentage, 0.0);
        assert_close(gauge_geometry(250.0, 0.0, 100.0).unwrap().percentage, 100.0);
    }

    #[test]
    fn test_gauge_empty_scale() {
        assert_eq!(
            gauge_geometry(5.0, 50.0, 50.0),
            Err(GeometryError::InvalidRange)
        );
    }

    #[test]
    fn test_sparkline_point_per_sample() {
        let series = [1.0, 3.0, 2.0, 5.0];
        let points = sparkline_points(&series, 90.0, 30.0).unwrap();
        assert_eq!(points.len(), series.len());
    }

    #[test]
    fn test_sparkline_spans_width_and_inverts_y() {
        let points = sparkline_points(&[0.0, 10.0], 100.0, 40.0).unwrap();
        assert_close(points[0].x, 0.0);
        assert_close(points[1].x, 100.0);
        // Smallest sample sits at the bottom, largest at the top.
        assert_close(points[0].y, 40.0);
        assert_close(points[1].y, 0.0);
    }

    #[test]
    fn test_sparkline_interior_point() {
        let points = sparkline_points(&[0.0, 5.0, 10.0], 100.0, 40.0).unwrap();
        assert_close(points[1].x, 50.0);
        assert_close(points[1].y, 20.0);
    }

    #[test]
    fn test_sparkline_degenerate_range_is_flat_midline() {
        let points = sparkline_points(&[4.0, 4.0, 4.0], 60.0, 20.0).unwrap();
        for p in points {
            assert_close(p.y, 10.0);
        }
    }

    #[test]
    fn test_sparkline_rejects_short_series() {
        assert_eq!(
            sparkline_points(&[1.0], 10.0, 10.0),
            Err(GeometryError::InsufficientData)
        );
        assert_eq!(
            sparkline_points(&[], 10.0, 10.0),
            Err(GeometryError::InsufficientData)
        );
    }
}
