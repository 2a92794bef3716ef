//! Thickness model: outer offsets from neighbor distances.
//!
//! A point's "thickness" is the distance to its neighbor n1 indices ahead
//! (the first Fibonacci offset), scaled by the configured thickness and a
//! linear growth term across the sequence. The outer control point sits
//! that far beyond the inner one, radially away from the center.

use crate::config::BloomConfig;
use crate::geometry::Point3;
use crate::spiral::SpiralPoint;

/// Per-point outer offsets.
///
/// For the last n1 indices the forward neighbor does not exist, so the
/// lookup wraps to `i - n1`. If the sequence is shorter than n1 in both
/// directions the offset collapses to zero rather than erroring.
pub fn outer_offsets(points: &[SpiralPoint], config: &BloomConfig) -> Vec<f64> {
    let n = points.len();
    let (n1, _) = config.neighbor_offsets;

    points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let neighbor = if i + n1 < n {
                i + n1
            } else if i >= n1 {
                i - n1
            } else {
                i
            };
            let growth = growth_factor(i, n, config.thickness_growth);
            p.inner.distance(points[neighbor].inner) * config.thickness * growth
        })
        .collect()
}

/// The linear growth term: 1 + i * growth / N.
///
/// growth = 0 gives uniform thickness; negative growth thins toward the
/// end of the sequence.
#[inline]
pub fn growth_factor(index: usize, n: usize, growth: f64) -> f64 {
    1.0 + index as f64 * growth / n as f64
}

/// Push an inner position radially outward (away from the origin) by the
/// given offset.
pub fn outer_position(inner: Point3, offset: f64) -> Point3 {
    let len = inner.length();
    if len == 0.0 {
        return inner;
    }
    inner.scaled((len + offset) / len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spiral::place_points;

    #[test]
    fn growth_factor_endpoints() {
        let n = 200;
        let growth = 3.0;
        assert_eq!(growth_factor(0, n, growth), 1.0);
        let expected = 1.0 + (n as f64 - 1.0) * growth / n as f64;
        assert_eq!(growth_factor(n - 1, n, growth), expected);
    }

    #[test]
    fn zero_growth_is_uniform_scaling() {
        let config = BloomConfig { thickness_growth: 0.0, ..BloomConfig::default() };
        let points = place_points(&config);
        let offsets = outer_offsets(&points, &config);
        let n1 = config.neighbor_offsets.0;
        // Offset is exactly thickness * neighbor distance, no growth term.
        for (i, offset) in offsets.iter().enumerate().take(points.len() - n1) {
            let dist = points[i].inner.distance(points[i + n1].inner);
            assert!((offset - dist * config.thickness).abs() < 1e-9);
        }
    }

    #[test]
    fn tail_wraps_to_backward_neighbor() {
        let config = BloomConfig::default();
        let points = place_points(&config);
        let offsets = outer_offsets(&points, &config);
        let n = points.len();
        let n1 = config.neighbor_offsets.0;

        let last = n - 1;
        let dist = points[last].inner.distance(points[last - n1].inner);
        let expected = dist
            * config.thickness
            * growth_factor(last, n, config.thickness_growth);
        assert!((offsets[last] - expected).abs() < 1e-9);
    }

    #[test]
    fn negative_growth_thins_toward_end() {
        let config = BloomConfig {
            thickness_growth: -2.0,
            ..BloomConfig::default()
        };
        assert!(growth_factor(config.num_points - 1, config.num_points, -2.0) < 1.0);
    }

    #[test]
    fn outer_position_extends_radius() {
        let inner = Point3::new(0.0, 20.0, 0.0);
        let outer = outer_position(inner, 5.0);
        assert!((outer.length() - 25.0).abs() < 1e-9);
        // Same direction.
        assert_eq!(outer.x, 0.0);
        assert_eq!(outer.z, 0.0);
    }

    #[test]
    fn offset_count_matches_point_count() {
        let config = BloomConfig { num_points: 57, ..BloomConfig::default() };
        let points = place_points(&config);
        assert_eq!(outer_offsets(&points, &config).len(), 57);
    }
}
