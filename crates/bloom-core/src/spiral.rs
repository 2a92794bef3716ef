//! Spiral placement: golden-angle azimuths and the elevation recurrence.
//!
//! Each point sits on a sphere of radius R. Azimuth is simply
//! `i * delta_theta`; elevation marches upward from `start_angle` by
//! re-aiming at the previous point's realized position lifted by
//! `delta_height`:
//!
//!   elevation[0]   = start_angle
//!   elevation[i+1] = atan((y_i + delta_height) / xz_radius_i)
//!
//! This is a genuine recurrence, not a closed form - each elevation
//! depends on the previous point's realized 3-D position, so floating-
//! point drift accumulates along the chain and any parameter change
//! requires a full re-walk from index 0.

use serde::Serialize;

use crate::cancel::CancelToken;
use crate::config::BloomConfig;
use crate::geometry::Point3;

/// The exact golden angle in degrees: 360 / phi^2.
///
/// `delta_theta` defaults to the conventional rounded 137.5; this
/// constant is here for callers that want the full-precision value.
pub const GOLDEN_ANGLE_DEGREES: f64 = 137.50776405003785;

/// One placed spiral point: angles plus the realized inner position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpiralPoint {
    pub index: usize,
    /// Azimuth in degrees, wrapped to [0, 360).
    pub azimuth: f64,
    /// Elevation in degrees. Negative below the equator; approaches but
    /// never reaches 90 for positive radius.
    pub elevation: f64,
    /// Position at radius R.
    pub inner: Point3,
}

/// Place all N points for a configuration.
pub fn place_points(config: &BloomConfig) -> Vec<SpiralPoint> {
    place_points_cancellable(config, &CancelToken::new(), |_, _| {})
}

/// Place points with a cancel check and progress report each iteration.
///
/// On cancellation the partial sequence built so far is returned; indices
/// are contiguous from 0, so the result is a valid (shorter) spiral.
pub fn place_points_cancellable<F>(
    config: &BloomConfig,
    cancel: &CancelToken,
    mut progress: F,
) -> Vec<SpiralPoint>
where
    F: FnMut(usize, usize),
{
    let n = config.num_points;
    let mut points = Vec::with_capacity(n);
    let mut elevation = config.start_angle;

    for i in 0..n {
        if cancel.is_cancelled() {
            break;
        }

        let azimuth = (i as f64 * config.delta_theta).rem_euclid(360.0);
        let el = elevation.to_radians();
        let az = azimuth.to_radians();
        let inner = Point3::new(
            config.radius * el.cos() * az.cos(),
            config.radius * el.sin(),
            config.radius * el.cos() * az.sin(),
        );

        points.push(SpiralPoint { index: i, azimuth, elevation, inner });

        // Aim the next elevation at this point's position lifted by one
        // height step. Signed atan: the spiral can dip below the equator
        // when start_angle is negative.
        let lifted = inner.y + config.delta_height;
        elevation = (lifted / inner.horizontal_radius()).atan().to_degrees();

        progress(i + 1, n);
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(n: usize) -> BloomConfig {
        BloomConfig { num_points: n, ..BloomConfig::default() }
    }

    #[test]
    fn first_elevation_is_exactly_start_angle() {
        for start in [-85.0, -12.5, 0.0, 30.0, 85.0] {
            let cfg = BloomConfig { start_angle: start, ..config(20) };
            let points = place_points(&cfg);
            assert_eq!(points[0].elevation, start);
        }
    }

    #[test]
    fn recurrence_is_deterministic() {
        let cfg = config(150);
        let a = place_points(&cfg);
        let b = place_points(&cfg);
        for (pa, pb) in a.iter().zip(&b) {
            assert_eq!(pa.elevation, pb.elevation);
            assert_eq!(pa.inner, pb.inner);
        }
    }

    #[test]
    fn elevations_climb_and_stay_under_ninety() {
        let points = place_points(&config(500));
        for pair in points.windows(2) {
            assert!(pair[1].elevation > pair[0].elevation);
        }
        assert!(points.last().unwrap().elevation < 90.0);
    }

    #[test]
    fn negative_start_angle_goes_below_equator() {
        let cfg = BloomConfig { start_angle: -45.0, ..config(20) };
        let points = place_points(&cfg);
        assert!(points[0].inner.y < 0.0);
    }

    #[test]
    fn azimuth_wraps_mod_360() {
        let points = place_points(&config(20));
        // index 3: 3 * 137.5 = 412.5 -> 52.5
        assert!((points[3].azimuth - 52.5).abs() < 1e-9);
        for p in &points {
            assert!(p.azimuth >= 0.0 && p.azimuth < 360.0);
        }
    }

    #[test]
    fn points_sit_on_the_sphere() {
        let cfg = config(100);
        for p in place_points(&cfg) {
            assert!((p.inner.length() - cfg.radius).abs() < 1e-9);
        }
    }

    #[test]
    fn cancellation_keeps_partial_prefix() {
        let cancel = CancelToken::new();
        let cfg = config(100);
        let points = place_points_cancellable(&cfg, &cancel, |done, _| {
            if done == 40 {
                cancel.cancel();
            }
        });
        assert_eq!(points.len(), 40);
        // The partial prefix matches an uncancelled run exactly.
        let full = place_points(&cfg);
        assert_eq!(points[..], full[..40]);
    }

    #[test]
    fn golden_angle_constant_is_golden() {
        let phi = (1.0 + 5.0_f64.sqrt()) / 2.0;
        assert!((GOLDEN_ANGLE_DEGREES - 360.0 / (phi * phi)).abs() < 1e-9);
    }
}
