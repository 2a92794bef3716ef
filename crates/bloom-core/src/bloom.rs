//! The bloom itself: configuration plus lazily recomputed layout.
//!
//! A [`Bloom`] is either Stale (a parameter was written since the last
//! recompute) or Consistent, and the recompute is a full O(N) re-walk of
//! placement, thickness and cage wiring. There is no debouncing and no
//! incremental update - rapid successive edits each pay for a full
//! recompute.

use serde::Serialize;

use crate::cage::{Cage, build_cages_cancellable};
use crate::cancel::CancelToken;
use crate::config::{BloomConfig, ConfigError, Param};
use crate::geometry::Point3;
use crate::spiral::place_points_cancellable;
use crate::thickness::{outer_offsets, outer_position};

/// A fully computed spiral point: inner and outer control positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BloomPoint {
    pub index: usize,
    /// Azimuth in degrees, [0, 360).
    pub azimuth: f64,
    /// Elevation in degrees.
    pub elevation: f64,
    /// Outer offset distance for this point.
    pub thickness: f64,
    /// Control position at radius R.
    pub inner: Point3,
    /// Control position at radius R + thickness.
    pub outer: Point3,
}

/// Errors from building a bloom.
#[derive(Debug, Clone, PartialEq)]
pub enum BloomError {
    /// A parameter is outside its valid range. Raised before any state is
    /// touched.
    Config(ConfigError),
    /// Placement produced a non-finite coordinate at this index. The
    /// first bad index aborts the build; a NaN is never silently carried
    /// into thickness or cage wiring.
    BadPoint { index: usize },
}

impl std::fmt::Display for BloomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BloomError::Config(e) => write!(f, "invalid config: {}", e),
            BloomError::BadPoint { index } => {
                write!(f, "placement produced a non-finite position at index {}", index)
            }
        }
    }
}

impl std::error::Error for BloomError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BloomError::Config(e) => Some(e),
            BloomError::BadPoint { .. } => None,
        }
    }
}

impl From<ConfigError> for BloomError {
    fn from(e: ConfigError) -> Self {
        BloomError::Config(e)
    }
}

/// Compute the full point set for a configuration.
///
/// Pure: same config in, same points out. This is the function to call
/// when no live editing is involved.
pub fn compute_points(config: &BloomConfig) -> Result<Vec<BloomPoint>, BloomError> {
    config.validate()?;
    let placed = place_points_cancellable(config, &CancelToken::new(), |_, _| {});
    assemble_points(&placed, config)
}

fn assemble_points(
    placed: &[crate::spiral::SpiralPoint],
    config: &BloomConfig,
) -> Result<Vec<BloomPoint>, BloomError> {
    for p in placed {
        if !p.inner.is_finite() || !p.elevation.is_finite() {
            return Err(BloomError::BadPoint { index: p.index });
        }
    }

    let offsets = outer_offsets(placed, config);
    Ok(placed
        .iter()
        .zip(&offsets)
        .map(|(p, &thickness)| BloomPoint {
            index: p.index,
            azimuth: p.azimuth,
            elevation: p.elevation,
            thickness,
            inner: p.inner,
            outer: outer_position(p.inner, thickness),
        })
        .collect())
}

/// Configuration plus derived layout, with explicit staleness.
#[derive(Debug, Clone)]
pub struct Bloom {
    config: BloomConfig,
    points: Vec<BloomPoint>,
    cages: Vec<Cage>,
    stale: bool,
}

impl Bloom {
    /// Create a bloom. Validates the config up front; nothing is computed
    /// until the first accessor or explicit recompute.
    pub fn new(config: BloomConfig) -> Result<Self, BloomError> {
        config.validate()?;
        Ok(Self { config, points: Vec::new(), cages: Vec::new(), stale: true })
    }

    pub fn config(&self) -> &BloomConfig {
        &self.config
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Replace the whole configuration. Marks the bloom stale.
    pub fn set_config(&mut self, config: BloomConfig) -> Result<(), BloomError> {
        config.validate()?;
        self.config = config;
        self.stale = true;
        Ok(())
    }

    /// Write one parameter (clamped to its range). Marks the bloom stale.
    pub fn set_param(&mut self, param: Param, value: f64) {
        param.set(&mut self.config, value);
        self.stale = true;
    }

    /// The computed points, recomputing first if stale.
    pub fn points(&mut self) -> Result<&[BloomPoint], BloomError> {
        self.ensure_consistent()?;
        Ok(&self.points)
    }

    /// The wired cages, recomputing first if stale.
    pub fn cages(&mut self) -> Result<&[Cage], BloomError> {
        self.ensure_consistent()?;
        Ok(&self.cages)
    }

    /// Whatever points are currently held, stale or not.
    ///
    /// After a cancelled recompute this is the partial build - kept on
    /// purpose so it can be inspected.
    pub fn current_points(&self) -> &[BloomPoint] {
        &self.points
    }

    /// Whatever cages are currently held, stale or not.
    pub fn current_cages(&self) -> &[Cage] {
        &self.cages
    }

    fn ensure_consistent(&mut self) -> Result<(), BloomError> {
        if self.stale {
            self.recompute()?;
        }
        Ok(())
    }

    /// Full re-walk of placement, thickness and cage wiring.
    ///
    /// Idempotent: recomputing twice with unchanged parameters produces
    /// identical state.
    pub fn recompute(&mut self) -> Result<(), BloomError> {
        self.recompute_cancellable(&CancelToken::new(), |_, _| {})
    }

    /// Recompute with cooperative cancellation and progress reporting.
    ///
    /// Progress counts placed points first, then wired cages. If the
    /// token fires mid-build the partial points/cages are stored, the
    /// bloom stays Stale, and `Ok(())` is returned: cancellation is a
    /// user action, not a failure.
    pub fn recompute_cancellable<F>(
        &mut self,
        cancel: &CancelToken,
        mut progress: F,
    ) -> Result<(), BloomError>
    where
        F: FnMut(usize, usize),
    {
        self.config.validate()?;

        let n = self.config.num_points;
        let total = n + crate::cage::cage_count(n, self.config.neighbor_offsets);

        let placed =
            place_points_cancellable(&self.config, cancel, |done, _| progress(done, total));
        let points = assemble_points(&placed, &self.config)?;

        let cages = build_cages_cancellable(
            &points,
            self.config.neighbor_offsets,
            cancel,
            |done, _| progress(n + done, total),
        );

        self.points = points;
        self.cages = cages;
        self.stale = cancel.is_cancelled();
        Ok(())
    }
}
