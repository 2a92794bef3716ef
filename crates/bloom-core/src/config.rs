//! Bloom configuration: the editable parameters and their valid ranges.
//!
//! Every parameter carries an enumerated min/max, and editing any of
//! them invalidates the whole layout. The config is a plain value type
//! with an explicit `validate()` - no ambient callbacks, no hidden
//! settings store.

use serde::{Deserialize, Serialize};

/// An inclusive numeric range for a parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
}

impl ParamRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    #[inline]
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }
}

/// Full configuration for one bloom.
///
/// ## Rust Lesson #24: Field Defaults with Serde
///
/// `#[serde(default = "fn_name")]` lets a config file specify only the
/// fields it cares about - everything else falls back to the function's
/// value. Combined with `impl Default`, the same defaults serve both
/// "empty YAML file" and `BloomConfig::default()` in code.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BloomConfig {
    /// Number of spiral points (N).
    #[serde(default = "default_num_points")]
    pub num_points: usize,

    /// Sphere radius for the inner control points.
    #[serde(default = "default_radius")]
    pub radius: f64,

    /// Per-index azimuth increment in degrees.
    #[serde(default = "default_delta_theta")]
    pub delta_theta: f64,

    /// Height step fed into the elevation recurrence.
    #[serde(default = "default_delta_height")]
    pub delta_height: f64,

    /// Elevation of the first point, degrees.
    #[serde(default)]
    pub start_angle: f64,

    /// Base thickness scale for the outer control points.
    #[serde(default = "default_thickness")]
    pub thickness: f64,

    /// Linear thickness growth across the sequence. Zero means uniform;
    /// negative thins toward the end.
    #[serde(default)]
    pub thickness_growth: f64,

    /// Fibonacci-like neighbor offsets (n1, n2) used for thickness lookups
    /// and cage wiring.
    #[serde(default = "default_neighbor_offsets")]
    pub neighbor_offsets: (usize, usize),
}

fn default_num_points() -> usize {
    300
}

fn default_radius() -> f64 {
    20.0
}

fn default_delta_theta() -> f64 {
    137.5
}

fn default_delta_height() -> f64 {
    0.25
}

fn default_thickness() -> f64 {
    5.0
}

fn default_neighbor_offsets() -> (usize, usize) {
    (8, 13)
}

impl Default for BloomConfig {
    fn default() -> Self {
        Self {
            num_points: default_num_points(),
            radius: default_radius(),
            delta_theta: default_delta_theta(),
            delta_height: default_delta_height(),
            start_angle: 0.0,
            thickness: default_thickness(),
            thickness_growth: 0.0,
            neighbor_offsets: default_neighbor_offsets(),
        }
    }
}

/// Error from configuration validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    OutOfRange {
        param: &'static str,
        value: f64,
        range: ParamRange,
    },
    ZeroNeighborOffset,
    NonPositiveRadius(f64),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::OutOfRange { param, value, range } => write!(
                f,
                "{} = {} is outside the valid range [{}, {}]",
                param, value, range.min, range.max
            ),
            ConfigError::ZeroNeighborOffset => {
                write!(f, "neighbor offsets must both be at least 1")
            }
            ConfigError::NonPositiveRadius(r) => {
                write!(f, "radius must be positive, got {}", r)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl BloomConfig {
    /// Check every parameter against its range.
    ///
    /// A point count too small to produce any cage is NOT an error - the
    /// layout degenerates to zero cages, which is a valid (if boring)
    /// bloom.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for param in Param::all() {
            let value = param.get(self);
            let range = param.range();
            if !range.contains(value) {
                return Err(ConfigError::OutOfRange {
                    param: param.name(),
                    value,
                    range,
                });
            }
        }
        if self.radius <= 0.0 {
            return Err(ConfigError::NonPositiveRadius(self.radius));
        }
        let (n1, n2) = self.neighbor_offsets;
        if n1 == 0 || n2 == 0 {
            return Err(ConfigError::ZeroNeighborOffset);
        }
        Ok(())
    }
}

/// The user-editable parameters, in display order.
///
/// `radius` and `neighbor_offsets` are construction-time choices, not
/// live-editable parameters, so they are not listed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    NumPoints,
    DeltaTheta,
    DeltaHeight,
    StartAngle,
    Thickness,
    ThicknessGrowth,
}

impl Param {
    pub fn all() -> &'static [Param] {
        &[
            Param::NumPoints,
            Param::DeltaTheta,
            Param::DeltaHeight,
            Param::StartAngle,
            Param::Thickness,
            Param::ThicknessGrowth,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Param::NumPoints => "num_points",
            Param::DeltaTheta => "delta_theta",
            Param::DeltaHeight => "delta_height",
            Param::StartAngle => "start_angle",
            Param::Thickness => "thickness",
            Param::ThicknessGrowth => "thickness_growth",
        }
    }

    pub fn range(&self) -> ParamRange {
        match self {
            Param::NumPoints => ParamRange::new(20.0, 500.0),
            Param::DeltaTheta => ParamRange::new(0.0, 360.0),
            Param::DeltaHeight => ParamRange::new(0.05, 1.0),
            Param::StartAngle => ParamRange::new(-85.0, 85.0),
            Param::Thickness => ParamRange::new(0.0, 10.0),
            Param::ThicknessGrowth => ParamRange::new(-10.0, 10.0),
        }
    }

    /// Fine adjustment step for interactive editing.
    pub fn step(&self) -> f64 {
        match self {
            Param::NumPoints => 1.0,
            Param::DeltaTheta => 0.5,
            Param::DeltaHeight => 0.01,
            Param::StartAngle => 1.0,
            Param::Thickness => 0.1,
            Param::ThicknessGrowth => 0.1,
        }
    }

    pub fn get(&self, config: &BloomConfig) -> f64 {
        match self {
            Param::NumPoints => config.num_points as f64,
            Param::DeltaTheta => config.delta_theta,
            Param::DeltaHeight => config.delta_height,
            Param::StartAngle => config.start_angle,
            Param::Thickness => config.thickness,
            Param::ThicknessGrowth => config.thickness_growth,
        }
    }

    /// Write a value back, clamped to the parameter's range.
    pub fn set(&self, config: &mut BloomConfig, value: f64) {
        let value = self.range().clamp(value);
        match self {
            Param::NumPoints => config.num_points = value.round() as usize,
            Param::DeltaTheta => config.delta_theta = value,
            Param::DeltaHeight => config.delta_height = value,
            Param::StartAngle => config.start_angle = value,
            Param::Thickness => config.thickness = value,
            Param::ThicknessGrowth => config.thickness_growth = value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(BloomConfig::default().validate(), Ok(()));
    }

    #[test]
    fn default_settings() {
        let config = BloomConfig::default();
        assert_eq!(config.num_points, 300);
        assert_eq!(config.delta_theta, 137.5);
        assert_eq!(config.delta_height, 0.25);
        assert_eq!(config.radius, 20.0);
        assert_eq!(config.neighbor_offsets, (8, 13));
    }

    #[test]
    fn out_of_range_names_the_param() {
        let config = BloomConfig {
            delta_height: 2.0,
            ..BloomConfig::default()
        };
        match config.validate() {
            Err(ConfigError::OutOfRange { param, value, .. }) => {
                assert_eq!(param, "delta_height");
                assert_eq!(value, 2.0);
            }
            other => panic!("expected OutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn zero_neighbor_offset_rejected() {
        let config = BloomConfig {
            neighbor_offsets: (0, 13),
            ..BloomConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroNeighborOffset));
    }

    #[test]
    fn param_set_clamps() {
        let mut config = BloomConfig::default();
        Param::StartAngle.set(&mut config, 200.0);
        assert_eq!(config.start_angle, 85.0);
        Param::NumPoints.set(&mut config, 3.0);
        assert_eq!(config.num_points, 20);
    }

    #[test]
    fn partial_yaml_uses_defaults() {
        // serde_yaml lives in the CLI crate; JSON exercises the same
        // default attributes.
        let config: BloomConfig =
            serde_json::from_str(r#"{"num_points": 50}"#).unwrap();
        assert_eq!(config.num_points, 50);
        assert_eq!(config.delta_theta, 137.5);
        assert_eq!(config.neighbor_offsets, (8, 13));
    }
}
