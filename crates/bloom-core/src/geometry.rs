//! Core geometry types for bloom.
//!
//! Everything here is plain arithmetic over `f64`. Positions are computed
//! once by the layout modules and then read by cage wiring, deformation,
//! and the preview renderer.

use serde::{Deserialize, Serialize};

/// A 3D point (doubles as a vector where convenient).
///
/// Y is up: the spiral climbs along +Y and the xz-plane is the
/// "equator".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Distance to another point.
    #[inline]
    pub fn distance(&self, other: Point3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Distance from the origin.
    #[inline]
    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Radius of the projection onto the xz-plane.
    ///
    /// This is the "radius'" term of the elevation recurrence: how far the
    /// point sits from the vertical axis, ignoring height.
    #[inline]
    pub fn horizontal_radius(&self) -> f64 {
        (self.x * self.x + self.z * self.z).sqrt()
    }

    /// Uniform scale about the origin.
    #[inline]
    pub fn scaled(&self, s: f64) -> Point3 {
        Point3::new(self.x * s, self.y * s, self.z * s)
    }

    /// Linear interpolation between two points, t in [0, 1].
    #[inline]
    pub fn lerp(a: Point3, b: Point3, t: f64) -> Point3 {
        Point3::new(
            a.x + (b.x - a.x) * t,
            a.y + (b.y - a.y) * t,
            a.z + (b.z - a.z) * t,
        )
    }

    /// True when every component is a normal number (no NaN/infinity).
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Axis-aligned bounding box over a set of points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds3 {
    pub min: Point3,
    pub max: Point3,
}

impl Bounds3 {
    /// Bounds of a point set, or `None` for an empty set.
    pub fn of(points: &[Point3]) -> Option<Bounds3> {
        if points.is_empty() {
            return None;
        }

        let mut min = points[0];
        let mut max = points[0];
        for p in &points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }
        Some(Bounds3 { min, max })
    }

    #[inline]
    pub fn center(&self) -> Point3 {
        Point3::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
            (self.min.z + self.max.z) / 2.0,
        )
    }

    #[inline]
    pub fn size(&self) -> Point3 {
        Point3::new(
            self.max.x - self.min.x,
            self.max.y - self.min.y,
            self.max.z - self.min.z,
        )
    }

    /// Map a point into this box's local [0,1]^3 coordinates.
    ///
    /// Degenerate axes (zero extent) map to 0.5 so flat seed meshes still
    /// land in the middle of a cage instead of dividing by zero.
    pub fn normalize(&self, p: Point3) -> Point3 {
        let size = self.size();
        let axis = |v: f64, min: f64, extent: f64| {
            if extent > 0.0 { (v - min) / extent } else { 0.5 }
        };
        Point3::new(
            axis(p.x, self.min.x, size.x),
            axis(p.y, self.min.y, size.y),
            axis(p.z, self.min.z, size.z),
        )
    }
}
