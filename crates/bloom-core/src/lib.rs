//! # bloom-core
//!
//! Phyllotaxis layout and cage deformation.
//!
//! A bloom is a golden-angle spiral of control points on a sphere, each
//! with an inner and an outer position, plus a set of 2x2x2 deformation
//! cages wired to Fibonacci-offset neighbors. Seed geometry instanced
//! through the cages produces the sunflower-head "bloom" arrangement.
//!
//! The layout is pure arithmetic. [`Bloom`] adds the one piece of
//! statefulness the workflow needs - parameter edits mark it stale,
//! accessors recompute the whole layout.

pub mod anim;
pub mod bloom;
pub mod cage;
pub mod cancel;
pub mod config;
pub mod deform;
pub mod geometry;
pub mod mesh;
pub mod spiral;
pub mod thickness;

// Re-export common types at crate root for convenience.
pub use anim::{Infinity, Key, Track};
pub use bloom::{Bloom, BloomError, BloomPoint, compute_points};
pub use cage::{Cage, build_cages, cage_count};
pub use cancel::CancelToken;
pub use config::{BloomConfig, ConfigError, Param, ParamRange};
pub use deform::{deform_point, instance_on_cage, instance_on_cages};
pub use geometry::{Bounds3, Point3};
pub use mesh::{Mesh, ObjError, parse_obj, pyramid, write_obj};
pub use spiral::{GOLDEN_ANGLE_DEGREES, SpiralPoint, place_points};
pub use thickness::{growth_factor, outer_offsets, outer_position};
