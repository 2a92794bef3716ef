//! Cage deformation: trilinear interpolation of the eight corners.
//!
//! A 2x2x2 corner cage is exactly a trilinear blend: a vertex at local
//! (u, v, w) inside the cage is the weighted mix of the eight corner
//! positions. Instancing normalizes the seed mesh into its own bounding
//! box, then pushes every vertex through the cage.

use crate::cage::Cage;
use crate::cancel::CancelToken;
use crate::geometry::Point3;
use crate::mesh::Mesh;

/// Blend the cage corners at local coordinates.
///
/// u runs BL->BR, v runs BL->TL, w runs inner->outer. Coordinates outside
/// [0, 1] extrapolate, matching a lattice with outside influence.
pub fn deform_point(cage: &Cage, local: Point3) -> Point3 {
    let c = &cage.corners;
    let (u, v, w) = (local.x, local.y, local.z);

    // corners[w*4 + v*2 + u]
    let bottom_inner = Point3::lerp(c[0], c[1], u);
    let top_inner = Point3::lerp(c[2], c[3], u);
    let inner = Point3::lerp(bottom_inner, top_inner, v);

    let bottom_outer = Point3::lerp(c[4], c[5], u);
    let top_outer = Point3::lerp(c[6], c[7], u);
    let outer = Point3::lerp(bottom_outer, top_outer, v);

    Point3::lerp(inner, outer, w)
}

/// Instance the seed mesh onto one cage.
///
/// The seed is normalized into its own bounding box first, so seeds of
/// any size or origin fill the cage the same way. Seed x maps to u,
/// y to v (the spiral's "up" direction across the cage) and z to w
/// (inner to outer). Face topology is untouched.
pub fn instance_on_cage(cage: &Cage, seed: &Mesh) -> Mesh {
    let bounds = seed.bounds();
    let vertices = seed
        .vertices
        .iter()
        .map(|&vertex| {
            let local = match bounds {
                Some(b) => b.normalize(vertex),
                None => vertex,
            };
            deform_point(cage, local)
        })
        .collect();

    Mesh {
        name: format!("petal_{}", cage.index),
        vertices,
        faces: seed.faces.clone(),
    }
}

/// Instance the seed onto every cage, with the usual cancel/progress
/// hooks. On cancellation the instances produced so far are returned.
pub fn instance_on_cages<F>(
    cages: &[Cage],
    seed: &Mesh,
    cancel: &CancelToken,
    mut progress: F,
) -> Vec<Mesh>
where
    F: FnMut(usize, usize),
{
    let mut meshes = Vec::with_capacity(cages.len());
    for (done, cage) in cages.iter().enumerate() {
        if cancel.is_cancelled() {
            break;
        }
        meshes.push(instance_on_cage(cage, seed));
        progress(done + 1, cages.len());
    }
    meshes
}
