//! Cage connectivity: wiring deformation cages to spiral neighbors.
//!
//! Each cage spans a base point i and its neighbors at the Fibonacci
//! offsets n1, n2 and n1+n2. Corner naming, with the default (8, 13):
//!
//!   BL = i        BR = i + n1
//!   TL = i + n2   TR = i + n1 + n2
//!
//! with an inner and an outer corner for each, eight corners total. The
//! last n1+n2 points have no cage of their own - they only serve as
//! neighbors for earlier cages.

use serde::Serialize;

use crate::bloom::BloomPoint;
use crate::cancel::CancelToken;
use crate::geometry::Point3;

/// Corner order within [`Cage::corners`]:
/// indices 0..4 are the inner BL, BR, TL, TR; 4..8 the outer four in the
/// same order. Equivalently `corners[w * 4 + v * 2 + u]` where u runs
/// BL->BR, v runs BL->TL and w runs inner->outer.
pub const CORNERS_PER_CAGE: usize = 8;

/// A 2x2x2 deformation cage bound to four spiral points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Cage {
    /// Base point index (the BL corner's point).
    pub index: usize,
    /// The four bound point indices: [i, i+n1, i+n2, i+n1+n2].
    pub points: [usize; 4],
    /// Corner positions, see [`CORNERS_PER_CAGE`] for the layout.
    pub corners: [Point3; CORNERS_PER_CAGE],
}

/// Number of cages a sequence of `n` points yields: max(0, n - (n1+n2)).
#[inline]
pub fn cage_count(n: usize, offsets: (usize, usize)) -> usize {
    n.saturating_sub(offsets.0 + offsets.1)
}

/// Wire one cage per eligible base index, in ascending order.
pub fn build_cages(points: &[BloomPoint], offsets: (usize, usize)) -> Vec<Cage> {
    build_cages_cancellable(points, offsets, &CancelToken::new(), |_, _| {})
}

/// Cage wiring with a cancel check per iteration.
///
/// Ascending order matters: every neighbor a cage binds has a lower-or-
/// equal requirement on placement, so on cancellation the cages built so
/// far are all fully wired.
pub fn build_cages_cancellable<F>(
    points: &[BloomPoint],
    offsets: (usize, usize),
    cancel: &CancelToken,
    mut progress: F,
) -> Vec<Cage>
where
    F: FnMut(usize, usize),
{
    let (n1, n2) = offsets;
    let total = cage_count(points.len(), offsets);
    let mut cages = Vec::with_capacity(total);

    for i in 0..total {
        if cancel.is_cancelled() {
            break;
        }

        let bound = [i, i + n1, i + n2, i + n1 + n2];
        let mut corners = [Point3::new(0.0, 0.0, 0.0); CORNERS_PER_CAGE];
        for (slot, &point_index) in bound.iter().enumerate() {
            corners[slot] = points[point_index].inner;
            corners[slot + 4] = points[point_index].outer;
        }

        cages.push(Cage { index: i, points: bound, corners });
        progress(i + 1, total);
    }

    cages
}
