//! Wireframe SVG projection of a bloom.
//!
//! Orthographic view from the front (+z toward the viewer), with an
//! optional turntable spin about the vertical axis. Cage edges draw in
//! black over the control points in gray, and the whole layout is scaled
//! to fit the requested image size with a little padding.

use bloom_core::{BloomPoint, Cage, Point3};

/// The twelve edges of a cage, as corner-index pairs.
///
/// Corner layout: 0..4 inner BL/BR/TL/TR, 4..8 outer.
const CAGE_EDGES: [(usize, usize); 12] = [
    // u edges (BL->BR direction)
    (0, 1),
    (2, 3),
    (4, 5),
    (6, 7),
    // v edges (BL->TL direction)
    (0, 2),
    (1, 3),
    (4, 6),
    (5, 7),
    // w edges (inner->outer)
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

/// Rotate about the Y axis, then drop z.
fn project(p: Point3, spin_radians: f64) -> (f64, f64) {
    let (sin, cos) = spin_radians.sin_cos();
    let x = p.x * cos + p.z * sin;
    // Screen y grows downward; the spiral's +y is up.
    (x, -p.y)
}

/// Render points and cages to an SVG string.
pub fn render_svg(
    points: &[BloomPoint],
    cages: &[Cage],
    spin_degrees: f64,
    width: u32,
    height: u32,
) -> String {
    let spin = spin_degrees.to_radians();

    // Projected extent over everything we will draw.
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    let mut extend = |xy: (f64, f64)| {
        min_x = min_x.min(xy.0);
        min_y = min_y.min(xy.1);
        max_x = max_x.max(xy.0);
        max_y = max_y.max(xy.1);
    };
    for p in points {
        extend(project(p.inner, spin));
        extend(project(p.outer, spin));
    }
    for cage in cages {
        for &corner in &cage.corners {
            extend(project(corner, spin));
        }
    }

    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">
<rect width="100%" height="100%" fill="white"/>
"#,
        width, height, width, height
    ));

    if points.is_empty() && cages.is_empty() {
        svg.push_str("</svg>\n");
        return svg;
    }

    let padding = 20.0;
    let span_x = (max_x - min_x).max(1e-9);
    let span_y = (max_y - min_y).max(1e-9);
    let scale_x = (width as f64 - padding * 2.0) / span_x;
    let scale_y = (height as f64 - padding * 2.0) / span_y;
    let scale = scale_x.min(scale_y);

    let center_x = width as f64 / 2.0;
    let center_y = height as f64 / 2.0;
    let mid_x = (min_x + max_x) / 2.0;
    let mid_y = (min_y + max_y) / 2.0;
    let place = |xy: (f64, f64)| {
        (
            center_x + (xy.0 - mid_x) * scale,
            center_y + (xy.1 - mid_y) * scale,
        )
    };

    // Control points first (gray), cage wireframe on top (black).
    svg.push_str("<g fill=\"#bbbbbb\" stroke=\"none\">\n");
    for p in points {
        let (cx, cy) = place(project(p.inner, spin));
        svg.push_str(&format!(
            "  <circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"1.5\"/>\n",
            cx, cy
        ));
    }
    svg.push_str("</g>\n");

    svg.push_str("<g stroke=\"black\" stroke-width=\"1\" stroke-linecap=\"round\" fill=\"none\">\n");
    for cage in cages {
        for &(a, b) in &CAGE_EDGES {
            let (x1, y1) = place(project(cage.corners[a], spin));
            let (x2, y2) = place(project(cage.corners[b], spin));
            svg.push_str(&format!(
                "  <line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\"/>\n",
                x1, y1, x2, y2
            ));
        }
    }
    svg.push_str("</g>\n</svg>\n");

    svg
}

#[cfg(test)]
mod tests {
    use super::*;
    use bloom_core::{Bloom, BloomConfig};

    #[test]
    fn renders_points_and_edges() {
        let mut bloom = Bloom::new(BloomConfig {
            num_points: 40,
            ..BloomConfig::default()
        })
        .unwrap();
        let points = bloom.points().unwrap().to_vec();
        let cages = bloom.cages().unwrap().to_vec();

        let svg = render_svg(&points, &cages, 0.0, 800, 600);
        assert!(svg.contains("<svg"));
        assert!(svg.contains("<circle"));
        assert!(svg.contains("<line"));
        assert!(svg.ends_with("</svg>\n"));
    }

    #[test]
    fn empty_layout_renders_blank_canvas() {
        let svg = render_svg(&[], &[], 0.0, 100, 100);
        assert!(svg.contains("<svg"));
        assert!(!svg.contains("<line"));
    }

    #[test]
    fn spin_moves_the_projection() {
        let mut bloom = Bloom::new(BloomConfig {
            num_points: 40,
            ..BloomConfig::default()
        })
        .unwrap();
        let points = bloom.points().unwrap().to_vec();

        let a = render_svg(&points, &[], 0.0, 800, 600);
        let b = render_svg(&points, &[], 60.0, 800, 600);
        assert_ne!(a, b);
    }
}
