//! Delaunay triangulation (incremental Bowyer-Watson)
//!
//! Coordinates are shifted to the lower-left corner of the point set before
//! triangulating so circumcircle tests stay accurate on projected
//! coordinates in the millions.

use shoreline_core::points::AveragedPoint;

/// Triangle as three indices into the input slice
pub type Triangle = [usize; 3];

#[derive(Debug, Clone, Copy)]
struct Circumcircle {
    cx: f64,
    cy: f64,
    radius_sq: f64,
}

fn circumcircle(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> Option<Circumcircle> {
    let (ax, ay) = a;
    let (bx, by) = b;
    let (cx, cy) = c;

    let d = 2.0 * (ax * (by - cy) + bx * (cy - ay) + cx * (ay - by));
    if d.abs() < 1e-12 {
        return None;
    }

    let a2 = ax * ax + ay * ay;
    let b2 = bx * bx + by * by;
    let c2 = cx * cx + cy * cy;
    let ux = (a2 * (by - cy) + b2 * (cy - ay) + c2 * (ay - by)) / d;
    let uy = (a2 * (cx - bx) + b2 * (ax - cx) + c2 * (bx - ax)) / d;

    Some(Circumcircle {
        cx: ux,
        cy: uy,
        radius_sq: (ax - ux).powi(2) + (ay - uy).powi(2),
    })
}

fn same_edge(e: (usize, usize), f: (usize, usize)) -> bool {
    (e.0 == f.0 && e.1 == f.1) || (e.0 == f.1 && e.1 == f.0)
}

fn edges(t: &Triangle) -> [(usize, usize); 3] {
    [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])]
}

/// Triangulate a point set.
///
/// Returns an empty list when fewer than three points are given or all
/// points are collinear. Exact duplicates must be removed by the caller.
pub fn triangulate(points: &[AveragedPoint]) -> Vec<Triangle> {
    if points.len() < 3 {
        return Vec::new();
    }

    let (min_x, min_y, max_x, max_y) = points.iter().fold(
        (f64::MAX, f64::MAX, f64::MIN, f64::MIN),
        |(x0, y0, x1, y1), p| (x0.min(p.x), y0.min(p.y), x1.max(p.x), y1.max(p.y)),
    );
    let dx = max_x - min_x;
    let dy = max_y - min_y;
    let delta = dx.max(dy).max(1.0);

    // Super-triangle occupies vertex slots 0, 1, 2
    let mut vertices: Vec<(f64, f64)> = vec![
        (-10.0 * delta, -delta),
        (0.5 * dx, dy + 10.0 * delta),
        (dx + 10.0 * delta, -delta),
    ];
    vertices.extend(points.iter().map(|p| (p.x - min_x, p.y - min_y)));

    let mut triangles: Vec<Triangle> = vec![[0, 1, 2]];

    for vi in 3..vertices.len() {
        let (px, py) = vertices[vi];

        let bad: Vec<usize> = triangles
            .iter()
            .enumerate()
            .filter(|(_, t)| {
                circumcircle(vertices[t[0]], vertices[t[1]], vertices[t[2]]).is_some_and(|cc| {
                    (px - cc.cx).powi(2) + (py - cc.cy).powi(2) <= cc.radius_sq
                })
            })
            .map(|(ti, _)| ti)
            .collect();

        // Hole boundary: edges of bad triangles not shared with another bad one
        let mut boundary: Vec<(usize, usize)> = Vec::new();
        for &bi in &bad {
            for e in edges(&triangles[bi]) {
                let shared = bad
                    .iter()
                    .any(|&oi| oi != bi && edges(&triangles[oi]).iter().any(|&f| same_edge(e, f)));
                if !shared {
                    boundary.push(e);
                }
            }
        }

        let mut bad = bad;
        bad.sort_unstable_by(|a, b| b.cmp(a));
        for bi in bad {
            triangles.swap_remove(bi);
        }

        triangles.extend(boundary.into_iter().map(|(a, b)| [a, b, vi]));
    }

    triangles
        .into_iter()
        .filter(|t| t.iter().all(|&v| v >= 3))
        .filter(|t| circumcircle(vertices[t[0]], vertices[t[1]], vertices[t[2]]).is_some())
        .map(|t| [t[0] - 3, t[1] - 3, t[2] - 3])
        .collect()
}
