//! Iso-line tracing by marching squares
//!
//! Works on a regular grid of samples `values[[row, col]]` located at
//! `(xs[col], ys[row])`. Cell segments are stitched through their shared
//! edge crossings into polylines. Open branches end on the grid border or
//! next to a non-finite sample; closed branches repeat their first vertex.

use ndarray::ArrayView2;
use std::collections::HashMap;

/// One connected iso-line, as `(x, y)` vertices
pub type Branch = Vec<(f64, f64)>;

/// Crossing location: horizontal edge `(r, c)-(r, c+1)` or vertical edge
/// `(r, c)-(r+1, c)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum EdgeKey {
    H(usize, usize),
    V(usize, usize),
}

#[derive(Clone, Copy)]
enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    fn key(self, r: usize, c: usize) -> EdgeKey {
        match self {
            Side::Top => EdgeKey::H(r, c),
            Side::Bottom => EdgeKey::H(r + 1, c),
            Side::Left => EdgeKey::V(r, c),
            Side::Right => EdgeKey::V(r, c + 1),
        }
    }
}

/// Segments for one cell.
///
/// Corner bits: 1 top-left, 2 top-right, 4 bottom-right, 8 bottom-left;
/// a set bit means the corner lies above the level. `center_above`
/// resolves the two saddle configurations.
fn cell_segments(case: u8, center_above: bool) -> &'static [(Side, Side)] {
    use Side::*;
    match case {
        1 | 14 => &[(Left, Top)],
        2 | 13 => &[(Top, Right)],
        3 | 12 => &[(Left, Right)],
        4 | 11 => &[(Right, Bottom)],
        6 | 9 => &[(Top, Bottom)],
        7 | 8 => &[(Left, Bottom)],
        5 if center_above => &[(Top, Right), (Left, Bottom)],
        5 => &[(Left, Top), (Right, Bottom)],
        10 if center_above => &[(Left, Top), (Right, Bottom)],
        10 => &[(Top, Right), (Left, Bottom)],
        _ => &[],
    }
}

/// Trace every iso-line of `values` at `level`.
///
/// Cells with a non-finite corner are skipped. Branch order follows the
/// row-major scan of the cells holding each branch's first segment, open
/// branches before closed ones.
pub fn trace_contours(
    values: ArrayView2<'_, f64>,
    xs: &[f64],
    ys: &[f64],
    level: f64,
) -> Vec<Branch> {
    let (rows, cols) = values.dim();
    if rows < 2 || cols < 2 || xs.len() != cols || ys.len() != rows {
        return Vec::new();
    }

    let mut segments: Vec<(EdgeKey, EdgeKey)> = Vec::new();
    for r in 0..rows - 1 {
        for c in 0..cols - 1 {
            let corners = [
                values[[r, c]],
                values[[r, c + 1]],
                values[[r + 1, c + 1]],
                values[[r + 1, c]],
            ];
            if corners.iter().any(|v| !v.is_finite()) {
                continue;
            }
            let case = corners
                .iter()
                .enumerate()
                .fold(0u8, |acc, (bit, &v)| if v > level { acc | (1 << bit) } else { acc });
            let center_above = corners.iter().sum::<f64>() / 4.0 > level;

            for &(a, b) in cell_segments(case, center_above) {
                segments.push((a.key(r, c), b.key(r, c)));
            }
        }
    }

    let mut incident: HashMap<EdgeKey, Vec<usize>> = HashMap::new();
    for (i, &(a, b)) in segments.iter().enumerate() {
        incident.entry(a).or_default().push(i);
        incident.entry(b).or_default().push(i);
    }

    let mut used = vec![false; segments.len()];
    let mut chains: Vec<Vec<EdgeKey>> = Vec::new();

    // Open branches start at a crossing owned by a single segment
    for i in 0..segments.len() {
        if used[i] {
            continue;
        }
        let (a, b) = segments[i];
        let start = if incident[&a].len() == 1 {
            Some(a)
        } else if incident[&b].len() == 1 {
            Some(b)
        } else {
            None
        };
        if let Some(start) = start {
            chains.push(walk(start, i, &segments, &incident, &mut used));
        }
    }
    for i in 0..segments.len() {
        if !used[i] {
            chains.push(walk(segments[i].0, i, &segments, &incident, &mut used));
        }
    }

    chains
        .into_iter()
        .map(|chain| {
            chain
                .into_iter()
                .map(|key| crossing(key, values, xs, ys, level))
                .collect()
        })
        .collect()
}

fn walk(
    start: EdgeKey,
    first: usize,
    segments: &[(EdgeKey, EdgeKey)],
    incident: &HashMap<EdgeKey, Vec<usize>>,
    used: &mut [bool],
) -> Vec<EdgeKey> {
    let mut chain = vec![start];
    let mut key = start;
    let mut seg = first;

    loop {
        used[seg] = true;
        let (a, b) = segments[seg];
        key = if a == key { b } else { a };
        chain.push(key);

        match incident[&key].iter().copied().find(|&s| !used[s]) {
            Some(next) => seg = next,
            None => break,
        }
    }
    chain
}

fn crossing(key: EdgeKey, values: ArrayView2<'_, f64>, xs: &[f64], ys: &[f64], level: f64) -> (f64, f64) {
    let lerp = |z0: f64, z1: f64, p0: f64, p1: f64| {
        let t = (level - z0) / (z1 - z0);
        p0 + t * (p1 - p0)
    };
    match key {
        EdgeKey::H(r, c) => (
            lerp(values[[r, c]], values[[r, c + 1]], xs[c], xs[c + 1]),
            ys[r],
        ),
        EdgeKey::V(r, c) => (
            xs[c],
            lerp(values[[r, c]], values[[r + 1, c]], ys[r], ys[r + 1]),
        ),
    }
}
