//! Diameter path of the minimum spanning tree of a triangulation
//!
//! The triangulation edges form a weighted graph (Euclidean lengths). Its
//! minimum spanning tree is searched twice for the farthest node: once from
//! a seed, once from the first endpoint found. The tree path between the two
//! endpoints orders the points along the boundary.

use petgraph::algo::{astar, dijkstra, min_spanning_tree};
use petgraph::data::FromElements;
use petgraph::graph::{NodeIndex, UnGraph};
use shoreline_core::points::AveragedPoint;

use super::delaunay::Triangle;

/// Graph over point indices with triangle edges weighted by length
pub fn triangulation_graph(points: &[AveragedPoint], triangles: &[Triangle]) -> UnGraph<usize, f64> {
    let mut graph = UnGraph::with_capacity(points.len(), triangles.len() * 3);
    for i in 0..points.len() {
        graph.add_node(i);
    }
    for t in triangles {
        for (a, b) in [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])] {
            let length = points[a].distance(&points[b]);
            graph.update_edge(NodeIndex::new(a), NodeIndex::new(b), length);
        }
    }
    graph
}

/// Minimum spanning tree (forest, if the graph is disconnected)
pub fn spanning_tree(graph: &UnGraph<usize, f64>) -> UnGraph<usize, f64> {
    UnGraph::from_elements(min_spanning_tree(graph))
}

/// Node with the largest tree distance from `start`; ties go to the lowest
/// index
pub fn farthest_node(tree: &UnGraph<usize, f64>, start: NodeIndex) -> NodeIndex {
    let distances = dijkstra(tree, start, None, |e| *e.weight());
    let mut best = start;
    let mut best_dist = 0.0;
    for (&node, &d) in &distances {
        if d > best_dist || (d == best_dist && node.index() < best.index()) {
            best = node;
            best_dist = d;
        }
    }
    best
}

/// Both endpoints of the tree diameter reached from `seed`
pub fn diameter_endpoints(tree: &UnGraph<usize, f64>, seed: NodeIndex) -> (NodeIndex, NodeIndex) {
    let first = farthest_node(tree, seed);
    let second = farthest_node(tree, first);
    (first, second)
}

/// Point indices along the longest path of the triangulation's MST.
///
/// The search is seeded at node 1 (node 0 for a single point). Returns an
/// empty path for an empty point set.
pub fn longest_path(points: &[AveragedPoint], triangles: &[Triangle]) -> Vec<usize> {
    if points.is_empty() {
        return Vec::new();
    }

    let tree = spanning_tree(&triangulation_graph(points, triangles));
    let seed = NodeIndex::new(if points.len() > 1 { 1 } else { 0 });
    let (from, to) = diameter_endpoints(&tree, seed);

    astar(&tree, from, |n| n == to, |e| *e.weight(), |_| 0.0)
        .map(|(_, path)| path.into_iter().map(|n| tree[n]).collect())
        .unwrap_or_else(|| vec![tree[from]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaning::delaunay::triangulate;

    fn pts(coords: &[(f64, f64)]) -> Vec<AveragedPoint> {
        coords.iter().map(|&(x, y)| AveragedPoint::new(x, y)).collect()
    }

    /// Points scattered along a gentle arc, listed out of order
    fn arc() -> Vec<AveragedPoint> {
        let order = [4usize, 0, 7, 2, 5, 1, 6, 3];
        pts(&order
            .iter()
            .map(|&k| {
                let x = k as f64 * 10.0;
                (x, 0.002 * (x - 35.0).powi(2))
            })
            .collect::<Vec<_>>())
    }

    #[test]
    fn test_mst_has_n_minus_one_edges() {
        let p = arc();
        let tree = spanning_tree(&triangulation_graph(&p, &triangulate(&p)));
        assert_eq!(tree.node_count(), 8);
        assert_eq!(tree.edge_count(), 7);
    }

    #[test]
    fn test_path_orders_points_along_arc() {
        let p = arc();
        let path = longest_path(&p, &triangulate(&p));
        assert_eq!(path.len(), 8);
        let xs: Vec<f64> = path.iter().map(|&i| p[i].x).collect();
        let ascending = xs.windows(2).all(|w| w[0] < w[1]);
        let descending = xs.windows(2).all(|w| w[0] > w[1]);
        assert!(ascending || descending, "{:?}", xs);
    }

    #[test]
    fn test_endpoints_are_mutually_farthest() {
        let p = arc();
        let tree = spanning_tree(&triangulation_graph(&p, &triangulate(&p)));
        let (a, b) = diameter_endpoints(&tree, NodeIndex::new(1));

        assert_eq!(farthest_node(&tree, a), b);
        assert_eq!(farthest_node(&tree, b), a);
        let mut ends = [p[a.index()].x, p[b.index()].x];
        ends.sort_by(|x, y| x.total_cmp(y));
        assert_eq!(ends, [0.0, 70.0]);

        // any seed reaches the same pair
        for seed in 0..p.len() {
            let (c, d) = diameter_endpoints(&tree, NodeIndex::new(seed));
            let mut pair = [c.index(), d.index()];
            pair.sort_unstable();
            let mut expected = [a.index(), b.index()];
            expected.sort_unstable();
            assert_eq!(pair, expected);
        }
    }
}
