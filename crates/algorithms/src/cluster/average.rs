//! Axis-wise cluster averaging of raw sub-pixel points
//!
//! Points are grouped by exact X coordinate; within a group the Y values are
//! sorted and split wherever two neighbours are more than `cluster_distance`
//! apart. Every run with at least `min_cluster_size` members becomes one
//! point at `(x, weighted mean y)`. The same is then done per exact Y value,
//! and both passes are appended to the output.

use serde::{Deserialize, Serialize};
use shoreline_core::points::{AveragedPoint, RawPoint};
use shoreline_core::{Algorithm, Error, Result};
use tracing::info;

/// Parameters for cluster averaging
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterParams {
    /// Largest gap (map units) between consecutive members of a cluster
    pub cluster_distance: f64,
    /// Smallest cluster that produces an averaged point
    pub min_cluster_size: usize,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            cluster_distance: 50.0,
            min_cluster_size: 3,
        }
    }
}

impl ClusterParams {
    pub fn validate(&self) -> Result<()> {
        if !self.cluster_distance.is_finite() || self.cluster_distance < 0.0 {
            return Err(Error::InvalidParameter {
                name: "cluster_distance",
                value: self.cluster_distance.to_string(),
                reason: "must be a finite, non-negative distance".into(),
            });
        }
        Ok(())
    }
}

#[derive(Clone, Copy)]
enum Axis {
    X,
    Y,
}

impl Axis {
    /// (shared coordinate, varying coordinate)
    fn split(self, p: &RawPoint) -> (f64, f64) {
        match self {
            Axis::X => (p.x, p.y),
            Axis::Y => (p.y, p.x),
        }
    }

    fn join(self, shared: f64, mean: f64) -> AveragedPoint {
        match self {
            Axis::X => AveragedPoint::new(shared, mean),
            Axis::Y => AveragedPoint::new(mean, shared),
        }
    }
}

fn weighted_mean(run: &[(f64, f64)]) -> f64 {
    let total: f64 = run.iter().map(|&(_, w)| w).sum();
    if total > 0.0 {
        run.iter().map(|&(v, w)| v * w).sum::<f64>() / total
    } else {
        run.iter().map(|&(v, _)| v).sum::<f64>() / run.len() as f64
    }
}

fn axis_pass(points: &[RawPoint], axis: Axis, params: &ClusterParams, out: &mut Vec<AveragedPoint>) {
    let mut keyed: Vec<(f64, f64, f64)> = points
        .iter()
        .map(|p| {
            let (shared, varying) = axis.split(p);
            (shared, varying, p.weight)
        })
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));

    let mut start = 0;
    while start < keyed.len() {
        let shared = keyed[start].0;
        let end = keyed[start..]
            .iter()
            .position(|k| k.0 != shared)
            .map_or(keyed.len(), |off| start + off);

        let group: Vec<(f64, f64)> = keyed[start..end].iter().map(|&(_, v, w)| (v, w)).collect();
        let mut run_start = 0;
        for i in 1..=group.len() {
            let breaks = i == group.len() || group[i].0 - group[i - 1].0 > params.cluster_distance;
            if breaks {
                let run = &group[run_start..i];
                if run.len() >= params.min_cluster_size {
                    out.push(axis.join(shared, weighted_mean(run)));
                }
                run_start = i;
            }
        }

        start = end;
    }
}

/// Reduce raw points to cluster averages along rows and columns.
///
/// Points with non-finite coordinates are ignored. Output holds the X pass
/// (ascending X) followed by the Y pass (ascending Y).
pub fn average_points(points: &[RawPoint], params: &ClusterParams) -> Vec<AveragedPoint> {
    let finite: Vec<RawPoint> = points
        .iter()
        .filter(|p| p.x.is_finite() && p.y.is_finite())
        .copied()
        .collect();

    let mut out = Vec::new();
    axis_pass(&finite, Axis::X, params, &mut out);
    let from_x = out.len();
    axis_pass(&finite, Axis::Y, params, &mut out);

    info!(
        raw = points.len(),
        x_clusters = from_x,
        y_clusters = out.len() - from_x,
        "cluster averaging finished"
    );
    out
}

/// Cluster averaging stage
#[derive(Debug, Clone, Default)]
pub struct AveragePoints;

impl Algorithm for AveragePoints {
    type Input = Vec<RawPoint>;
    type Output = Vec<AveragedPoint>;
    type Params = ClusterParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "AveragePoints"
    }

    fn description(&self) -> &'static str {
        "Weighted averages of distance-bounded clusters along rows and columns"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        params.validate()?;
        Ok(average_points(&input, &params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit(x: f64, y: f64) -> RawPoint {
        RawPoint::new(x, y, 1.0)
    }

    #[test]
    fn test_two_clusters_on_one_column() {
        let points: Vec<RawPoint> = [10.0, 11.0, 12.0, 50.0, 51.0, 52.0, 53.0]
            .iter()
            .map(|&y| unit(100.0, y))
            .collect();
        let params = ClusterParams { cluster_distance: 3.0, min_cluster_size: 3 };

        let avg = average_points(&points, &params);
        assert_eq!(avg.len(), 2);
        assert_relative_eq!(avg[0].x, 100.0);
        assert_relative_eq!(avg[0].y, 11.0, epsilon = 1e-12);
        assert_relative_eq!(avg[1].x, 100.0);
        assert_relative_eq!(avg[1].y, 51.5, epsilon = 1e-12);
    }

    #[test]
    fn test_weights_pull_the_mean() {
        let points = vec![
            RawPoint::new(0.0, 0.0, 3.0),
            RawPoint::new(0.0, 4.0, 1.0),
        ];
        let params = ClusterParams { cluster_distance: 5.0, min_cluster_size: 2 };
        let avg = average_points(&points, &params);
        assert_eq!(avg.len(), 1);
        assert_relative_eq!(avg[0].y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_weights_fall_back_to_plain_mean() {
        let points = vec![
            RawPoint::new(0.0, 0.0, 0.0),
            RawPoint::new(0.0, 4.0, 0.0),
        ];
        let params = ClusterParams { cluster_distance: 5.0, min_cluster_size: 2 };
        let avg = average_points(&points, &params);
        assert_relative_eq!(avg[0].y, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_gap_equal_to_distance_stays_joined() {
        let points = vec![unit(7.0, 0.0), unit(7.0, 2.0), unit(7.0, 4.5)];
        let params = ClusterParams { cluster_distance: 2.0, min_cluster_size: 2 };
        let avg = average_points(&points, &params);
        assert_eq!(avg.len(), 1);
        assert_relative_eq!(avg[0].y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_both_axes_contribute() {
        // an L: three points share x = 0, three share y = 0 (corner shared)
        let points = vec![
            unit(0.0, 0.0),
            unit(0.0, 1.0),
            unit(0.0, 2.0),
            unit(1.0, 0.0),
            unit(2.0, 0.0),
        ];
        let params = ClusterParams { cluster_distance: 1.5, min_cluster_size: 3 };
        let avg = average_points(&points, &params);
        assert_eq!(avg, vec![AveragedPoint::new(0.0, 1.0), AveragedPoint::new(1.0, 0.0)]);
    }

    #[test]
    fn test_singletons_need_min_size_one() {
        let points = vec![unit(1.0, 1.0)];
        let strict = ClusterParams { cluster_distance: 3.0, min_cluster_size: 2 };
        assert!(average_points(&points, &strict).is_empty());

        let loose = ClusterParams { cluster_distance: 3.0, min_cluster_size: 1 };
        assert_eq!(average_points(&points, &loose).len(), 2);
    }

    #[test]
    fn test_reclustering_is_idempotent() {
        let raw = vec![unit(0.0, 0.0), unit(100.0, 200.0), unit(300.0, 50.0)];
        let params = ClusterParams { cluster_distance: 3.0, min_cluster_size: 1 };

        let once = average_points(&raw, &params);
        let again_input: Vec<RawPoint> = once.iter().map(|p| unit(p.x, p.y)).collect();
        let twice = average_points(&again_input, &params);

        let sorted = |mut v: Vec<AveragedPoint>| {
            v.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
            v.dedup();
            v
        };
        let (a, b) = (sorted(once), sorted(twice));
        assert_eq!(a.len(), b.len());
        for (p, q) in a.iter().zip(&b) {
            assert_relative_eq!(p.x, q.x, epsilon = 1e-9);
            assert_relative_eq!(p.y, q.y, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_negative_distance_rejected() {
        let params = ClusterParams { cluster_distance: -1.0, min_cluster_size: 3 };
        assert!(AveragePoints.execute(vec![], params).is_err());
    }
}
