//! Graph-based outlier rejection per region
//!
//! Each region's points are triangulated, the triangulation's minimum
//! spanning tree gives the longest path through the points, and the path is
//! thinned by turning angle. Groups that are too small or cannot be
//! triangulated produce nothing.

mod angle;
mod delaunay;
mod longest_path;

pub use angle::{filter_by_angle, turning_angle};
pub use delaunay::{triangulate, Triangle};
pub use longest_path::{
    diameter_endpoints, farthest_node, longest_path, spanning_tree, triangulation_graph,
};

use serde::{Deserialize, Serialize};
use shoreline_core::points::{AveragedPoint, TaggedPoint};
use shoreline_core::{Algorithm, Error, Result};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Parameters for outlier rejection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningParams {
    /// Interior path points are kept when their turning angle is at least
    /// this many degrees; `None` keeps the whole path
    pub angle_tolerance: Option<f64>,
    /// Smallest group that is triangulated
    pub min_group_size: usize,
}

impl Default for CleaningParams {
    fn default() -> Self {
        Self {
            angle_tolerance: Some(150.0),
            min_group_size: 4,
        }
    }
}

impl CleaningParams {
    pub fn validate(&self) -> Result<()> {
        if let Some(tol) = self.angle_tolerance {
            if !(0.0..=360.0).contains(&tol) {
                return Err(Error::InvalidParameter {
                    name: "angle_tolerance",
                    value: tol.to_string(),
                    reason: "must lie in [0, 360] degrees".into(),
                });
            }
        }
        if self.min_group_size < 3 {
            return Err(Error::InvalidParameter {
                name: "min_group_size",
                value: self.min_group_size.to_string(),
                reason: "a triangulation needs at least 3 points".into(),
            });
        }
        Ok(())
    }
}

/// Ordered surviving points of one region
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedGroup {
    pub region_id: i64,
    pub points: Vec<AveragedPoint>,
}

/// Points grouped by region id in ascending order; region 0 is left out
pub fn group_points(tagged: &[TaggedPoint]) -> BTreeMap<i64, Vec<AveragedPoint>> {
    let mut groups: BTreeMap<i64, Vec<AveragedPoint>> = BTreeMap::new();
    for t in tagged.iter().filter(|t| t.region_id != 0) {
        groups.entry(t.region_id).or_default().push(t.point);
    }
    groups
}

/// Drop exact repeats, keeping the first occurrence of each point in its
/// original position
fn collapse_duplicates(points: &[AveragedPoint]) -> Vec<AveragedPoint> {
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| {
        let (p, q) = (&points[a], &points[b]);
        p.x.total_cmp(&q.x).then(p.y.total_cmp(&q.y)).then(a.cmp(&b))
    });

    let mut keep = vec![true; points.len()];
    for pair in order.windows(2) {
        if points[pair[0]] == points[pair[1]] {
            keep[pair[1]] = false;
        }
    }
    points
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}

/// Clean one group of points.
///
/// Exact duplicate points are collapsed first. Fails with
/// `Error::Algorithm` when the points cannot be triangulated.
pub fn clean_group(points: &[AveragedPoint], tolerance: Option<f64>) -> Result<Vec<AveragedPoint>> {
    let unique = collapse_duplicates(points);

    let triangles = triangulate(&unique);
    if triangles.is_empty() {
        return Err(Error::Algorithm(format!(
            "degenerate triangulation of {} points",
            unique.len()
        )));
    }

    let path: Vec<AveragedPoint> = longest_path(&unique, &triangles)
        .into_iter()
        .map(|i| unique[i])
        .collect();
    Ok(filter_by_angle(&path, tolerance))
}

/// Clean every region group.
///
/// Groups below `min_group_size` and groups that fail to triangulate are
/// skipped and logged; they never abort the run.
pub fn clean_groups(tagged: &[TaggedPoint], params: &CleaningParams) -> Vec<CleanedGroup> {
    let mut cleaned = Vec::new();

    for (region_id, points) in group_points(tagged) {
        if points.len() < params.min_group_size {
            debug!(region_id, points = points.len(), "group too small to triangulate, skipped");
            continue;
        }
        match clean_group(&points, params.angle_tolerance) {
            Ok(kept) => {
                debug!(region_id, before = points.len(), after = kept.len(), "group cleaned");
                cleaned.push(CleanedGroup {
                    region_id,
                    points: kept,
                });
            }
            Err(e) => warn!(region_id, error = %e, "group skipped"),
        }
    }

    info!(groups = cleaned.len(), "outlier rejection finished");
    cleaned
}

/// Outlier rejection stage
#[derive(Debug, Clone, Default)]
pub struct CleanGroups;

impl Algorithm for CleanGroups {
    type Input = Vec<TaggedPoint>;
    type Output = Vec<CleanedGroup>;
    type Params = CleaningParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "CleanGroups"
    }

    fn description(&self) -> &'static str {
        "Longest spanning tree path per region, thinned by turning angle"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        params.validate()?;
        Ok(clean_groups(&input, &params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(x: f64, y: f64, region_id: i64) -> TaggedPoint {
        TaggedPoint::new(AveragedPoint::new(x, y), region_id)
    }

    /// Open convex chain turning 60° at every vertex, sides 14, 13, 12, 11, 10
    fn turning_chain(region_id: i64) -> Vec<TaggedPoint> {
        let mut pts = vec![(0.0, 0.0), (14.0, 0.0)];
        let (mut x, mut y, mut heading) = (14.0_f64, 0.0_f64, 0.0_f64);
        for side in [13.0, 12.0, 11.0, 10.0] {
            heading += 60.0_f64.to_radians();
            x += side * heading.cos();
            y += side * heading.sin();
            pts.push((x, y));
        }
        pts.into_iter().map(|(x, y)| tag(x, y, region_id)).collect()
    }

    /// Regular hexagon of circumradius 100 centred on the origin
    fn hexagon(region_id: i64) -> Vec<TaggedPoint> {
        (0..6)
            .map(|k| {
                let a = (k as f64 * 60.0_f64).to_radians();
                tag(100.0 * a.cos(), 100.0 * a.sin(), region_id)
            })
            .collect()
    }

    #[test]
    fn test_grouping_skips_region_zero() {
        let tagged = vec![tag(0.0, 0.0, 2), tag(1.0, 0.0, 0), tag(2.0, 0.0, 1), tag(3.0, 0.0, 2)];
        let groups = group_points(&tagged);
        assert_eq!(groups.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(groups[&2].len(), 2);
    }

    #[test]
    fn test_sharp_turns_leave_only_endpoints() {
        let chain = turning_chain(5);
        let cleaned = clean_groups(&chain, &CleaningParams::default());
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].region_id, 5);
        assert_eq!(
            cleaned[0].points,
            vec![AveragedPoint::new(0.0, 0.0), AveragedPoint::new(14.0, 0.0)]
        );
    }

    #[test]
    fn test_hexagon_keeps_only_path_ends() {
        let hexagon = hexagon(1);
        let cleaned = clean_groups(&hexagon, &CleaningParams::default());
        assert_eq!(cleaned.len(), 1);
        let kept = &cleaned[0].points;
        assert_eq!(kept.len(), 2);
        // every interior vertex turns by 120°, so only the path ends survive
        let vertices: Vec<AveragedPoint> = hexagon.iter().map(|t| t.point).collect();
        assert!(kept.iter().all(|p| vertices.contains(p)));
        assert_ne!(kept[0], kept[1]);
    }

    #[test]
    fn test_collapse_keeps_first_seen_order() {
        let p = |x: f64, y: f64| AveragedPoint::new(x, y);
        let points = vec![p(3.0, 1.0), p(0.0, 0.0), p(3.0, 1.0), p(2.0, 5.0), p(0.0, 0.0)];
        assert_eq!(
            collapse_duplicates(&points),
            vec![p(3.0, 1.0), p(0.0, 0.0), p(2.0, 5.0)]
        );
    }

    #[test]
    fn test_without_tolerance_whole_path_is_kept() {
        let chain = turning_chain(5);
        let params = CleaningParams {
            angle_tolerance: None,
            ..Default::default()
        };
        let cleaned = clean_groups(&chain, &params);
        assert_eq!(cleaned[0].points.len(), 6);
        assert_eq!(cleaned[0].points[0], AveragedPoint::new(0.0, 0.0));
        assert_eq!(cleaned[0].points[5], AveragedPoint::new(14.0, 0.0));
    }

    #[test]
    fn test_small_group_yields_nothing() {
        let tagged = vec![tag(0.0, 0.0, 3), tag(5.0, 1.0, 3), tag(9.0, 4.0, 3)];
        assert!(clean_groups(&tagged, &CleaningParams::default()).is_empty());
    }

    #[test]
    fn test_collinear_group_is_skipped_not_fatal() {
        let mut tagged: Vec<TaggedPoint> = (0..5).map(|i| tag(i as f64, i as f64, 1)).collect();
        tagged.extend(turning_chain(2));
        let cleaned = clean_groups(&tagged, &CleaningParams::default());
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].region_id, 2);
    }

    #[test]
    fn test_near_straight_shore_is_kept() {
        let tagged: Vec<TaggedPoint> = (0..10)
            .map(|i| {
                let x = i as f64 * 20.0;
                tag(x, 0.001 * (x - 90.0).powi(2), 8)
            })
            .collect();
        let cleaned = clean_groups(&tagged, &CleaningParams::default());
        assert_eq!(cleaned[0].points.len(), 10);
    }

    #[test]
    fn test_duplicates_collapse() {
        let mut tagged = turning_chain(4);
        tagged.push(tagged[2]);
        let params = CleaningParams {
            angle_tolerance: None,
            ..Default::default()
        };
        assert_eq!(clean_groups(&tagged, &params)[0].points.len(), 6);
    }

    #[test]
    fn test_params_validation() {
        assert!(CleaningParams::default().validate().is_ok());
        let bad = CleaningParams {
            angle_tolerance: Some(400.0),
            ..Default::default()
        };
        assert!(CleanGroups.execute(vec![], bad).is_err());
    }
}
