//! Feature output for cleaned groups
//!
//! Every cleaned group becomes its points (one feature each) and a single
//! polyline through them, all carrying the group's `region_id`.

use geo::{Geometry, LineString, Point};
use shoreline_core::vector::{AttributeValue, Feature, FeatureCollection, REGION_ID_FIELD};

use crate::cleaning::CleanedGroup;

/// Cleaned points as point features
pub fn cleaned_points_to_features(groups: &[CleanedGroup]) -> FeatureCollection {
    groups
        .iter()
        .flat_map(|g| {
            g.points.iter().map(move |p| {
                Feature::new(Geometry::Point(Point::new(p.x, p.y)))
                    .with_property(REGION_ID_FIELD, AttributeValue::Int(g.region_id))
            })
        })
        .collect()
}

/// One polyline feature per cleaned group.
///
/// Groups with fewer than two points cannot form a line and are left out.
pub fn cleaned_lines_to_features(groups: &[CleanedGroup]) -> FeatureCollection {
    groups
        .iter()
        .filter(|g| g.points.len() >= 2)
        .map(|g| {
            let line: LineString<f64> = g.points.iter().map(|p| (p.x, p.y)).collect();
            Feature::new(Geometry::LineString(line))
                .with_property(REGION_ID_FIELD, AttributeValue::Int(g.region_id))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shoreline_core::points::AveragedPoint;

    fn groups() -> Vec<CleanedGroup> {
        vec![
            CleanedGroup {
                region_id: 3,
                points: vec![
                    AveragedPoint::new(0.0, 0.0),
                    AveragedPoint::new(1.0, 0.5),
                    AveragedPoint::new(2.0, 0.0),
                ],
            },
            CleanedGroup {
                region_id: 9,
                points: vec![AveragedPoint::new(5.0, 5.0)],
            },
        ]
    }

    #[test]
    fn test_points_carry_region() {
        let fc = cleaned_points_to_features(&groups());
        assert_eq!(fc.len(), 4);
        let ids: Vec<i64> = fc.iter().filter_map(Feature::region_id).collect();
        assert_eq!(ids, vec![3, 3, 3, 9]);
    }

    #[test]
    fn test_one_line_per_group() {
        let fc = cleaned_lines_to_features(&groups());
        assert_eq!(fc.len(), 1);
        let feature = &fc.features[0];
        assert_eq!(feature.region_id(), Some(3));
        match &feature.geometry {
            Some(Geometry::LineString(ls)) => assert_eq!(ls.0.len(), 3),
            other => panic!("unexpected geometry {:?}", other),
        }
    }
}
