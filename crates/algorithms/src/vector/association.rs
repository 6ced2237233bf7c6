//! Point-in-region tagging
//!
//! Region envelopes are computed once; a point is tested exactly only
//! against regions whose envelope holds it. Points on a region boundary
//! count as inside. When regions overlap, the last matching region wins.

use geo::{BoundingRect, Intersects, Point, Rect};
use shoreline_core::points::{AveragedPoint, TaggedPoint};
use shoreline_core::vector::RegionPolygon;
use tracing::info;

/// Region set prepared for repeated containment queries
pub struct RegionIndex<'a> {
    entries: Vec<(Rect<f64>, &'a RegionPolygon)>,
}

impl<'a> RegionIndex<'a> {
    pub fn new(regions: &'a [RegionPolygon]) -> Self {
        let entries = regions
            .iter()
            .filter_map(|r| r.polygon.bounding_rect().map(|rect| (rect, r)))
            .collect();
        Self { entries }
    }

    /// Identifier of the region containing (x, y), 0 when none does
    pub fn region_of(&self, x: f64, y: f64) -> i64 {
        let point = Point::new(x, y);
        self.entries
            .iter()
            .rev()
            .filter(|(rect, _)| {
                x >= rect.min().x && x <= rect.max().x && y >= rect.min().y && y <= rect.max().y
            })
            .find(|(_, region)| region.polygon.intersects(&point))
            .map_or(0, |(_, region)| region.id)
    }
}

/// Tag every averaged point with its containing region
pub fn tag_points(points: &[AveragedPoint], regions: &[RegionPolygon]) -> Vec<TaggedPoint> {
    let index = RegionIndex::new(regions);
    let tagged: Vec<TaggedPoint> = points
        .iter()
        .map(|&p| TaggedPoint::new(p, index.region_of(p.x, p.y)))
        .collect();

    let inside = tagged.iter().filter(|t| t.region_id != 0).count();
    info!(points = tagged.len(), inside, regions = regions.len(), "points tagged");
    tagged
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Polygon};

    fn square(x0: f64, y0: f64, side: f64) -> Polygon<f64> {
        polygon![
            (x: x0, y: y0),
            (x: x0 + side, y: y0),
            (x: x0 + side, y: y0 + side),
            (x: x0, y: y0 + side),
            (x: x0, y: y0),
        ]
    }

    #[test]
    fn test_inside_outside() {
        let regions = vec![
            RegionPolygon::new(1, square(0.0, 0.0, 10.0)),
            RegionPolygon::new(2, square(20.0, 0.0, 10.0)),
        ];
        let points = vec![
            AveragedPoint::new(5.0, 5.0),
            AveragedPoint::new(25.0, 1.0),
            AveragedPoint::new(15.0, 5.0),
        ];
        let ids: Vec<i64> = tag_points(&points, &regions).iter().map(|t| t.region_id).collect();
        assert_eq!(ids, vec![1, 2, 0]);
    }

    #[test]
    fn test_envelope_is_not_enough() {
        // triangle whose envelope covers (9, 9) but whose interior does not
        let tri = polygon![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 0.0, y: 10.0), (x: 0.0, y: 0.0)];
        let regions = vec![RegionPolygon::new(4, tri)];
        let index = RegionIndex::new(&regions);
        assert_eq!(index.region_of(9.0, 9.0), 0);
        assert_eq!(index.region_of(1.0, 1.0), 4);
    }

    #[test]
    fn test_boundary_counts_and_last_region_wins() {
        let regions = vec![
            RegionPolygon::new(1, square(0.0, 0.0, 10.0)),
            RegionPolygon::new(7, square(5.0, 0.0, 10.0)),
        ];
        let index = RegionIndex::new(&regions);
        assert_eq!(index.region_of(10.0, 5.0), 7);
        assert_eq!(index.region_of(0.0, 5.0), 1);
        assert_eq!(index.region_of(15.0, 10.0), 7);
    }
}
