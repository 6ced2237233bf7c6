//! Point records flowing between pipeline stages
//!
//! All coordinates are map (world) coordinates in the scene CRS.

use serde::{Deserialize, Serialize};

/// Sub-pixel point produced by kernel fitting, with its centrality weight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawPoint {
    pub x: f64,
    pub y: f64,
    pub weight: f64,
}

impl RawPoint {
    pub fn new(x: f64, y: f64, weight: f64) -> Self {
        Self { x, y, weight }
    }
}

/// Weighted centroid of one cluster of raw points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AveragedPoint {
    pub x: f64,
    pub y: f64,
}

impl AveragedPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    #[inline]
    pub fn distance(&self, other: &AveragedPoint) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Averaged point tagged with the region containing it (0 = none)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaggedPoint {
    pub point: AveragedPoint,
    pub region_id: i64,
}

impl TaggedPoint {
    pub fn new(point: AveragedPoint, region_id: i64) -> Self {
        Self { point, region_id }
    }
}
