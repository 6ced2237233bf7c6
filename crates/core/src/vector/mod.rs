//! Vector data structures
//!
//! Features carry `geo-types` geometries plus a small attribute table. The
//! extraction pipeline emits points and polylines tagged with the integer
//! `region_id` of the coastal polygon they belong to.

use geo_types::{Geometry, Polygon};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute name carrying the region (beach) identifier on emitted features
pub const REGION_ID_FIELD: &str = "region_id";

/// Attribute value types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl AttributeValue {
    /// Integer view of the value; floats with no fractional part count
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttributeValue::Int(v) => Some(*v),
            AttributeValue::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }
}

/// A geographic feature with geometry and attributes
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Feature geometry
    pub geometry: Option<Geometry<f64>>,
    /// Feature attributes, ordered by name
    pub properties: BTreeMap<String, AttributeValue>,
}

impl Feature {
    /// Create a new feature with geometry
    pub fn new(geometry: Geometry<f64>) -> Self {
        Self {
            geometry: Some(geometry),
            properties: BTreeMap::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with_property(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.set_property(key, value);
        self
    }

    /// Set an attribute
    pub fn set_property(&mut self, key: impl Into<String>, value: AttributeValue) {
        self.properties.insert(key.into(), value);
    }

    /// Get an attribute
    pub fn get_property(&self, key: &str) -> Option<&AttributeValue> {
        self.properties.get(key)
    }

    /// The region identifier attribute, if present and integral
    pub fn region_id(&self) -> Option<i64> {
        self.get_property(REGION_ID_FIELD).and_then(AttributeValue::as_i64)
    }
}

/// Collection of features
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new() -> Self {
        Self { features: Vec::new() }
    }

    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }
}

impl FromIterator<Feature> for FeatureCollection {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        Self {
            features: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for FeatureCollection {
    type Item = Feature;
    type IntoIter = std::vec::IntoIter<Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.into_iter()
    }
}

/// A labelled coastal analysis polygon.
///
/// Identifier 0 is reserved for "outside every region".
#[derive(Debug, Clone, PartialEq)]
pub struct RegionPolygon {
    pub id: i64,
    pub polygon: Polygon<f64>,
}

impl RegionPolygon {
    pub fn new(id: i64, polygon: Polygon<f64>) -> Self {
        Self { id, polygon }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::Point;

    #[test]
    fn test_region_id_property() {
        let f = Feature::new(Geometry::Point(Point::new(1.0, 2.0)))
            .with_property(REGION_ID_FIELD, AttributeValue::Int(7));
        assert_eq!(f.region_id(), Some(7));
    }

    #[test]
    fn test_float_region_id() {
        assert_eq!(AttributeValue::Float(12.0).as_i64(), Some(12));
        assert_eq!(AttributeValue::Float(12.5).as_i64(), None);
        assert_eq!(AttributeValue::String("3".into()).as_i64(), None);
    }

    #[test]
    fn test_collection_from_iter() {
        let fc: FeatureCollection = (0..3)
            .map(|i| Feature::new(Geometry::Point(Point::new(i as f64, 0.0))))
            .collect();
        assert_eq!(fc.len(), 3);
        assert!(!fc.is_empty());
    }
}
