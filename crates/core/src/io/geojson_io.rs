//! GeoJSON region input and feature output

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::vector::{AttributeValue, FeatureCollection, RegionPolygon, REGION_ID_FIELD};
use geo_types::Geometry;
use serde_json::{json, Map, Value as JsonValue};
use std::io::Write;
use std::path::Path;
use tracing::warn;

/// Legacy attribute name for region identifiers on coastal polygon layers
const LEGACY_REGION_FIELD: &str = "BEACH_CODE";

/// Read labelled region polygons from a GeoJSON file
pub fn read_regions<P: AsRef<Path>>(path: P) -> Result<Vec<RegionPolygon>> {
    let text = std::fs::read_to_string(path.as_ref())?;
    read_regions_from_str(&text)
}

/// Parse labelled region polygons from GeoJSON text.
///
/// The identifier is taken from the `region_id` property, falling back to
/// `BEACH_CODE`. Multi-polygons contribute one region per part. Features
/// without a usable identifier or polygonal geometry are skipped.
pub fn read_regions_from_str(text: &str) -> Result<Vec<RegionPolygon>> {
    let collection: geojson::FeatureCollection = text.parse()?;
    let mut regions = Vec::new();

    for (idx, feature) in collection.features.into_iter().enumerate() {
        let id = feature
            .property(REGION_ID_FIELD)
            .or_else(|| feature.property(LEGACY_REGION_FIELD))
            .and_then(json_to_i64);
        let Some(id) = id else {
            warn!(feature = idx, "region feature has no numeric identifier, skipped");
            continue;
        };

        let Some(geometry) = feature.geometry else {
            warn!(feature = idx, "region feature has no geometry, skipped");
            continue;
        };

        match Geometry::<f64>::try_from(geometry.value)? {
            Geometry::Polygon(polygon) => regions.push(RegionPolygon::new(id, polygon)),
            Geometry::MultiPolygon(multi) => {
                regions.extend(multi.0.into_iter().map(|p| RegionPolygon::new(id, p)))
            }
            _ => warn!(feature = idx, "region feature is not polygonal, skipped"),
        }
    }

    Ok(regions)
}

fn json_to_i64(value: &JsonValue) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|v| v.fract() == 0.0)
            .map(|v| v as i64)
    })
}

fn attribute_to_json(value: &AttributeValue) -> JsonValue {
    match value {
        AttributeValue::Null => JsonValue::Null,
        AttributeValue::Bool(b) => JsonValue::Bool(*b),
        AttributeValue::Int(i) => json!(i),
        AttributeValue::Float(f) => serde_json::Number::from_f64(*f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        AttributeValue::String(s) => JsonValue::String(s.clone()),
    }
}

/// Convert a feature collection to its GeoJSON form.
///
/// When an EPSG code is known it is stamped as a named `crs` member.
pub fn to_geojson(collection: &FeatureCollection, crs: Option<&CRS>) -> geojson::FeatureCollection {
    let features = collection
        .iter()
        .map(|f| {
            let properties: Map<String, JsonValue> = f
                .properties
                .iter()
                .map(|(k, v)| (k.clone(), attribute_to_json(v)))
                .collect();
            geojson::Feature {
                bbox: None,
                geometry: f
                    .geometry
                    .as_ref()
                    .map(|g| geojson::Geometry::new(geojson::Value::from(g))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    let foreign_members = crs.and_then(CRS::urn).map(|urn| {
        let mut members = Map::new();
        members.insert(
            "crs".to_string(),
            json!({ "type": "name", "properties": { "name": urn } }),
        );
        members
    });

    geojson::FeatureCollection {
        bbox: None,
        features,
        foreign_members,
    }
}

/// Serialize a feature collection as GeoJSON
pub fn write_feature_collection<W: Write>(
    writer: W,
    collection: &FeatureCollection,
    crs: Option<&CRS>,
) -> Result<()> {
    let gj = to_geojson(collection, crs);
    serde_json::to_writer_pretty(writer, &gj).map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::Feature;
    use geo_types::{line_string, Point};

    const REGIONS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"BEACH_CODE": 3},
             "geometry": {"type": "Polygon", "coordinates": [[[0,0],[10,0],[10,10],[0,10],[0,0]]]}},
            {"type": "Feature", "properties": {"region_id": 7.0},
             "geometry": {"type": "MultiPolygon", "coordinates": [
                [[[20,0],[30,0],[30,10],[20,0]]],
                [[[40,0],[50,0],[50,10],[40,0]]]]}},
            {"type": "Feature", "properties": {"name": "no id"},
             "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]]}},
            {"type": "Feature", "properties": {"region_id": 9},
             "geometry": {"type": "Point", "coordinates": [1, 1]}}
        ]
    }"#;

    #[test]
    fn test_read_regions() {
        let regions = read_regions_from_str(REGIONS).unwrap();
        let ids: Vec<i64> = regions.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 7, 7]);
        assert_eq!(regions[0].polygon.exterior().0.len(), 5);
    }

    #[test]
    fn test_invalid_geojson() {
        assert!(matches!(
            read_regions_from_str("{\"type\": \"nope\"}"),
            Err(Error::GeoJson(_))
        ));
    }

    #[test]
    fn test_write_with_crs_member() {
        let mut fc = FeatureCollection::new();
        fc.push(
            Feature::new(Geometry::Point(Point::new(1.5, 2.5)))
                .with_property(REGION_ID_FIELD, AttributeValue::Int(4)),
        );
        fc.push(
            Feature::new(Geometry::LineString(line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)]))
                .with_property(REGION_ID_FIELD, AttributeValue::Int(4)),
        );

        let mut buf = Vec::new();
        write_feature_collection(&mut buf, &fc, Some(&CRS::from_epsg(25830))).unwrap();
        let v: JsonValue = serde_json::from_slice(&buf).unwrap();

        assert_eq!(v["crs"]["properties"]["name"], "urn:ogc:def:crs:EPSG::25830");
        assert_eq!(v["features"][0]["properties"]["region_id"], 4);
        assert_eq!(v["features"][0]["geometry"]["type"], "Point");
        assert_eq!(v["features"][1]["geometry"]["type"], "LineString");
    }
}
