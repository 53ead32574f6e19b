use crate::{core::geo::LatLng, photos::PhotoMarker, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// GeoJSON geometry types used by the photo overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJsonGeometry {
    Point { coordinates: [f64; 2] },
    LineString { coordinates: Vec<[f64; 2]> },
    Polygon { coordinates: Vec<Vec<[f64; 2]>> },
    MultiPoint { coordinates: Vec<[f64; 2]> },
}

/// GeoJSON feature with geometry and properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct GeoJsonFeature {
    pub geometry: Option<GeoJsonGeometry>,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}

impl GeoJsonFeature {
    pub fn new(geometry: GeoJsonGeometry) -> Self {
        Self {
            geometry: Some(geometry),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    pub features: Vec<GeoJsonFeature>,
}

impl FeatureCollection {
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Closed polygon approximating a circle of `radius_km` around `center`.
///
/// The ring has `steps + 1` positions; the last repeats the first.
pub fn circle_polygon(center: LatLng, radius_km: f64, steps: usize) -> GeoJsonFeature {
    let steps = steps.max(3);
    let mut ring: Vec<[f64; 2]> = (0..steps)
        .map(|i| {
            let bearing = -360.0 * i as f64 / steps as f64;
            center.destination(bearing, radius_km).to_position()
        })
        .collect();
    ring.push(ring[0]);

    GeoJsonFeature::new(GeoJsonGeometry::Polygon {
        coordinates: vec![ring],
    })
}

/// Point features for every located photo; photos without a location are skipped
pub fn markers_feature_collection(markers: &[PhotoMarker]) -> FeatureCollection {
    let features = markers
        .iter()
        .filter_map(|marker| marker.location)
        .map(|location| {
            GeoJsonFeature::new(GeoJsonGeometry::Point {
                coordinates: location.to_position(),
            })
            .with_property("title", "Photo")
            .with_property("icon", "monument")
        })
        .collect();
    FeatureCollection { features }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_circle_polygon_is_closed() {
        let center = LatLng::new(64.0, 10.0);
        let circle = circle_polygon(center, 25.0, 64);

        let Some(GeoJsonGeometry::Polygon { coordinates }) = &circle.geometry else {
            panic!("expected a polygon");
        };
        let ring = &coordinates[0];
        assert_eq!(ring.len(), 65);
        assert_eq!(ring.first(), ring.last());

        for position in ring {
            let vertex = LatLng::new(position[1], position[0]);
            assert!((center.distance_km(&vertex) - 25.0).abs() < 0.1);
        }
    }

    #[test]
    fn test_circle_serializes_as_feature() {
        let value = circle_polygon(LatLng::new(0.0, 0.0), 1.0, 8).to_value().unwrap();
        assert_eq!(value["type"], "Feature");
        assert_eq!(value["geometry"]["type"], "Polygon");
    }

    #[test]
    fn test_markers_feature_collection() {
        let markers = vec![
            PhotoMarker::new("https://a.example/1.jpg", Some(LatLng::new(60.0, 5.0))),
            PhotoMarker::new("https://a.example/2.jpg", None),
        ];

        let collection = markers_feature_collection(&markers);
        assert_eq!(collection.len(), 1);
        assert_eq!(
            collection.to_value().unwrap(),
            json!({
                "type": "FeatureCollection",
                "features": [{
                    "type": "Feature",
                    "geometry": {"type": "Point", "coordinates": [5.0, 60.0]},
                    "properties": {"icon": "monument", "title": "Photo"}
                }]
            })
        );
    }

    #[test]
    fn test_parse_feature_collection() {
        let parsed: FeatureCollection = serde_json::from_value(json!({
            "type": "FeatureCollection",
            "features": [{"type": "Feature", "geometry": null}]
        }))
        .unwrap();
        assert_eq!(parsed.len(), 1);
        assert!(parsed.features[0].properties.is_empty());
    }
}
