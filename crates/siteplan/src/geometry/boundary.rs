//! Site boundary parsing and measurement.

use geo::{Area, BoundingRect, Contains, Coord, LineString, MultiPolygon, Point, Polygon, Rect};
use geojson::{GeoJson, Value};

use crate::coordinate_frame::CoordinateFrame;
use crate::error::SiteError;

/// Immutable site extent. Always holds at least one polygon and a finite
/// bounding box.
#[derive(Debug, Clone)]
pub struct Boundary {
    polygons: MultiPolygon<f64>,
    bounds: Rect<f64>,
}

impl Boundary {
    pub fn new(polygons: MultiPolygon<f64>) -> Result<Self, SiteError> {
        if polygons.0.is_empty() {
            return Err(SiteError::NoGeometry);
        }
        let bounds = polygons.bounding_rect().ok_or(SiteError::NoGeometry)?;
        if !(bounds.width() > 0.0 && bounds.height() > 0.0) {
            return Err(SiteError::NoGeometry);
        }
        Ok(Self { polygons, bounds })
    }

    pub fn from_polygon(polygon: Polygon<f64>) -> Result<Self, SiteError> {
        Self::new(MultiPolygon::new(vec![polygon]))
    }

    /// Parse a GeoJSON Polygon, MultiPolygon, Feature or FeatureCollection.
    pub fn from_geojson(value: &serde_json::Value) -> Result<Self, SiteError> {
        Self::new(multipolygon_from_json(value)?)
    }

    pub fn polygons(&self) -> &MultiPolygon<f64> {
        &self.polygons
    }

    pub fn bounds(&self) -> Rect<f64> {
        self.bounds
    }

    /// Resolve the coordinate frame for this boundary.
    pub fn frame(&self) -> CoordinateFrame {
        CoordinateFrame::resolve(&self.bounds)
    }

    pub fn area_m2(&self, frame: &CoordinateFrame) -> f64 {
        frame.area_to_m2(self.polygons.unsigned_area())
    }

    pub fn contains(&self, coord: Coord<f64>) -> bool {
        let point = Point::from(coord);
        self.polygons.0.iter().any(|p| p.contains(&point))
    }
}

/// Extract every polygon from a GeoJSON value.
///
/// Geometries other than Polygon/MultiPolygon are rejected with
/// [`SiteError::InvalidGeometryType`]; Features and FeatureCollections are
/// unwrapped.
pub fn multipolygon_from_json(value: &serde_json::Value) -> Result<MultiPolygon<f64>, SiteError> {
    let geojson = GeoJson::from_json_value(value.clone())?;
    match geojson {
        GeoJson::Geometry(geometry) => multipolygon_from_value(&geometry.value),
        GeoJson::Feature(feature) => {
            let geometry = feature.geometry.ok_or(SiteError::NoGeometry)?;
            multipolygon_from_value(&geometry.value)
        }
        GeoJson::FeatureCollection(collection) => {
            let mut polygons = Vec::new();
            for feature in collection.features {
                if let Some(geometry) = feature.geometry {
                    polygons.extend(multipolygon_from_value(&geometry.value)?.0);
                }
            }
            if polygons.is_empty() {
                return Err(SiteError::NoGeometry);
            }
            Ok(MultiPolygon::new(polygons))
        }
    }
}

fn multipolygon_from_value(value: &Value) -> Result<MultiPolygon<f64>, SiteError> {
    match value {
        Value::Polygon(rings) => Ok(MultiPolygon::new(vec![polygon_from_rings(rings)?])),
        Value::MultiPolygon(polygons) => polygons
            .iter()
            .map(|rings| polygon_from_rings(rings))
            .collect::<Result<Vec<_>, _>>()
            .map(MultiPolygon::new),
        other => Err(SiteError::InvalidGeometryType(
            geometry_type_name(other).to_string(),
        )),
    }
}

fn geometry_type_name(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

fn polygon_from_rings(rings: &[Vec<Vec<f64>>]) -> Result<Polygon<f64>, SiteError> {
    let mut rings = rings.iter().map(|ring| ring_from_positions(ring));
    let exterior = rings
        .next()
        .ok_or_else(|| SiteError::InvalidGeoJson("polygon has no rings".to_string()))??;
    let interiors = rings.collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon::new(exterior, interiors))
}

fn ring_from_positions(positions: &[Vec<f64>]) -> Result<LineString<f64>, SiteError> {
    let coords = positions
        .iter()
        .map(|position| match (position.first(), position.get(1)) {
            (Some(&x), Some(&y)) if x.is_finite() && y.is_finite() => Ok(Coord { x, y }),
            _ => Err(SiteError::InvalidGeoJson(
                "position must hold two finite numbers".to_string(),
            )),
        })
        .collect::<Result<Vec<_>, _>>()?;
    if coords.len() < 3 {
        return Err(SiteError::InvalidGeoJson(
            "polygon ring needs at least three positions".to_string(),
        ));
    }
    Ok(LineString::new(coords))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn square_json(size: f64) -> serde_json::Value {
        json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [size, 0.0], [size, size], [0.0, size], [0.0, 0.0]]]
        })
    }

    #[test]
    fn test_parse_polygon() {
        let boundary = Boundary::from_geojson(&square_json(100.0)).unwrap();
        assert_eq!(boundary.polygons().0.len(), 1);
        assert!((boundary.area_m2(&CoordinateFrame::projected()) - 10_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_parse_feature_wrapping_multipolygon() {
        let value = json!({
            "type": "Feature",
            "properties": {},
            "geometry": {
                "type": "MultiPolygon",
                "coordinates": [
                    [[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]]],
                    [[[20.0, 0.0], [30.0, 0.0], [30.0, 10.0], [20.0, 10.0], [20.0, 0.0]]]
                ]
            }
        });
        let boundary = Boundary::from_geojson(&value).unwrap();
        assert_eq!(boundary.polygons().0.len(), 2);
        assert_eq!(boundary.bounds().width(), 30.0);
    }

    #[test]
    fn test_point_is_invalid_geometry_type() {
        let value = json!({"type": "Point", "coordinates": [1.0, 2.0]});
        let err = Boundary::from_geojson(&value).unwrap_err();
        assert!(matches!(err, SiteError::InvalidGeometryType(ref t) if t == "Point"));
    }

    #[test]
    fn test_garbage_is_invalid_geojson() {
        let err = Boundary::from_geojson(&json!({"hello": "world"})).unwrap_err();
        assert!(matches!(err, SiteError::InvalidGeoJson(_)));
    }

    #[test]
    fn test_contains() {
        let boundary = Boundary::from_geojson(&square_json(100.0)).unwrap();
        assert!(boundary.contains(Coord { x: 50.0, y: 50.0 }));
        assert!(!boundary.contains(Coord { x: 150.0, y: 50.0 }));
    }
}
