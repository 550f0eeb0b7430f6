//! GeoJSON output for parcels and road tiers, and GeoJSON input for
//! caller-supplied parcels.
//!
//! Every road tier becomes its own FeatureCollection, even when it is empty,
//! so consumers can rely on all seven keys being present.

use std::collections::BTreeMap;

use geo::{Area, BoundingRect, MultiPolygon, Polygon, Rect};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value};
use serde_json::json;

use crate::coordinate_frame::CoordinateFrame;
use crate::error::{SiteError, SkipReport};
use crate::geometry::{multipolygon_from_json, polygon_centroid};
use crate::inputs::ZoneType;
use crate::parcels::{Parcel, ParcelId, ParcelSource};
use crate::roads::{RoadNetwork, RoadSegment, RoadTier};

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn feature(geometry: Value, properties: serde_json::Value) -> Feature {
    let properties: Option<JsonObject> = match properties {
        serde_json::Value::Object(map) => Some(map),
        _ => None,
    };
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geometry)),
        id: None,
        properties,
        foreign_members: None,
    }
}

fn collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

pub fn parcel_feature(parcel: &Parcel) -> Feature {
    feature(
        Value::from(&parcel.geometry),
        json!({
            "parcel_id": parcel.id.0,
            "area": parcel.area_m2,
            "perimeter": parcel.perimeter_m,
            "zone_type": parcel.zone_type.as_str(),
            "corner_lot": parcel.is_corner_lot,
            "road_access": parcel.has_road_access,
        }),
    )
}

pub fn parcels_to_geojson(parcels: &[Parcel]) -> FeatureCollection {
    collection(parcels.iter().map(parcel_feature).collect())
}

pub fn road_feature(segment: &RoadSegment) -> Feature {
    feature(
        Value::from(&segment.geometry),
        json!({
            "road_id": segment.id.0,
            "road_type": segment.tier.as_str(),
            "width": segment.width_m,
            "length": segment.length_m,
            "estimated_capacity": segment.estimated_capacity(),
            "algorithm_label": segment.algorithm,
            "connectivity_score": segment.connectivity_score,
        }),
    )
}

/// One FeatureCollection per tier, keyed by tier name.
pub fn network_to_geojson(network: &RoadNetwork) -> BTreeMap<&'static str, FeatureCollection> {
    RoadTier::ALL
        .iter()
        .map(|&tier| {
            let features = network.tier(tier).map(road_feature).collect();
            (tier.as_str(), collection(features))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

fn zone_property(properties: Option<&JsonObject>) -> Option<ZoneType> {
    let properties = properties?;
    ["zone_type", "zoneType", "type"]
        .iter()
        .find_map(|key| properties.get(*key).and_then(|v| v.as_str()))
        .and_then(ZoneType::parse)
}

fn union_bounds(polygons: &[Polygon<f64>]) -> Option<Rect<f64>> {
    MultiPolygon::new(polygons.to_vec()).bounding_rect()
}

/// Parse a parcel FeatureCollection, measuring each polygon in `frame`, or in
/// the frame of the collection's extent when the call has none yet. Features
/// without polygon geometry are skipped; a MultiPolygon feature yields one
/// parcel per member.
pub fn parcels_from_geojson(
    value: &serde_json::Value,
    frame: Option<CoordinateFrame>,
    report: &mut SkipReport,
) -> Result<Vec<Parcel>, SiteError> {
    let features = match GeoJson::from_json_value(value.clone())? {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(f) => vec![f],
        GeoJson::Geometry(g) => vec![Feature::from(g)],
    };

    let mut pieces: Vec<(usize, Polygon<f64>, Option<ZoneType>)> = Vec::new();
    for (index, feature) in features.iter().enumerate() {
        let Some(geometry) = &feature.geometry else {
            report.record("parcels", index, &"feature has no geometry");
            continue;
        };
        let raw = match serde_json::to_value(geometry) {
            Ok(raw) => raw,
            Err(e) => {
                report.record("parcels", index, &e);
                continue;
            }
        };
        match multipolygon_from_json(&raw) {
            Ok(mp) => {
                let zone = zone_property(feature.properties.as_ref());
                pieces.extend(mp.0.into_iter().map(|p| (index, p, zone)));
            }
            Err(e) => report.record("parcels", index, &e),
        }
    }

    let polygons: Vec<Polygon<f64>> = pieces.iter().map(|(_, p, _)| p.clone()).collect();
    let Some(bounds) = union_bounds(&polygons) else {
        return Ok(Vec::new());
    };
    let frame = frame.unwrap_or_else(|| CoordinateFrame::resolve(&bounds));

    let mut parcels = Vec::with_capacity(pieces.len());
    for (index, geometry, zone) in pieces {
        let centroid = match polygon_centroid(&geometry) {
            Ok(c) => c,
            Err(e) => {
                report.record("parcels", index, &e);
                continue;
            }
        };
        parcels.push(Parcel {
            id: ParcelId(parcels.len() as u32 + 1),
            source: ParcelSource::Imported {
                feature: index as u32,
            },
            area_m2: frame.area_to_m2(geometry.unsigned_area()),
            perimeter_m: frame.perimeter_m(&geometry),
            centroid,
            geometry,
            zone_type: zone.unwrap_or_default(),
            is_corner_lot: false,
            has_road_access: false,
        });
    }
    Ok(parcels)
}
