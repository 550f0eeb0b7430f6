//! Public entry points.
//!
//! The typed functions ([`plan`], [`design_and_analyze`]) return `Result`.
//! The JSON functions ([`subdivide_land`], [`design_road_network`],
//! [`plan_site`]) never fail: they wrap every outcome in an envelope
//! `{"success": bool, "error"?: string, ...}` and catch panics from the
//! geometry kernels.

use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::analytics::{analyze, AnalysisInput, NetworkAnalysis};
use crate::cancel::CancelToken;
use crate::config::SQUARE_METERS_PER_HECTARE;
use crate::error::{guarded, GeometryError, SiteError, SkipReport};
use crate::geometry::Boundary;
use crate::inputs::{DesignParameters, SubdivisionConfig, TerrainData, ZoningData};
use crate::parcels::{subdivide, Parcel, SiteContext, Subdivision};
use crate::roads::{RoadDesign, RoadSynthesizer};
use crate::serializer::{network_to_geojson, parcels_from_geojson, parcels_to_geojson};
use crate::site_rng::SiteRng;

// ---------------------------------------------------------------------------
// Typed API
// ---------------------------------------------------------------------------

/// Roads plus their analytics.
#[derive(Debug, Clone)]
pub struct AnalyzedDesign {
    pub design: RoadDesign,
    pub analysis: NetworkAnalysis,
}

/// Subdivision, road design and analytics for one site.
#[derive(Debug, Clone)]
pub struct SitePlan {
    pub subdivision: Subdivision,
    pub roads: AnalyzedDesign,
}

/// Design roads for `parcels` (or `boundary` alone) and analyze them over
/// `area_hectares`.
pub fn design_and_analyze(
    parcels: &[Parcel],
    boundary: Option<&Boundary>,
    area_hectares: f64,
    params: &DesignParameters,
    context: SiteContext<'_>,
    cancel: &CancelToken,
) -> Result<AnalyzedDesign, SiteError> {
    let design = RoadSynthesizer::new(params.clone()).design(parcels, boundary, context, cancel)?;
    let analysis = analyze(
        AnalysisInput {
            network: &design.network,
            parcels,
            area_hectares,
            frame: design.frame,
            params,
        },
        cancel,
    )?;
    debug!(
        "analysis: {:.2} km vehicular, LOS {:?}",
        analysis.network_statistics.total_road_length_km,
        analysis.traffic_analysis.level_of_service
    );
    Ok(AnalyzedDesign { design, analysis })
}

/// Subdivide `boundary`, design roads for the parcels and analyze them.
pub fn plan(
    boundary: &Boundary,
    config: &SubdivisionConfig,
    params: &DesignParameters,
    context: SiteContext<'_>,
    rng: &mut SiteRng,
    cancel: &CancelToken,
) -> Result<SitePlan, SiteError> {
    let subdivision = subdivide(boundary, config, context, rng, cancel)?;
    let area_hectares = subdivision.statistics.site_area_m2 / SQUARE_METERS_PER_HECTARE;
    let roads = design_and_analyze(
        &subdivision.parcels,
        Some(boundary),
        area_hectares,
        params,
        context,
        cancel,
    )?;
    Ok(SitePlan { subdivision, roads })
}

// ---------------------------------------------------------------------------
// JSON inputs
// ---------------------------------------------------------------------------

/// Raw JSON inputs of one call. Absent layers use defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct SiteInputs<'a> {
    /// GeoJSON Polygon, MultiPolygon, Feature or FeatureCollection.
    pub boundary: Option<&'a Value>,
    /// Parcel FeatureCollection for road design.
    pub parcels: Option<&'a Value>,
    pub config: Option<&'a Value>,
    /// `{zones: [{geometry, type}]}`.
    pub zoning: Option<&'a Value>,
    /// `{slope: {average}, unsuitable_areas: [...]}`.
    pub terrain: Option<&'a Value>,
    pub design: Option<&'a Value>,
}

/// Parsed optional layers plus whatever was skipped while parsing them.
struct Layers {
    zoning: Option<ZoningData>,
    terrain: Option<TerrainData>,
    skipped: SkipReport,
}

impl Layers {
    fn parse(inputs: &SiteInputs<'_>) -> Result<Self, SiteError> {
        let mut skipped = SkipReport::default();
        let zoning = inputs
            .zoning
            .filter(|v| !v.is_null())
            .map(|v| ZoningData::from_json(v, &mut skipped))
            .transpose()?;
        let terrain = inputs
            .terrain
            .filter(|v| !v.is_null())
            .map(|v| TerrainData::from_json(v, &mut skipped))
            .transpose()?;
        Ok(Self {
            zoning,
            terrain,
            skipped,
        })
    }

    fn context(&self) -> SiteContext<'_> {
        SiteContext {
            zoning: self.zoning.as_ref(),
            terrain: self.terrain.as_ref(),
        }
    }
}

fn parse_boundary(inputs: &SiteInputs<'_>) -> Result<Option<Boundary>, SiteError> {
    inputs
        .boundary
        .filter(|v| !v.is_null())
        .map(Boundary::from_geojson)
        .transpose()
}

fn parse_config(inputs: &SiteInputs<'_>) -> Result<SubdivisionConfig, SiteError> {
    SubdivisionConfig::from_json(inputs.config.unwrap_or(&Value::Null))
}

fn parse_design(inputs: &SiteInputs<'_>) -> Result<DesignParameters, SiteError> {
    DesignParameters::from_json(inputs.design.unwrap_or(&Value::Null))
}

// ---------------------------------------------------------------------------
// Envelopes
// ---------------------------------------------------------------------------

fn to_json<T: Serialize>(value: &T) -> Result<Value, SiteError> {
    Ok(serde_json::to_value(value)?)
}

fn failure(error: String) -> Value {
    json!({ "success": false, "error": error })
}

/// Run `op` and wrap its outcome in a response envelope.
fn envelope(op: impl FnOnce() -> Result<Map<String, Value>, SiteError>) -> Value {
    match guarded(op) {
        Ok(Ok(mut body)) => {
            body.insert("success".to_string(), Value::Bool(true));
            Value::Object(body)
        }
        Ok(Err(err)) => failure(err.to_string()),
        Err(GeometryError::OperationPanicked(msg)) => failure(format!("Internal error: {msg}")),
        Err(err) => failure(err.to_string()),
    }
}

fn insert_analysis(body: &mut Map<String, Value>, roads: &AnalyzedDesign) -> Result<(), SiteError> {
    body.insert("mode".to_string(), to_json(&roads.design.mode)?);
    body.insert("roads".to_string(), to_json(&network_to_geojson(&roads.design.network))?);
    if let Value::Object(analysis) = to_json(&roads.analysis)? {
        body.extend(analysis);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// JSON entry points
// ---------------------------------------------------------------------------

/// Subdivide a boundary into parcels.
///
/// Response: `{success, parcels: FeatureCollection, statistics, skipped}`.
pub fn subdivide_land(inputs: &SiteInputs<'_>, cancel: &CancelToken) -> Value {
    envelope(|| {
        let boundary = parse_boundary(inputs)?.ok_or(SiteError::MissingBoundary)?;
        let config = parse_config(inputs)?;
        let layers = Layers::parse(inputs)?;
        let mut rng = SiteRng::from_optional_seed(config.seed);

        let mut subdivision = subdivide(&boundary, &config, layers.context(), &mut rng, cancel)?;
        let mut skipped = layers.skipped;
        skipped.merge(subdivision.skipped.clone());
        subdivision.statistics.skipped_items = skipped.len();

        let mut body = Map::new();
        body.insert("parcels".to_string(), to_json(&parcels_to_geojson(&subdivision.parcels))?);
        body.insert("statistics".to_string(), to_json(&subdivision.statistics)?);
        body.insert("skipped".to_string(), to_json(&skipped)?);
        Ok(body)
    })
}

/// Design a road network for caller-supplied parcels, or for the boundary
/// alone when no parcels are given.
///
/// Response: `{success, mode, roads: {tier: FeatureCollection}, the six
/// analyses, skipped}`.
pub fn design_road_network(inputs: &SiteInputs<'_>, cancel: &CancelToken) -> Value {
    envelope(|| {
        let boundary = parse_boundary(inputs)?;
        let params = parse_design(inputs)?;
        let layers = Layers::parse(inputs)?;
        let mut skipped = layers.skipped;
        let frame = boundary.as_ref().map(Boundary::frame);
        let parcels = match inputs.parcels.filter(|v| !v.is_null()) {
            Some(value) => parcels_from_geojson(value, frame, &mut skipped)?,
            None => Vec::new(),
        };

        let area_m2 = match (&boundary, &frame) {
            (Some(b), Some(frame)) => b.area_m2(frame),
            _ => parcels.iter().fold(0.0, |acc, p| acc + p.area_m2),
        };
        let context = SiteContext {
            zoning: layers.zoning.as_ref(),
            terrain: layers.terrain.as_ref(),
        };
        let roads = design_and_analyze(
            &parcels,
            boundary.as_ref(),
            area_m2 / SQUARE_METERS_PER_HECTARE,
            &params,
            context,
            cancel,
        )?;
        skipped.merge(roads.design.skipped.clone());
        info!(
            "road design for {} parcels: {} segments",
            parcels.len(),
            roads.design.network.len()
        );

        let mut body = Map::new();
        insert_analysis(&mut body, &roads)?;
        body.insert("skipped".to_string(), to_json(&skipped)?);
        Ok(body)
    })
}

/// Subdivide, design and analyze in one call.
///
/// Response: the union of [`subdivide_land`] and [`design_road_network`].
pub fn plan_site(inputs: &SiteInputs<'_>, cancel: &CancelToken) -> Value {
    envelope(|| {
        let boundary = parse_boundary(inputs)?.ok_or(SiteError::MissingBoundary)?;
        let config = parse_config(inputs)?;
        let params = parse_design(inputs)?;
        let layers = Layers::parse(inputs)?;
        let mut rng = SiteRng::from_optional_seed(config.seed);

        let mut site = plan(&boundary, &config, &params, layers.context(), &mut rng, cancel)?;
        let mut skipped = layers.skipped;
        skipped.merge(site.subdivision.skipped.clone());
        skipped.merge(site.roads.design.skipped.clone());
        site.subdivision.statistics.skipped_items = skipped.len();
        info!(
            "site plan: {} parcels, {} road segments",
            site.subdivision.parcels.len(),
            site.roads.design.network.len()
        );

        let mut body = Map::new();
        body.insert(
            "parcels".to_string(),
            to_json(&parcels_to_geojson(&site.subdivision.parcels))?,
        );
        body.insert("statistics".to_string(), to_json(&site.subdivision.statistics)?);
        insert_analysis(&mut body, &site.roads)?;
        body.insert("skipped".to_string(), to_json(&skipped)?);
        Ok(body)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f64) -> Value {
        json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [size, 0.0], [size, size], [0.0, size], [0.0, 0.0]]]
        })
    }

    #[test]
    fn test_point_boundary_is_rejected() {
        let point = json!({"type": "Point", "coordinates": [1.0, 2.0]});
        let response = subdivide_land(
            &SiteInputs {
                boundary: Some(&point),
                ..Default::default()
            },
            &CancelToken::new(),
        );
        assert_eq!(response["success"], false);
        assert_eq!(
            response["error"],
            "Invalid geometry type: Point. Expected Polygon or MultiPolygon"
        );
    }

    #[test]
    fn test_missing_boundary() {
        let response = subdivide_land(&SiteInputs::default(), &CancelToken::new());
        assert_eq!(response["success"], false);
        assert!(response["error"].as_str().unwrap().contains("boundary"));
    }

    #[test]
    fn test_subdivide_envelope() {
        let boundary = square(200.0);
        let config = json!({"method": "grid", "targetParcelArea": 400.0});
        let response = subdivide_land(
            &SiteInputs {
                boundary: Some(&boundary),
                config: Some(&config),
                ..Default::default()
            },
            &CancelToken::new(),
        );
        assert_eq!(response["success"], true);
        assert_eq!(response["parcels"]["type"], "FeatureCollection");
        assert_eq!(response["parcels"]["features"].as_array().unwrap().len(), 100);
        assert_eq!(response["statistics"]["total_parcels"], 100);
        assert_eq!(response["statistics"]["skipped_items"], 0);
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let boundary = square(200.0);
        let config = json!({"min_area": 600.0, "max_area": 300.0});
        let response = subdivide_land(
            &SiteInputs {
                boundary: Some(&boundary),
                config: Some(&config),
                ..Default::default()
            },
            &CancelToken::new(),
        );
        assert_eq!(response["success"], false);
        assert!(response["error"].as_str().unwrap().starts_with("Invalid configuration"));
    }

    #[test]
    fn test_design_from_boundary_only() {
        let boundary = square(1000.0);
        let response = design_road_network(
            &SiteInputs {
                boundary: Some(&boundary),
                ..Default::default()
            },
            &CancelToken::new(),
        );
        assert_eq!(response["success"], true);
        assert_eq!(response["mode"], "basic_grid");
        assert!(!response["roads"]["primary"]["features"].as_array().unwrap().is_empty());
        for key in [
            "network_statistics",
            "traffic_analysis",
            "accessibility_analysis",
            "cost_analysis",
            "environmental_analysis",
            "safety_analysis",
        ] {
            assert!(response[key].is_object(), "missing {key}");
        }
    }

    #[test]
    fn test_design_with_nothing_is_empty() {
        let response = design_road_network(&SiteInputs::default(), &CancelToken::new());
        assert_eq!(response["success"], true);
        assert_eq!(response["mode"], "empty");
        assert_eq!(response["network_statistics"]["total_road_length_km"], 0.0);
        assert_eq!(response["traffic_analysis"]["volume_capacity_ratio"], Value::Null);
    }

    #[test]
    fn test_design_from_parcel_collection() {
        let boundary = square(200.0);
        let config = json!({"method": "grid", "target_parcel_area": 400.0});
        let subdivided = subdivide_land(
            &SiteInputs {
                boundary: Some(&boundary),
                config: Some(&config),
                ..Default::default()
            },
            &CancelToken::new(),
        );
        let response = design_road_network(
            &SiteInputs {
                parcels: Some(&subdivided["parcels"]),
                ..Default::default()
            },
            &CancelToken::new(),
        );
        assert_eq!(response["success"], true);
        assert_eq!(response["mode"], "parcels");
        assert!(response["network_statistics"]["total_road_length_km"].as_f64().unwrap() > 0.0);
    }

    #[test]
    fn test_plan_site_combines_everything() {
        let boundary = square(400.0);
        let config = json!({"method": "voronoi", "seed": 7, "target_parcel_area": 1600.0});
        let design = json!({"bikeLanes": false, "medians": true});
        let response = plan_site(
            &SiteInputs {
                boundary: Some(&boundary),
                config: Some(&config),
                design: Some(&design),
                ..Default::default()
            },
            &CancelToken::new(),
        );
        assert_eq!(response["success"], true);
        assert_eq!(response["statistics"]["method"], "voronoi");
        assert_eq!(response["cost_analysis"]["features"]["bike_lanes"], 0.0);
        assert!(response["cost_analysis"]["features"]["medians"].as_f64().unwrap() > 0.0);
        assert!(response["roads"]["emergency"].is_object());
    }

    #[test]
    fn test_cancelled_call_fails() {
        let boundary = square(200.0);
        let cancel = CancelToken::new();
        cancel.cancel();
        let response = plan_site(
            &SiteInputs {
                boundary: Some(&boundary),
                ..Default::default()
            },
            &cancel,
        );
        assert_eq!(response["success"], false);
        assert_eq!(response["error"], "Operation cancelled");
    }
}
