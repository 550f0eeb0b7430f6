//! Subdivision configuration and its normalization.
//!
//! [`SubdivisionConfig`] mirrors the caller's dictionary (every field
//! optional, camelCase accepted). [`SubdivisionConfig::resolve`] turns it into
//! a [`ResolvedSubdivision`] with concrete values, using the boundary area and
//! terrain for the derived defaults.

use serde::{Deserialize, Serialize};

use crate::config::{
    COMMERCIAL_AREA_FACTOR, DEFAULT_CORNER_LOT_RATIO, DEFAULT_MAX_AREA, DEFAULT_MIN_AREA,
    DEFAULT_ROAD_ACCESS_PERCENTAGE, INDUSTRIAL_AREA_FACTOR, STEEP_SLOPE_AREA_FACTOR,
};
use crate::error::SiteError;

use super::terrain::TerrainData;
use super::zoning::ZoneType;

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubdivisionMethod {
    #[default]
    Grid,
    Voronoi,
    Optimized,
}

impl SubdivisionMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            SubdivisionMethod::Grid => "grid",
            SubdivisionMethod::Voronoi => "voronoi",
            SubdivisionMethod::Optimized => "optimized",
        }
    }
}

/// Lot-size keyword used to derive a target parcel area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LotSize {
    Small,
    Medium,
    Large,
    Estate,
}

impl LotSize {
    /// Target parcel area in m².
    pub fn target_area(self) -> f64 {
        match self {
            LotSize::Small => 125.0,
            LotSize::Medium => 250.0,
            LotSize::Large => 500.0,
            LotSize::Estate => 1000.0,
        }
    }
}

/// Target area derived from the site size when neither a target nor a lot
/// size keyword is given.
pub fn target_area_for_site(site_area_m2: f64) -> f64 {
    if site_area_m2 < 5_000.0 {
        site_area_m2 / 10.0
    } else if site_area_m2 < 50_000.0 {
        400.0
    } else {
        800.0
    }
}

// ---------------------------------------------------------------------------
// Raw and resolved configuration
// ---------------------------------------------------------------------------

/// Subdivision request as supplied by the caller.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SubdivisionConfig {
    pub method: SubdivisionMethod,
    #[serde(alias = "targetParcelArea", alias = "target_area")]
    pub target_parcel_area: Option<f64>,
    #[serde(alias = "minArea")]
    pub min_area: Option<f64>,
    #[serde(alias = "maxArea")]
    pub max_area: Option<f64>,
    #[serde(alias = "parcelType")]
    pub parcel_type: Option<ZoneType>,
    #[serde(alias = "lotSize")]
    pub lot_size: Option<LotSize>,
    #[serde(
        alias = "road_access",
        alias = "roadAccess",
        alias = "roadAccessPercentage"
    )]
    pub road_access_percentage: Option<f64>,
    #[serde(alias = "cornerLotRatio")]
    pub corner_lot_ratio: Option<f64>,
    /// Seed for Voronoi sampling; absent means non-reproducible sampling.
    pub seed: Option<u64>,
}

/// Fully-defaulted subdivision settings for one call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedSubdivision {
    pub method: SubdivisionMethod,
    pub target_parcel_area: f64,
    pub min_area: f64,
    pub max_area: f64,
    pub parcel_type: ZoneType,
    pub road_access_percentage: f64,
    pub corner_lot_ratio: f64,
}

impl SubdivisionConfig {
    /// Parse from JSON; `null` yields the all-default config.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, SiteError> {
        Ok(serde_json::from_value(super::or_empty_object(value))?)
    }

    pub fn with_method(mut self, method: SubdivisionMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_target_area(mut self, area: f64) -> Self {
        self.target_parcel_area = Some(area);
        self
    }

    /// Fill in every default for a site of `site_area_m2`.
    pub fn resolve(
        &self,
        site_area_m2: f64,
        terrain: Option<&TerrainData>,
    ) -> Result<ResolvedSubdivision, SiteError> {
        let target_parcel_area = match (self.target_parcel_area, self.lot_size) {
            (Some(target), _) => target,
            (None, Some(lot_size)) => lot_size.target_area(),
            (None, None) => target_area_for_site(site_area_m2),
        };
        if !(target_parcel_area.is_finite() && target_parcel_area > 0.0) {
            return Err(SiteError::InvalidConfig(format!(
                "target parcel area must be positive, got {target_parcel_area}"
            )));
        }

        let parcel_type = self.parcel_type.unwrap_or_default();
        let mut widen = 1.0;
        match parcel_type {
            ZoneType::Commercial => widen *= COMMERCIAL_AREA_FACTOR,
            ZoneType::Industrial => widen *= INDUSTRIAL_AREA_FACTOR,
            _ => {}
        }
        if terrain.is_some_and(TerrainData::is_steep) {
            widen *= STEEP_SLOPE_AREA_FACTOR;
        }
        let min_area = self.min_area.unwrap_or(DEFAULT_MIN_AREA * widen);
        let max_area = self.max_area.unwrap_or(DEFAULT_MAX_AREA * widen);
        if !(min_area.is_finite() && max_area.is_finite()) || min_area < 0.0 || max_area < min_area
        {
            return Err(SiteError::InvalidConfig(format!(
                "area bounds must satisfy 0 <= min_area <= max_area, got [{min_area}, {max_area}]"
            )));
        }

        Ok(ResolvedSubdivision {
            method: self.method,
            target_parcel_area,
            min_area,
            max_area,
            parcel_type,
            road_access_percentage: clamp_percentage(
                self.road_access_percentage,
                DEFAULT_ROAD_ACCESS_PERCENTAGE,
            ),
            corner_lot_ratio: clamp_percentage(self.corner_lot_ratio, DEFAULT_CORNER_LOT_RATIO),
        })
    }
}

fn clamp_percentage(value: Option<f64>, default: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() => v.clamp(0.0, 100.0),
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::SlopeSummary;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let config = SubdivisionConfig::from_json(&serde_json::Value::Null).unwrap();
        let resolved = config.resolve(1_000_000.0, None).unwrap();
        assert_eq!(resolved.method, SubdivisionMethod::Grid);
        assert_eq!(resolved.target_parcel_area, 800.0);
        assert_eq!(resolved.min_area, DEFAULT_MIN_AREA);
        assert_eq!(resolved.max_area, DEFAULT_MAX_AREA);
        assert_eq!(resolved.parcel_type, ZoneType::Residential);
        assert_eq!(resolved.road_access_percentage, 100.0);
        assert_eq!(resolved.corner_lot_ratio, 20.0);
    }

    #[test]
    fn test_camel_case_keys() {
        let config = SubdivisionConfig::from_json(&json!({
            "method": "voronoi",
            "targetParcelArea": 350.0,
            "minArea": 100.0,
            "maxArea": 900.0,
            "parcelType": "mixedUse",
            "roadAccess": 80.0,
            "cornerLotRatio": 15.0,
            "seed": 7
        }))
        .unwrap();
        let resolved = config.resolve(20_000.0, None).unwrap();
        assert_eq!(resolved.method, SubdivisionMethod::Voronoi);
        assert_eq!(resolved.target_parcel_area, 350.0);
        assert_eq!(resolved.min_area, 100.0);
        assert_eq!(resolved.max_area, 900.0);
        assert_eq!(resolved.parcel_type, ZoneType::MixedUse);
        assert_eq!(resolved.road_access_percentage, 80.0);
        assert_eq!(resolved.corner_lot_ratio, 15.0);
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_target_area_derivation() {
        assert_eq!(target_area_for_site(3_000.0), 300.0);
        assert_eq!(target_area_for_site(20_000.0), 400.0);
        assert_eq!(target_area_for_site(200_000.0), 800.0);

        let config = SubdivisionConfig::from_json(&json!({"lot_size": "estate"})).unwrap();
        assert_eq!(config.resolve(200_000.0, None).unwrap().target_parcel_area, 1000.0);
    }

    #[test]
    fn test_industrial_and_steep_widen_defaults() {
        let config = SubdivisionConfig::from_json(&json!({"parcel_type": "industrial"})).unwrap();
        let terrain = TerrainData {
            slope: Some(SlopeSummary {
                average: 20.0,
                maximum: None,
            }),
            unsuitable_areas: Vec::new(),
        };
        let resolved = config.resolve(100_000.0, Some(&terrain)).unwrap();
        assert!((resolved.min_area - 200.0 * 1.3 * 1.2).abs() < 1e-9);
        assert!((resolved.max_area - 5000.0 * 1.3 * 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_explicit_bounds_are_not_widened() {
        let config = SubdivisionConfig::from_json(&json!({
            "parcel_type": "commercial", "min_area": 300.0, "max_area": 600.0
        }))
        .unwrap();
        let resolved = config.resolve(100_000.0, None).unwrap();
        assert_eq!((resolved.min_area, resolved.max_area), (300.0, 600.0));
    }

    #[test]
    fn test_percentages_are_clamped() {
        let config = SubdivisionConfig::from_json(&json!({
            "road_access_percentage": 150.0, "corner_lot_ratio": -5.0
        }))
        .unwrap();
        let resolved = config.resolve(100_000.0, None).unwrap();
        assert_eq!(resolved.road_access_percentage, 100.0);
        assert_eq!(resolved.corner_lot_ratio, 0.0);
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let config =
            SubdivisionConfig::from_json(&json!({"min_area": 500.0, "max_area": 100.0})).unwrap();
        assert!(matches!(
            config.resolve(100_000.0, None),
            Err(SiteError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_unknown_method_rejected() {
        assert!(SubdivisionConfig::from_json(&json!({"method": "hexagonal"})).is_err());
    }
}
