//! Terrain summary consumed from the external DEM analysis.
//!
//! Only the pieces the layout engines act on are kept: the average slope
//! (which widens parcel area bounds) and polygons flagged as unsuitable for
//! building (flood zones, steep escarpments).

use geo::{Contains, Coord, Intersects, LineString, MultiPolygon, Point};
use serde::Deserialize;

use crate::config::STEEP_SLOPE_DEG;
use crate::error::{SiteError, SkipReport};
use crate::geometry::multipolygon_from_json;

/// Slope statistics in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SlopeSummary {
    #[serde(alias = "mean", alias = "avg")]
    pub average: f64,
    #[serde(alias = "max")]
    pub maximum: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawTerrain {
    slope: Option<SlopeSummary>,
    #[serde(alias = "averageSlope")]
    average_slope: Option<f64>,
    #[serde(
        alias = "unsuitableAreas",
        alias = "flood_zones",
        alias = "floodZones"
    )]
    unsuitable_areas: Vec<serde_json::Value>,
}

/// Optional terrain input.
#[derive(Debug, Clone, Default)]
pub struct TerrainData {
    pub slope: Option<SlopeSummary>,
    pub unsuitable_areas: Vec<MultiPolygon<f64>>,
}

impl TerrainData {
    pub fn from_json(value: &serde_json::Value, report: &mut SkipReport) -> Result<Self, SiteError> {
        let raw: RawTerrain = serde_json::from_value(super::or_empty_object(value))?;
        let slope = raw.slope.or_else(|| {
            raw.average_slope.map(|average| SlopeSummary {
                average,
                maximum: None,
            })
        });

        let mut unsuitable_areas = Vec::with_capacity(raw.unsuitable_areas.len());
        for (i, area) in raw.unsuitable_areas.iter().enumerate() {
            match multipolygon_from_json(area) {
                Ok(geometry) => unsuitable_areas.push(geometry),
                Err(e) => report.record("terrain", i, &e),
            }
        }
        Ok(Self {
            slope,
            unsuitable_areas,
        })
    }

    pub fn average_slope(&self) -> Option<f64> {
        self.slope.map(|s| s.average)
    }

    /// Average slope above the steep-terrain threshold.
    pub fn is_steep(&self) -> bool {
        self.average_slope().is_some_and(|s| s > STEEP_SLOPE_DEG)
    }

    pub fn is_unsuitable(&self, coord: Coord<f64>) -> bool {
        let point = Point::from(coord);
        self.unsuitable_areas
            .iter()
            .any(|area| area.0.iter().any(|p| p.contains(&point)))
    }

    pub fn crosses_unsuitable(&self, line: &LineString<f64>) -> bool {
        self.unsuitable_areas
            .iter()
            .any(|area| area.0.iter().any(|p| line.intersects(p)))
    }
}
