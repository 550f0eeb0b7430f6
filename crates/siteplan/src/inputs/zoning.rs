//! Zone types and zoning overlays.

use std::fmt;

use geo::{BoundingRect, Contains, Coord, MultiPolygon, Point, Rect};
use serde::{Deserialize, Serialize};

use crate::error::{SiteError, SkipReport};
use crate::geometry::multipolygon_from_json;

/// Land-use classification of a parcel or zoning overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum ZoneType {
    #[default]
    Residential,
    Commercial,
    Industrial,
    MixedUse,
    Institutional,
    Recreational,
    Agricultural,
    Conservation,
}

impl ZoneType {
    pub const ALL: [ZoneType; 8] = [
        ZoneType::Residential,
        ZoneType::Commercial,
        ZoneType::Industrial,
        ZoneType::MixedUse,
        ZoneType::Institutional,
        ZoneType::Recreational,
        ZoneType::Agricultural,
        ZoneType::Conservation,
    ];

    /// Parse a zone name, accepting snake_case, camelCase, kebab-case and a
    /// few common synonyms.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut normalized = String::with_capacity(raw.len() + 4);
        let mut prev_lower = false;
        for ch in raw.trim().chars() {
            if ch.is_ascii_uppercase() && prev_lower {
                normalized.push('_');
            }
            prev_lower = ch.is_ascii_lowercase();
            match ch {
                '-' | ' ' => normalized.push('_'),
                _ => normalized.push(ch.to_ascii_lowercase()),
            }
        }
        match normalized.as_str() {
            "residential" | "housing" | "residential_low" | "residential_high" => {
                Some(ZoneType::Residential)
            }
            "commercial" | "retail" | "office" => Some(ZoneType::Commercial),
            "industrial" | "manufacturing" => Some(ZoneType::Industrial),
            "mixed_use" | "mixed" => Some(ZoneType::MixedUse),
            "institutional" | "civic" | "public" => Some(ZoneType::Institutional),
            "recreational" | "recreation" | "park" | "green_space" | "open_space" => {
                Some(ZoneType::Recreational)
            }
            "agricultural" | "agriculture" | "farm" => Some(ZoneType::Agricultural),
            "conservation" | "protected" | "preserve" => Some(ZoneType::Conservation),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ZoneType::Residential => "residential",
            ZoneType::Commercial => "commercial",
            ZoneType::Industrial => "industrial",
            ZoneType::MixedUse => "mixed_use",
            ZoneType::Institutional => "institutional",
            ZoneType::Recreational => "recreational",
            ZoneType::Agricultural => "agricultural",
            ZoneType::Conservation => "conservation",
        }
    }

    pub fn is_residential(self) -> bool {
        matches!(self, ZoneType::Residential | ZoneType::MixedUse)
    }

    /// Zones that must not be subdivided into building parcels.
    pub fn is_developable(self) -> bool {
        !matches!(self, ZoneType::Conservation)
    }
}

impl fmt::Display for ZoneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for ZoneType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ZoneType::parse(&value).ok_or_else(|| format!("unknown zone type `{value}`"))
    }
}

/// A single zoning overlay polygon.
#[derive(Debug, Clone)]
pub struct Zone {
    pub zone_type: ZoneType,
    pub geometry: MultiPolygon<f64>,
    bounds: Option<Rect<f64>>,
}

impl Zone {
    pub fn new(zone_type: ZoneType, geometry: MultiPolygon<f64>) -> Self {
        let bounds = geometry.bounding_rect();
        Self {
            zone_type,
            geometry,
            bounds,
        }
    }

    pub fn contains(&self, coord: Coord<f64>) -> bool {
        let Some(bounds) = self.bounds else {
            return false;
        };
        let inside_bounds = coord.x >= bounds.min().x
            && coord.x <= bounds.max().x
            && coord.y >= bounds.min().y
            && coord.y <= bounds.max().y;
        let point = Point::from(coord);
        inside_bounds && self.geometry.0.iter().any(|p| p.contains(&point))
    }
}

/// Optional zoning layer: `{zones: [{geometry, type}]}`.
#[derive(Debug, Clone, Default)]
pub struct ZoningData {
    pub zones: Vec<Zone>,
}

impl ZoningData {
    /// Parse the zoning dictionary. Individual zones with bad geometry or an
    /// unknown type are skipped and recorded in `report`.
    pub fn from_json(value: &serde_json::Value, report: &mut SkipReport) -> Result<Self, SiteError> {
        let zones_json = value
            .get("zones")
            .and_then(|z| z.as_array())
            .ok_or_else(|| SiteError::InvalidConfig("zoning data needs a `zones` array".to_string()))?;

        let mut zones = Vec::with_capacity(zones_json.len());
        for (i, raw) in zones_json.iter().enumerate() {
            let type_name = ["type", "zone_type", "zoneType"]
                .iter()
                .find_map(|key| raw.get(*key).and_then(|v| v.as_str()));
            let Some(zone_type) = type_name.and_then(ZoneType::parse) else {
                report.record("zoning", i, &"missing or unknown zone type");
                continue;
            };
            let Some(geometry_json) = raw.get("geometry") else {
                report.record("zoning", i, &"zone has no geometry");
                continue;
            };
            match multipolygon_from_json(geometry_json) {
                Ok(geometry) => zones.push(Zone::new(zone_type, geometry)),
                Err(e) => report.record("zoning", i, &e),
            }
        }
        Ok(Self { zones })
    }

    /// Zone type of the first zone containing `coord`.
    pub fn zone_at(&self, coord: Coord<f64>) -> Option<ZoneType> {
        self.zones
            .iter()
            .find(|zone| zone.contains(coord))
            .map(|zone| zone.zone_type)
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}
