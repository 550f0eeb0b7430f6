//! Road design parameters.

use serde::{Deserialize, Serialize};

use crate::config::{
    DEFAULT_ACCESSIBILITY_SAMPLE, DEFAULT_BIKE_OVERLAY, DEFAULT_CONNECTOR_PARCELS,
    DEFAULT_LOCAL_PARCELS, DEFAULT_MAX_DISTANCE_TO_ROAD_M, DEFAULT_PEDESTRIAN_OVERLAY,
    DEFAULT_SECONDARY_SPACING_M,
};
use crate::error::SiteError;

/// Which [`PathfindingStrategy`](crate::roads::PathfindingStrategy) routes primary roads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathfindingMode {
    /// Direct segment, or a dog-leg through the footprint center.
    #[default]
    Heuristic,
    /// A* over a rasterized cost field.
    #[serde(alias = "astar", alias = "gridAstar")]
    GridAstar,
}

/// Which [`ConnectionStrategy`](crate::roads::ConnectionStrategy) links parcels to roads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorMode {
    /// Straight link to the nearest existing road vertex.
    #[default]
    Nearest,
    /// Link minimizing link length plus network distance to the hub.
    #[serde(alias = "dijkstra", alias = "shortestPath")]
    ShortestPath,
}

/// Caps on how many items the synthesizer and analytics look at. These bound
/// the pairwise work on very large parcel sets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisLimits {
    #[serde(alias = "connectorParcels")]
    pub connector_parcels: usize,
    #[serde(alias = "localParcels")]
    pub local_parcels: usize,
    #[serde(alias = "pedestrianOverlay")]
    pub pedestrian_overlay: usize,
    #[serde(alias = "bikeOverlay")]
    pub bike_overlay: usize,
    #[serde(alias = "accessibilitySample")]
    pub accessibility_sample: usize,
}

impl Default for SynthesisLimits {
    fn default() -> Self {
        Self {
            connector_parcels: DEFAULT_CONNECTOR_PARCELS,
            local_parcels: DEFAULT_LOCAL_PARCELS,
            pedestrian_overlay: DEFAULT_PEDESTRIAN_OVERLAY,
            bike_overlay: DEFAULT_BIKE_OVERLAY,
            accessibility_sample: DEFAULT_ACCESSIBILITY_SAMPLE,
        }
    }
}

/// Design parameters for the road network and its costed features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignParameters {
    /// Overrides the secondary grid spacing (meters) when set.
    #[serde(alias = "maxBlockSize")]
    pub max_block_size: Option<f64>,
    #[serde(alias = "bikeLanes")]
    pub bike_lanes: bool,
    pub sidewalks: bool,
    pub medians: bool,
    #[serde(alias = "streetTrees")]
    pub street_trees: bool,
    #[serde(alias = "maxDistanceToRoad")]
    pub max_distance_to_road: f64,
    #[serde(alias = "secondarySpacing", alias = "grid_spacing")]
    pub secondary_spacing: f64,
    pub pathfinding: PathfindingMode,
    pub connector: ConnectorMode,
    pub limits: SynthesisLimits,
}

impl Default for DesignParameters {
    fn default() -> Self {
        Self {
            max_block_size: None,
            bike_lanes: true,
            sidewalks: true,
            medians: false,
            street_trees: true,
            max_distance_to_road: DEFAULT_MAX_DISTANCE_TO_ROAD_M,
            secondary_spacing: DEFAULT_SECONDARY_SPACING_M,
            pathfinding: PathfindingMode::default(),
            connector: ConnectorMode::default(),
            limits: SynthesisLimits::default(),
        }
    }
}

impl DesignParameters {
    pub fn from_json(value: &serde_json::Value) -> Result<Self, SiteError> {
        let params: Self = serde_json::from_value(super::or_empty_object(value))?;
        if !(params.max_distance_to_road.is_finite() && params.max_distance_to_road > 0.0) {
            return Err(SiteError::InvalidConfig(
                "max_distance_to_road must be positive".to_string(),
            ));
        }
        if !(params.secondary_spacing.is_finite() && params.secondary_spacing > 0.0) {
            return Err(SiteError::InvalidConfig(
                "secondary_spacing must be positive".to_string(),
            ));
        }
        Ok(params)
    }

    /// Secondary grid spacing in meters.
    pub fn grid_spacing_m(&self) -> f64 {
        match self.max_block_size {
            Some(size) if size.is_finite() && size > 0.0 => size,
            _ => self.secondary_spacing,
        }
    }
}
