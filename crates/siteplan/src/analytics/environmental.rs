//! Environmental footprint of the road network.
//!
//! Score (0-100): `100 - 2 * impervious% - min(50, annual CO2 t / 10)`.
//! Net sequestration never lifts the score above 100.

use serde::Serialize;

use crate::config::{
    CONSTRUCTION_CO2_TONNES_PER_KM, OPERATION_CO2_KG_PER_VEHICLE_KM, SQUARE_METERS_PER_HECTARE,
    TREE_SEQUESTRATION_KG_PER_YEAR,
};
use crate::inputs::DesignParameters;
use crate::roads::{RoadNetwork, RoadTier};

use super::cost::street_tree_count;

#[derive(Debug, Clone, Serialize)]
pub struct EnvironmentalAnalysis {
    /// Paved area, excluding emergency routes that reuse carriageway.
    pub impervious_area_m2: f64,
    pub impervious_percentage: f64,
    pub construction_co2_tonnes: f64,
    pub annual_operation_co2_tonnes: f64,
    pub annual_sequestration_tonnes: f64,
    /// Operation minus sequestration.
    pub annual_co2_tonnes: f64,
    pub street_trees: f64,
    /// Floored at zero. Net sequestration can lift it slightly above 100.
    pub environmental_score: f64,
}

impl EnvironmentalAnalysis {
    pub fn compute(
        network: &RoadNetwork,
        params: &DesignParameters,
        area_hectares: f64,
        annual_vehicle_km: f64,
    ) -> Self {
        let impervious_area_m2: f64 = network
            .segments()
            .iter()
            .filter(|s| s.tier != RoadTier::Emergency)
            .fold(0.0, |acc, s| acc + s.width_m * s.length_m);
        let site_m2 = area_hectares * SQUARE_METERS_PER_HECTARE;
        let impervious_percentage = if site_m2 > 0.0 {
            impervious_area_m2 / site_m2 * 100.0
        } else {
            0.0
        };

        let vehicular_km: f64 = RoadTier::VEHICULAR
            .iter()
            .map(|&t| network.tier_length_km(t))
            .sum();
        let street_trees = if params.street_trees {
            street_tree_count(vehicular_km)
        } else {
            0.0
        };
        let annual_operation_co2_tonnes = annual_vehicle_km * OPERATION_CO2_KG_PER_VEHICLE_KM / 1000.0;
        let annual_sequestration_tonnes = street_trees * TREE_SEQUESTRATION_KG_PER_YEAR / 1000.0;
        let annual_co2_tonnes = annual_operation_co2_tonnes - annual_sequestration_tonnes;

        let score = 100.0 - 2.0 * impervious_percentage - (annual_co2_tonnes / 10.0).min(50.0);
        Self {
            impervious_area_m2,
            impervious_percentage,
            construction_co2_tonnes: vehicular_km * CONSTRUCTION_CO2_TONNES_PER_KM,
            annual_operation_co2_tonnes,
            annual_sequestration_tonnes,
            annual_co2_tonnes,
            street_trees,
            environmental_score: score.max(0.0),
        }
    }
}
