//! Construction, maintenance and lifecycle cost of a road network.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::{
    ANNUAL_MAINTENANCE_RATE, BIKE_LANE_COST_PER_KM, LIFECYCLE_YEARS, MEDIAN_COST_PER_KM,
    SIDEWALK_COST_PER_KM_PER_SIDE, STREET_TREE_COST, STREET_TREE_SPACING_M,
};
use crate::inputs::DesignParameters;
use crate::roads::{RoadNetwork, RoadTier};

/// Optional design features, in dollars. Disabled features cost zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeatureCosts {
    /// Painted lanes along the vehicular network.
    pub bike_lanes: f64,
    /// Both sides of the vehicular network.
    pub sidewalks: f64,
    /// Primary roads only.
    pub medians: f64,
    pub street_trees: f64,
}

impl FeatureCosts {
    pub fn total(&self) -> f64 {
        self.bike_lanes + self.sidewalks + self.medians + self.street_trees
    }
}

/// Street trees planted along `vehicular_km` of road.
pub fn street_tree_count(vehicular_km: f64) -> f64 {
    (vehicular_km * 1000.0 / STREET_TREE_SPACING_M).floor()
}

#[derive(Debug, Clone, Serialize)]
pub struct CostAnalysis {
    pub construction_by_tier: BTreeMap<RoadTier, f64>,
    pub road_construction: f64,
    pub features: FeatureCosts,
    pub total_construction: f64,
    pub annual_maintenance: f64,
    pub lifecycle_cost_10yr: f64,
    pub cost_per_parcel: f64,
    pub cost_per_hectare: f64,
}

impl CostAnalysis {
    pub fn compute(
        network: &RoadNetwork,
        params: &DesignParameters,
        parcel_count: usize,
        area_hectares: f64,
    ) -> Self {
        let construction_by_tier: BTreeMap<RoadTier, f64> = RoadTier::ALL
            .iter()
            .map(|&t| (t, network.tier_length_km(t) * t.cost_per_km()))
            .collect();
        let road_construction: f64 = construction_by_tier.values().sum();

        let vehicular_km: f64 = RoadTier::VEHICULAR
            .iter()
            .map(|&t| network.tier_length_km(t))
            .sum();
        let primary_km = network.tier_length_km(RoadTier::Primary);
        let features = FeatureCosts {
            bike_lanes: if params.bike_lanes {
                vehicular_km * BIKE_LANE_COST_PER_KM
            } else {
                0.0
            },
            sidewalks: if params.sidewalks {
                vehicular_km * SIDEWALK_COST_PER_KM_PER_SIDE * 2.0
            } else {
                0.0
            },
            medians: if params.medians {
                primary_km * MEDIAN_COST_PER_KM
            } else {
                0.0
            },
            street_trees: if params.street_trees {
                street_tree_count(vehicular_km) * STREET_TREE_COST
            } else {
                0.0
            },
        };

        let total_construction = road_construction + features.total();
        let annual_maintenance = total_construction * ANNUAL_MAINTENANCE_RATE;
        Self {
            construction_by_tier,
            road_construction,
            features,
            total_construction,
            annual_maintenance,
            lifecycle_cost_10yr: total_construction + LIFECYCLE_YEARS * annual_maintenance,
            cost_per_parcel: if parcel_count > 0 {
                total_construction / parcel_count as f64
            } else {
                0.0
            },
            cost_per_hectare: if area_hectares > 0.0 {
                total_construction / area_hectares
            } else {
                0.0
            },
        }
    }
}
