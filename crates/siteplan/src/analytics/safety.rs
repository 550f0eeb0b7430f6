//! Safety assessment: intersection density, hierarchy completeness and an
//! exposure-based crash estimate, combined into a 0-100 score.

use std::fmt;

use serde::Serialize;

use crate::config::{CRASHES_PER_MILLION_VKM, HIGH_INTERSECTION_DENSITY};
use crate::inputs::DesignParameters;
use crate::roads::{RoadNetwork, RoadTier};

use super::NetworkStatistics;

/// Tiers a complete vehicular hierarchy is expected to carry.
const HIERARCHY_TIERS: [RoadTier; 3] = [RoadTier::Primary, RoadTier::Secondary, RoadTier::Local];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyRating {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl SafetyRating {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::Excellent
        } else if score >= 60.0 {
            Self::Good
        } else if score >= 40.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
        }
    }
}

impl fmt::Display for SafetyRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SafetyAnalysis {
    /// Intersections per km of vehicular road.
    pub intersection_density: f64,
    /// Share of primary/secondary/local tiers present, 0-100.
    pub hierarchy_score: f64,
    pub estimated_annual_crashes: f64,
    pub safety_score: f64,
    pub rating: SafetyRating,
    pub recommendations: Vec<String>,
}

impl SafetyAnalysis {
    pub fn compute(
        network: &RoadNetwork,
        stats: &NetworkStatistics,
        annual_vehicle_km: f64,
        params: &DesignParameters,
    ) -> Self {
        let intersection_density = if stats.total_road_length_km > 0.0 {
            stats.intersection_count as f64 / stats.total_road_length_km
        } else {
            0.0
        };
        let missing: Vec<RoadTier> = HIERARCHY_TIERS
            .iter()
            .copied()
            .filter(|&t| network.tier_count(t) == 0)
            .collect();
        let present = HIERARCHY_TIERS.len() - missing.len();
        let hierarchy_score = present as f64 / HIERARCHY_TIERS.len() as f64 * 100.0;
        let estimated_annual_crashes = annual_vehicle_km / 1_000_000.0 * CRASHES_PER_MILLION_VKM;

        let safety_score = (100.0 - 10.0 * intersection_density + 0.3 * hierarchy_score
            - 2.0 * estimated_annual_crashes)
            .clamp(0.0, 100.0);

        let mut recommendations = Vec::new();
        if intersection_density > HIGH_INTERSECTION_DENSITY {
            recommendations.push(format!(
                "Reduce intersection density ({intersection_density:.1}/km); consider fewer cross streets"
            ));
        }
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(|t| t.as_str()).collect();
            recommendations.push(format!(
                "Complete the road hierarchy; missing tiers: {}",
                names.join(", ")
            ));
        }
        if estimated_annual_crashes > 1.0 {
            recommendations.push(format!(
                "Add traffic calming; estimated {estimated_annual_crashes:.1} crashes per year"
            ));
        }
        if !stats.hierarchy_violations.is_empty() {
            recommendations.push(format!(
                "Resolve {} hierarchy violations where roads skip levels",
                stats.hierarchy_violations.len()
            ));
        }
        if !params.sidewalks {
            recommendations.push("Add sidewalks to separate pedestrians from traffic".to_string());
        }
        if safety_score < 60.0 {
            recommendations.push("Review the layout with a road safety audit".to_string());
        }

        Self {
            intersection_density,
            hierarchy_score,
            estimated_annual_crashes,
            safety_score,
            rating: SafetyRating::from_score(safety_score),
            recommendations,
        }
    }
}
