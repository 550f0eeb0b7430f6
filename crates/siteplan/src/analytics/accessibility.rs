use serde::Serialize;

use crate::coordinate_frame::CoordinateFrame;
use crate::parcels::Parcel;
use crate::roads::RoadNetwork;

use super::RoadLocator;

/// Distance from sampled parcels to the nearest vehicular road.
#[derive(Debug, Clone, Serialize)]
pub struct AccessibilityAnalysis {
    pub sampled_parcels: usize,
    pub accessible_parcels: usize,
    pub threshold_m: f64,
    pub average_distance_m: f64,
    pub max_distance_m: f64,
    /// Accessible share of the sample, 0-100.
    pub accessibility_score: f64,
}

impl AccessibilityAnalysis {
    /// Sample the first `sample` parcels; a parcel is accessible when its
    /// centroid is closer than `threshold_m` to a road.
    pub fn compute(
        network: &RoadNetwork,
        parcels: &[Parcel],
        frame: &CoordinateFrame,
        threshold_m: f64,
        sample: usize,
    ) -> Self {
        let locator = RoadLocator::vehicular(network, *frame);
        let sampled: Vec<&Parcel> = parcels.iter().take(sample).collect();
        let distances: Vec<f64> = sampled
            .iter()
            .filter_map(|p| locator.nearest(p.centroid).map(|(_, d)| d))
            .collect();
        let accessible_parcels = distances.iter().filter(|&&d| d < threshold_m).count();

        Self {
            sampled_parcels: sampled.len(),
            accessible_parcels,
            threshold_m,
            average_distance_m: if distances.is_empty() {
                0.0
            } else {
                distances.iter().sum::<f64>() / distances.len() as f64
            },
            max_distance_m: distances.iter().copied().fold(0.0, f64::max),
            accessibility_score: if sampled.is_empty() {
                0.0
            } else {
                accessible_parcels as f64 / sampled.len() as f64 * 100.0
            },
        }
    }
}
