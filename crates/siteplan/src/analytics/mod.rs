//! Network analytics: pure functions from a designed network (plus the
//! parcels it serves and the site area) to reportable statistics.

pub mod accessibility;
pub mod cost;
pub mod environmental;
pub mod hierarchy;
pub mod network_stats;
pub mod safety;
pub mod traffic;

#[cfg(test)]
mod tests;

pub use accessibility::AccessibilityAnalysis;
pub use cost::{CostAnalysis, FeatureCosts};
pub use environmental::EnvironmentalAnalysis;
pub use hierarchy::HierarchyViolation;
pub use network_stats::{NetworkStatistics, NodeDegreeStats};
pub use safety::{SafetyAnalysis, SafetyRating};
pub use traffic::{LosGrade, TrafficAnalysis};

use geo::{BoundingRect, Coord, Rect};
use serde::Serialize;

use crate::cancel::CancelToken;
use crate::coordinate_frame::CoordinateFrame;
use crate::error::SiteError;
use crate::geometry::{closest_point_on, SpatialIndex};
use crate::inputs::DesignParameters;
use crate::parcels::Parcel;
use crate::roads::{RoadNetwork, RoadSegment};

/// Everything the analytics read.
#[derive(Clone, Copy)]
pub struct AnalysisInput<'a> {
    pub network: &'a RoadNetwork,
    pub parcels: &'a [Parcel],
    pub area_hectares: f64,
    pub frame: CoordinateFrame,
    pub params: &'a DesignParameters,
}

/// All analytics for one design.
#[derive(Debug, Clone, Serialize)]
pub struct NetworkAnalysis {
    pub network_statistics: NetworkStatistics,
    pub traffic_analysis: TrafficAnalysis,
    pub accessibility_analysis: AccessibilityAnalysis,
    pub cost_analysis: CostAnalysis,
    pub environmental_analysis: EnvironmentalAnalysis,
    pub safety_analysis: SafetyAnalysis,
}

pub fn analyze(input: AnalysisInput<'_>, cancel: &CancelToken) -> Result<NetworkAnalysis, SiteError> {
    let network_statistics = NetworkStatistics::compute(input.network, &input.frame, input.area_hectares, cancel)?;
    let traffic_analysis = TrafficAnalysis::compute(
        input.network,
        input.parcels,
        &input.frame,
        network_statistics.intersection_count,
    );
    let accessibility_analysis = AccessibilityAnalysis::compute(
        input.network,
        input.parcels,
        &input.frame,
        input.params.max_distance_to_road,
        input.params.limits.accessibility_sample,
    );
    let cost_analysis = CostAnalysis::compute(
        input.network,
        input.params,
        input.parcels.len(),
        input.area_hectares,
    );
    let environmental_analysis = EnvironmentalAnalysis::compute(
        input.network,
        input.params,
        input.area_hectares,
        traffic_analysis.annual_vehicle_km,
    );
    let safety_analysis = SafetyAnalysis::compute(
        input.network,
        &network_statistics,
        traffic_analysis.annual_vehicle_km,
        input.params,
    );
    Ok(NetworkAnalysis {
        network_statistics,
        traffic_analysis,
        accessibility_analysis,
        cost_analysis,
        environmental_analysis,
        safety_analysis,
    })
}

// ---------------------------------------------------------------------------
// Nearest-road lookup
// ---------------------------------------------------------------------------

/// Nearest vehicular segment to a point, through an R-tree of segment
/// bounding boxes searched with a doubling radius in meters.
pub(crate) struct RoadLocator<'a> {
    segments: Vec<&'a RoadSegment>,
    index: SpatialIndex,
    frame: CoordinateFrame,
    /// Extent of all segments in meters; beyond it a full scan is cheaper
    /// than more queries.
    extent_m: f64,
}

/// First search radius in meters.
const LOCATOR_START_RADIUS_M: f64 = 25.0;

impl<'a> RoadLocator<'a> {
    pub fn vehicular(network: &'a RoadNetwork, frame: CoordinateFrame) -> Self {
        let segments: Vec<&RoadSegment> = network.vehicular().collect();
        let rects: Vec<(usize, Rect<f64>)> = segments
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.geometry.bounding_rect().map(|r| (i, r)))
            .collect();
        let extent_m = rects
            .iter()
            .map(|(_, r)| *r)
            .reduce(|a, b| {
                Rect::new(
                    Coord {
                        x: a.min().x.min(b.min().x),
                        y: a.min().y.min(b.min().y),
                    },
                    Coord {
                        x: a.max().x.max(b.max().x),
                        y: a.max().y.max(b.max().y),
                    },
                )
            })
            .map_or(0.0, |r| {
                let (w, h) = frame.extent_m(&r);
                w.max(h)
            });
        Self {
            segments,
            index: SpatialIndex::bulk_load(rects),
            frame,
            extent_m,
        }
    }

    fn distance_to(&self, i: usize, point: Coord<f64>) -> Option<(usize, f64)> {
        let closest = closest_point_on(&self.segments[i].geometry, point)?;
        Some((i, self.frame.distance_m(point, closest)))
    }

    /// Nearest segment and its distance in meters.
    pub fn nearest(&self, point: Coord<f64>) -> Option<(&'a RoadSegment, f64)> {
        let mut radius_m = LOCATOR_START_RADIUS_M;
        while radius_m <= self.extent_m {
            let found = self
                .index
                .query_around_xy(Rect::new(point, point), self.frame.axis_margins(radius_m))
                .into_iter()
                .filter_map(|i| self.distance_to(i, point))
                .min_by(|a, b| a.1.total_cmp(&b.1));
            if let Some((i, distance_m)) = found {
                // Anything closer has its bounding box inside the radius.
                if distance_m <= radius_m {
                    return Some((self.segments[i], distance_m));
                }
            }
            radius_m *= 2.0;
        }
        (0..self.segments.len())
            .filter_map(|i| self.distance_to(i, point))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, d)| (self.segments[i], d))
    }
}
