//! Traffic capacity, demand and Level of Service.
//!
//! Grades follow the HCM convention with site-planning thresholds:
//! - A: free flow (v/c < 0.30)
//! - B: stable flow (v/c < 0.50)
//! - C: stable flow, some restriction (v/c < 0.70)
//! - D: approaching unstable (v/c < 0.85)
//! - E: unstable flow (v/c < 1.00)
//! - F: forced flow / breakdown (v/c >= 1.00)
//!
//! The network grade comes from peak-hour traffic (a fixed share of total
//! capacity) over capacity. Parcel demand, one peak-hour trip per parcel
//! assigned to the parcel's nearest vehicular segment, is graded separately
//! and drives the per-segment distribution. Without parcels the peak-hour
//! share stands in for demand.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::config::{
    AVERAGE_TRIP_KM, DAILY_CAPACITY_FACTOR, DAYS_PER_YEAR, PEAK_HOUR_FACTOR, TRIPS_PER_PARCEL,
};
use crate::coordinate_frame::CoordinateFrame;
use crate::parcels::Parcel;
use crate::roads::{RoadNetwork, SegmentId};

use super::RoadLocator;

/// Level of Service grade from A (best) to F (worst).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
pub enum LosGrade {
    #[default]
    A,
    B,
    C,
    D,
    E,
    F,
}

impl LosGrade {
    pub const ALL: [LosGrade; 6] = [
        LosGrade::A,
        LosGrade::B,
        LosGrade::C,
        LosGrade::D,
        LosGrade::E,
        LosGrade::F,
    ];

    /// Convert a volume-to-capacity ratio to a LOS grade.
    pub fn from_vc_ratio(vc: f64) -> Self {
        if vc < 0.3 {
            LosGrade::A
        } else if vc < 0.5 {
            LosGrade::B
        } else if vc < 0.7 {
            LosGrade::C
        } else if vc < 0.85 {
            LosGrade::D
        } else if vc < 1.0 {
            LosGrade::E
        } else {
            LosGrade::F
        }
    }

    /// Grade for `demand` on `capacity`; zero capacity is F under any load.
    pub fn from_demand(demand: f64, capacity: f64) -> Self {
        if capacity > 0.0 {
            Self::from_vc_ratio(demand / capacity)
        } else if demand > 0.0 {
            LosGrade::F
        } else {
            LosGrade::A
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LosGrade::A => "LOS A (Free Flow)",
            LosGrade::B => "LOS B (Stable Flow)",
            LosGrade::C => "LOS C (Restricted Flow)",
            LosGrade::D => "LOS D (Approaching Unstable)",
            LosGrade::E => "LOS E (Unstable Flow)",
            LosGrade::F => "LOS F (Breakdown)",
        }
    }

    pub fn is_congested(self) -> bool {
        matches!(self, LosGrade::E | LosGrade::F)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TrafficAnalysis {
    /// Vehicles per hour over all vehicular segments.
    pub total_capacity_vph: f64,
    pub peak_hour_traffic_vph: f64,
    pub daily_capacity: f64,
    /// Peak-hour traffic over total capacity; `None` when there is no
    /// capacity.
    pub volume_capacity_ratio: Option<f64>,
    pub level_of_service: LosGrade,
    pub level_of_service_label: &'static str,
    /// Parcel trips in the peak hour, or the peak-hour traffic without
    /// parcels.
    pub peak_hour_demand: f64,
    pub parcel_demand_vc_ratio: Option<f64>,
    pub parcel_demand_los: LosGrade,
    pub daily_trips: f64,
    /// Length-weighted design speed.
    pub average_speed_kmh: f64,
    pub intersection_count: usize,
    pub los_distribution: BTreeMap<LosGrade, usize>,
    /// Share of vehicular segments at LOS E or F.
    pub congested_percentage: f64,
    pub annual_vehicle_km: f64,
}

impl TrafficAnalysis {
    pub fn compute(
        network: &RoadNetwork,
        parcels: &[Parcel],
        frame: &CoordinateFrame,
        intersection_count: usize,
    ) -> Self {
        let total_capacity_vph = network.vehicular().fold(0.0, |acc, s| acc + s.estimated_capacity());
        let peak_hour_traffic_vph = total_capacity_vph * PEAK_HOUR_FACTOR;
        let peak_hour_demand = if parcels.is_empty() {
            peak_hour_traffic_vph
        } else {
            parcels.len() as f64 * TRIPS_PER_PARCEL
        };
        let daily_trips = peak_hour_demand * DAILY_CAPACITY_FACTOR;

        let (length_km, weighted_speed) = network
            .vehicular()
            .fold((0.0, 0.0), |(len, speed), s| {
                (len + s.length_km(), speed + s.tier.speed_kmh() * s.length_km())
            });

        let has_capacity = total_capacity_vph > 0.0;
        let volume_capacity_ratio = has_capacity.then(|| peak_hour_traffic_vph / total_capacity_vph);
        let parcel_demand_vc_ratio = has_capacity.then(|| peak_hour_demand / total_capacity_vph);
        let los_distribution = segment_grades(network, parcels, frame);
        let segment_total: usize = los_distribution.values().sum();
        let congested: usize = los_distribution
            .iter()
            .filter(|(grade, _)| grade.is_congested())
            .map(|(_, n)| n)
            .sum();
        let level_of_service = LosGrade::from_demand(peak_hour_traffic_vph, total_capacity_vph);

        Self {
            total_capacity_vph,
            peak_hour_traffic_vph,
            daily_capacity: total_capacity_vph * DAILY_CAPACITY_FACTOR,
            volume_capacity_ratio,
            level_of_service,
            level_of_service_label: level_of_service.label(),
            peak_hour_demand,
            parcel_demand_vc_ratio,
            parcel_demand_los: LosGrade::from_demand(peak_hour_demand, total_capacity_vph),
            daily_trips,
            average_speed_kmh: if length_km > 0.0 {
                weighted_speed / length_km
            } else {
                0.0
            },
            intersection_count,
            los_distribution,
            congested_percentage: if segment_total > 0 {
                congested as f64 / segment_total as f64 * 100.0
            } else {
                0.0
            },
            annual_vehicle_km: daily_trips * DAYS_PER_YEAR * AVERAGE_TRIP_KM,
        }
    }
}

/// LOS grade count over vehicular segments. Every grade is present.
fn segment_grades(network: &RoadNetwork, parcels: &[Parcel], frame: &CoordinateFrame) -> BTreeMap<LosGrade, usize> {
    let mut distribution: BTreeMap<LosGrade, usize> = LosGrade::ALL.iter().map(|&g| (g, 0)).collect();

    let mut demand: HashMap<SegmentId, f64> = HashMap::new();
    if !parcels.is_empty() {
        let locator = RoadLocator::vehicular(network, *frame);
        for parcel in parcels {
            if let Some((segment, _)) = locator.nearest(parcel.centroid) {
                *demand.entry(segment.id).or_insert(0.0) += TRIPS_PER_PARCEL;
            }
        }
    }

    for segment in network.vehicular() {
        let capacity = segment.estimated_capacity();
        let load = if parcels.is_empty() {
            capacity * PEAK_HOUR_FACTOR
        } else {
            demand.get(&segment.id).copied().unwrap_or(0.0)
        };
        *distribution
            .entry(LosGrade::from_demand(load, capacity))
            .or_insert(0) += 1;
    }
    distribution
}
