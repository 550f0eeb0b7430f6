use std::fmt;

use serde::Serialize;

/// Road tiers produced by the synthesizer, highest hierarchy first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadTier {
    Primary,
    Secondary,
    Local,
    Residential,
    Pedestrian,
    Bike,
    Emergency,
}

impl RoadTier {
    pub const ALL: [RoadTier; 7] = [
        RoadTier::Primary,
        RoadTier::Secondary,
        RoadTier::Local,
        RoadTier::Residential,
        RoadTier::Pedestrian,
        RoadTier::Bike,
        RoadTier::Emergency,
    ];

    /// Tiers that carry motor traffic and count towards network length.
    pub const VEHICULAR: [RoadTier; 4] = [
        RoadTier::Primary,
        RoadTier::Secondary,
        RoadTier::Local,
        RoadTier::Residential,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RoadTier::Primary => "primary",
            RoadTier::Secondary => "secondary",
            RoadTier::Local => "local",
            RoadTier::Residential => "residential",
            RoadTier::Pedestrian => "pedestrian",
            RoadTier::Bike => "bike",
            RoadTier::Emergency => "emergency",
        }
    }

    /// Carriageway width in meters.
    pub fn width_m(self) -> f64 {
        match self {
            RoadTier::Primary => 12.0,
            RoadTier::Secondary => 9.0,
            RoadTier::Local => 6.0,
            RoadTier::Residential => 5.0,
            RoadTier::Pedestrian => 2.0,
            RoadTier::Bike => 1.5,
            RoadTier::Emergency => 6.0, // fire-access lane
        }
    }

    /// Vehicles per hour per km of road.
    pub fn capacity_per_km(self) -> f64 {
        match self {
            RoadTier::Primary => 2000.0,
            RoadTier::Secondary => 1200.0,
            RoadTier::Local => 600.0,
            RoadTier::Residential => 300.0,
            RoadTier::Pedestrian | RoadTier::Bike | RoadTier::Emergency => 0.0,
        }
    }

    /// Design speed in km/h.
    pub fn speed_kmh(self) -> f64 {
        match self {
            RoadTier::Primary => 60.0,
            RoadTier::Secondary => 45.0,
            RoadTier::Local => 30.0,
            RoadTier::Residential => 20.0,
            RoadTier::Pedestrian => 5.0,
            RoadTier::Bike => 15.0,
            RoadTier::Emergency => 0.0,
        }
    }

    /// Construction cost in dollars per km. Emergency routes reuse existing
    /// carriageway and cost nothing extra.
    pub fn cost_per_km(self) -> f64 {
        match self {
            RoadTier::Primary => 500_000.0,
            RoadTier::Secondary => 300_000.0,
            RoadTier::Local => 150_000.0,
            RoadTier::Residential => 100_000.0,
            RoadTier::Pedestrian => 50_000.0,
            RoadTier::Bike => 30_000.0,
            RoadTier::Emergency => 0.0,
        }
    }

    /// Hierarchy level of vehicular tiers. A node joining tiers more than one
    /// level apart is a hierarchy violation.
    pub fn hierarchy_level(self) -> Option<u8> {
        match self {
            RoadTier::Residential => Some(0),
            RoadTier::Local => Some(1),
            RoadTier::Secondary => Some(2),
            RoadTier::Primary => Some(3),
            RoadTier::Pedestrian | RoadTier::Bike | RoadTier::Emergency => None,
        }
    }

    pub fn is_vehicular(self) -> bool {
        self.hierarchy_level().is_some()
    }

    /// Overlay tiers duplicate geometry of other tiers.
    pub fn is_overlay(self) -> bool {
        matches!(
            self,
            RoadTier::Pedestrian | RoadTier::Bike | RoadTier::Emergency
        )
    }
}

impl fmt::Display for RoadTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
