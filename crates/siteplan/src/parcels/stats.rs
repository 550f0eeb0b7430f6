use std::collections::BTreeMap;

use serde::Serialize;

use crate::coordinate_frame::CoordinateFrame;
use crate::inputs::ResolvedSubdivision;

use super::types::Parcel;

/// Summary of one subdivision, serialized into the response envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ParcelStatistics {
    pub total_parcels: usize,
    pub total_area_m2: f64,
    pub average_area_m2: f64,
    pub min_area_m2: f64,
    pub max_area_m2: f64,
    pub site_area_m2: f64,
    /// Parcel area over site area.
    pub coverage_ratio: f64,
    pub corner_lots: usize,
    pub road_access_parcels: usize,
    pub zone_distribution: BTreeMap<String, usize>,
    pub method: String,
    pub target_parcel_area: f64,
    pub min_area: f64,
    pub max_area: f64,
    pub coordinate_frame: CoordinateFrame,
    pub skipped_items: usize,
    pub rejected_cells: usize,
}

impl ParcelStatistics {
    pub fn compute(
        parcels: &[Parcel],
        site_area_m2: f64,
        method: &str,
        settings: &ResolvedSubdivision,
        frame: CoordinateFrame,
        skipped_items: usize,
        rejected_cells: usize,
    ) -> Self {
        let total_area_m2 = parcels.iter().fold(0.0, |acc, p| acc + p.area_m2);
        let (min_area_m2, max_area_m2) = if parcels.is_empty() {
            (0.0, 0.0)
        } else {
            parcels.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.area_m2), hi.max(p.area_m2))
            })
        };
        let mut zone_distribution = BTreeMap::new();
        for parcel in parcels {
            *zone_distribution
                .entry(parcel.zone_type.as_str().to_string())
                .or_insert(0) += 1;
        }

        Self {
            total_parcels: parcels.len(),
            total_area_m2,
            average_area_m2: if parcels.is_empty() {
                0.0
            } else {
                total_area_m2 / parcels.len() as f64
            },
            min_area_m2,
            max_area_m2,
            site_area_m2,
            coverage_ratio: if site_area_m2 > 0.0 {
                total_area_m2 / site_area_m2
            } else {
                0.0
            },
            corner_lots: parcels.iter().filter(|p| p.is_corner_lot).count(),
            road_access_parcels: parcels.iter().filter(|p| p.has_road_access).count(),
            zone_distribution,
            method: method.to_string(),
            target_parcel_area: settings.target_parcel_area,
            min_area: settings.min_area,
            max_area: settings.max_area,
            coordinate_frame: frame,
            skipped_items,
            rejected_cells,
        }
    }
}
