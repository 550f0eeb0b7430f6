//! Post-processing chain applied to every subdivision result.
//!
//! Each step takes ownership of the parcel list and returns the next one.

use geo::{BoundingRect, Intersects};

use crate::cancel::CancelToken;
use crate::config::CORNER_LOT_MAX_NEIGHBORS;
use crate::coordinate_frame::CoordinateFrame;
use crate::error::{SiteError, SkipReport};
use crate::geometry::{polygon_centroid, SpatialIndex};
use crate::inputs::{ZoneType, ZoningData};

use super::types::{CellCandidate, Parcel, ParcelId};

/// Turn clipped cells into parcels with centroid and metric measurements.
/// Ids are assigned in cell order starting at 1.
pub fn measure(cells: Vec<CellCandidate>, frame: &CoordinateFrame, report: &mut SkipReport) -> Vec<Parcel> {
    let mut parcels = Vec::with_capacity(cells.len());
    for (index, cell) in cells.into_iter().enumerate() {
        let centroid = match polygon_centroid(&cell.geometry) {
            Ok(c) => c,
            Err(err) => {
                report.record("measure", index, &err);
                continue;
            }
        };
        parcels.push(Parcel {
            id: ParcelId(parcels.len() as u32 + 1),
            source: cell.source,
            perimeter_m: frame.perimeter_m(&cell.geometry),
            geometry: cell.geometry,
            centroid,
            area_m2: cell.area_m2,
            zone_type: ZoneType::default(),
            is_corner_lot: false,
            has_road_access: false,
        });
    }
    parcels
}

/// Zone of the containing zone polygon, else `fallback`.
pub fn apply_zoning(mut parcels: Vec<Parcel>, zoning: Option<&ZoningData>, fallback: ZoneType) -> Vec<Parcel> {
    for parcel in &mut parcels {
        parcel.zone_type = zoning
            .and_then(|z| z.zone_at(parcel.centroid))
            .unwrap_or(fallback);
    }
    parcels
}

/// Setback hook. Parcels keep their full geometry.
pub fn apply_setbacks(parcels: Vec<Parcel>) -> Vec<Parcel> {
    parcels
}

/// Keep parcels with `min_area <= area <= max_area` and renumber them.
pub fn filter_by_area(parcels: Vec<Parcel>, min_area: f64, max_area: f64) -> Vec<Parcel> {
    parcels
        .into_iter()
        .filter(|p| p.area_m2 >= min_area && p.area_m2 <= max_area)
        .enumerate()
        .map(|(i, mut p)| {
            p.id = ParcelId(i as u32 + 1);
            p
        })
        .collect()
}

/// Number of parcels whose boundary touches each parcel's boundary.
pub fn touching_neighbor_counts(parcels: &[Parcel], cancel: &CancelToken) -> Result<Vec<usize>, SiteError> {
    let index = SpatialIndex::bulk_load(
        parcels
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.geometry.bounding_rect().map(|r| (i, r))),
    );
    let mut counts = Vec::with_capacity(parcels.len());
    for (i, parcel) in parcels.iter().enumerate() {
        if i % 256 == 0 {
            cancel.check()?;
        }
        let Some(rect) = parcel.geometry.bounding_rect() else {
            counts.push(0);
            continue;
        };
        let count = index
            .query_rect(rect)
            .into_iter()
            .filter(|&j| j != i)
            .filter(|&j| parcel.geometry.exterior().intersects(parcels[j].geometry.exterior()))
            .count();
        counts.push(count);
    }
    Ok(counts)
}

/// Tag corner lots. A parcel with at most two touching neighbours is a corner
/// lot; if that yields fewer than `ratio`% of parcels, the lowest-index
/// remaining parcels are tagged until the target is met.
pub fn assign_corner_lots(
    mut parcels: Vec<Parcel>,
    ratio: f64,
    cancel: &CancelToken,
) -> Result<Vec<Parcel>, SiteError> {
    let counts = touching_neighbor_counts(&parcels, cancel)?;
    for (parcel, count) in parcels.iter_mut().zip(counts) {
        parcel.is_corner_lot = count <= CORNER_LOT_MAX_NEIGHBORS;
    }

    let target = percentage_of(parcels.len(), ratio);
    let mut tagged = parcels.iter().filter(|p| p.is_corner_lot).count();
    for parcel in &mut parcels {
        if tagged >= target {
            break;
        }
        if !parcel.is_corner_lot {
            parcel.is_corner_lot = true;
            tagged += 1;
        }
    }
    Ok(parcels)
}

/// The first `percentage`% of parcels by index get road access.
pub fn assign_road_access(mut parcels: Vec<Parcel>, percentage: f64) -> Vec<Parcel> {
    let count = percentage_of(parcels.len(), percentage);
    for (i, parcel) in parcels.iter_mut().enumerate() {
        parcel.has_road_access = i < count;
    }
    parcels
}

/// `floor(len * pct / 100)`, clamped to `len`.
pub fn percentage_of(len: usize, percentage: f64) -> usize {
    let raw = (len as f64 * percentage / 100.0).floor();
    if raw.is_finite() && raw > 0.0 {
        (raw as usize).min(len)
    } else {
        0
    }
}
