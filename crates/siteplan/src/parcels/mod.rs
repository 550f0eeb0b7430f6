//! Parcelization engine.
//!
//! Splits a site boundary into parcels with one of three strategies and then
//! runs a fixed post-processing chain over the result:
//!
//! 1. zoning lookup by centroid (fallback: configured parcel type)
//! 2. setbacks (reserved hook, parcels are not shrunk here)
//! 3. area filter on frame-converted m²
//! 4. corner-lot tagging (≤ 2 touching neighbours, padded up to the ratio)
//! 5. road-access tagging (first N% by index)
//!
//! Order matters: tagging happens after filtering so ratios apply to the
//! parcels that are actually returned.

pub mod grid;
pub mod optimized;
pub mod post_process;
pub mod stats;
pub mod types;
pub mod voronoi;


pub use stats::ParcelStatistics;
pub use types::{CellCandidate, Parcel, ParcelId, ParcelSource};

use tracing::{info, warn};

use crate::cancel::CancelToken;
use crate::coordinate_frame::CoordinateFrame;
use crate::error::{SiteError, SkipReport};
use crate::geometry::Boundary;
use crate::inputs::{ResolvedSubdivision, SubdivisionConfig, SubdivisionMethod, TerrainData, ZoningData};
use crate::site_rng::SiteRng;

/// Finished subdivision of one boundary.
#[derive(Debug, Clone)]
pub struct Subdivision {
    pub parcels: Vec<Parcel>,
    pub statistics: ParcelStatistics,
    pub frame: CoordinateFrame,
    pub settings: ResolvedSubdivision,
    pub skipped: SkipReport,
}

/// Optional collaborator inputs for a subdivision call.
#[derive(Debug, Clone, Copy, Default)]
pub struct SiteContext<'a> {
    pub zoning: Option<&'a ZoningData>,
    pub terrain: Option<&'a TerrainData>,
}

/// Subdivide `boundary` into parcels.
pub fn subdivide(
    boundary: &Boundary,
    config: &SubdivisionConfig,
    context: SiteContext<'_>,
    rng: &mut SiteRng,
    cancel: &CancelToken,
) -> Result<Subdivision, SiteError> {
    let frame = boundary.frame();
    let site_area_m2 = boundary.area_m2(&frame);
    let settings = config.resolve(site_area_m2, context.terrain)?;
    let mut skipped = SkipReport::default();

    let (cells, method_label, rejected_cells) = match settings.method {
        SubdivisionMethod::Grid => {
            let cells = grid::grid_cells(boundary, &frame, &settings, cancel, &mut skipped)?;
            (cells, "grid", 0)
        }
        SubdivisionMethod::Voronoi => {
            match voronoi::voronoi_cells(boundary, &frame, &settings, rng, cancel, &mut skipped)? {
                Some(cells) => (cells, "voronoi", 0),
                None => {
                    warn!("voronoi subdivision unavailable, falling back to grid");
                    let cells = grid::grid_cells(boundary, &frame, &settings, cancel, &mut skipped)?;
                    (cells, "voronoi->grid", 0)
                }
            }
        }
        SubdivisionMethod::Optimized => {
            let cells = grid::grid_cells(boundary, &frame, &settings, cancel, &mut skipped)?;
            let total = cells.len();
            let kept = optimized::reject_unsuitable(cells, context.zoning, context.terrain);
            let rejected = total - kept.len();
            (kept, "optimized", rejected)
        }
    };

    let parcels = post_process::measure(cells, &frame, &mut skipped);
    let parcels = post_process::apply_zoning(parcels, context.zoning, settings.parcel_type);
    let parcels = post_process::apply_setbacks(parcels);
    let parcels = post_process::filter_by_area(parcels, settings.min_area, settings.max_area);
    let parcels = post_process::assign_corner_lots(parcels, settings.corner_lot_ratio, cancel)?;
    let parcels = post_process::assign_road_access(parcels, settings.road_access_percentage);

    let statistics = ParcelStatistics::compute(
        &parcels,
        site_area_m2,
        method_label,
        &settings,
        frame,
        skipped.len(),
        rejected_cells,
    );
    info!(
        "subdivided {:.0} m² site into {} parcels ({})",
        site_area_m2,
        parcels.len(),
        method_label
    );

    Ok(Subdivision {
        parcels,
        statistics,
        frame,
        settings,
        skipped,
    })
}
