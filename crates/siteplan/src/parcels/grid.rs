//! Rectangular grid subdivision.
//!
//! The nominal cell size is `sqrt(target * aspect)` with `aspect` the site's
//! width/height ratio in meters. The bounding box is cut into
//! `floor(extent / cell)` columns and rows (at least one each), every cell is
//! clipped against the boundary, and each resulting piece becomes a candidate.

use geo::{coord, Area};

use crate::cancel::CancelToken;
use crate::config::{EDGE_CELL_MIN_FRACTION, MAX_CELLS};
use crate::coordinate_frame::CoordinateFrame;
use crate::error::{GeometryError, SiteError, SkipReport};
use crate::geometry::{intersect_polygon, rect_polygon, Boundary};
use crate::inputs::ResolvedSubdivision;

use super::types::{CellCandidate, ParcelSource};

/// Row and column counts for a grid over `width_m` x `height_m`.
pub fn grid_dimensions(width_m: f64, height_m: f64, target_area_m2: f64) -> (usize, usize) {
    let aspect = if height_m > 0.0 { width_m / height_m } else { 1.0 };
    let cell = (target_area_m2 * aspect).sqrt();
    let count = |extent: f64| {
        let raw = (extent / cell).floor();
        if raw.is_finite() && raw >= 1.0 {
            raw as usize
        } else {
            1
        }
    };
    (count(height_m), count(width_m))
}

pub(crate) fn grid_cells(
    boundary: &Boundary,
    frame: &CoordinateFrame,
    settings: &ResolvedSubdivision,
    cancel: &CancelToken,
    report: &mut SkipReport,
) -> Result<Vec<CellCandidate>, SiteError> {
    let bounds = boundary.bounds();
    let (width_m, height_m) = frame.extent_m(&bounds);
    let (rows, cols) = grid_dimensions(width_m, height_m, settings.target_parcel_area);
    if rows.saturating_mul(cols) > MAX_CELLS {
        return Err(SiteError::InvalidConfig(format!(
            "target parcel area {} m² would need {} x {} grid cells",
            settings.target_parcel_area, rows, cols
        )));
    }

    let min = bounds.min();
    let step_x = bounds.width() / cols as f64;
    let step_y = bounds.height() / rows as f64;
    let min_piece_m2 = settings.min_area * EDGE_CELL_MIN_FRACTION;

    let mut cells = Vec::new();
    for row in 0..rows {
        cancel.check()?;
        for col in 0..cols {
            let cell = rect_polygon(
                coord! { x: min.x + col as f64 * step_x, y: min.y + row as f64 * step_y },
                coord! { x: min.x + (col + 1) as f64 * step_x, y: min.y + (row + 1) as f64 * step_y },
            );
            let parts = match intersect_polygon(boundary.polygons(), &cell) {
                Ok(parts) => parts,
                // Cells outside a concave boundary are expected.
                Err(GeometryError::EmptyResult) => continue,
                Err(err) => {
                    report.record("grid", row * cols + col, &err);
                    continue;
                }
            };
            for (part, geometry) in parts.into_iter().enumerate() {
                let area_m2 = frame.area_to_m2(geometry.unsigned_area());
                if area_m2 < min_piece_m2 {
                    continue;
                }
                cells.push(CellCandidate {
                    geometry,
                    source: ParcelSource::GridCell {
                        row: row as u32,
                        col: col as u32,
                        part: part as u32,
                    },
                    area_m2,
                });
            }
        }
    }
    Ok(cells)
}
