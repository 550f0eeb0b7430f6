//! "Optimized" subdivision: the grid, minus cells that cannot be developed.

use crate::geometry::polygon_centroid;
use crate::inputs::{TerrainData, ZoningData};

use super::types::CellCandidate;

/// Drop cells whose centroid lies in a non-developable zone or an unsuitable
/// terrain area.
pub fn reject_unsuitable(
    cells: Vec<CellCandidate>,
    zoning: Option<&ZoningData>,
    terrain: Option<&TerrainData>,
) -> Vec<CellCandidate> {
    cells
        .into_iter()
        .filter(|cell| {
            let Ok(centroid) = polygon_centroid(&cell.geometry) else {
                return true;
            };
            let zone_ok = zoning
                .and_then(|z| z.zone_at(centroid))
                .map_or(true, |zone| zone.is_developable());
            let terrain_ok = terrain.map_or(true, |t| !t.is_unsuitable(centroid));
            zone_ok && terrain_ok
        })
        .collect()
}
