use geo::{Coord, Polygon};
use serde::Serialize;

use crate::inputs::ZoneType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ParcelId(pub u32);

/// Where a parcel's geometry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParcelSource {
    /// Grid cell at (row, col). `part` distinguishes pieces of a cell split by
    /// the boundary.
    GridCell { row: u32, col: u32, part: u32 },
    /// Voronoi cell of the seed with this index.
    VoronoiCell { seed: u32, part: u32 },
    /// Feature at this index of a caller-supplied parcel collection.
    Imported { feature: u32 },
}

/// A clipped cell before measurement and tagging.
#[derive(Debug, Clone)]
pub struct CellCandidate {
    pub geometry: Polygon<f64>,
    pub source: ParcelSource,
    pub area_m2: f64,
}

/// A subdivided piece of the site.
#[derive(Debug, Clone)]
pub struct Parcel {
    pub id: ParcelId,
    pub source: ParcelSource,
    pub geometry: Polygon<f64>,
    pub centroid: Coord<f64>,
    pub area_m2: f64,
    pub perimeter_m: f64,
    pub zone_type: ZoneType,
    pub is_corner_lot: bool,
    pub has_road_access: bool,
}
