//! Voronoi subdivision.
//!
//! Seeds are rejection-sampled inside the boundary with the call's
//! [`SiteRng`]. Each seed's cell is cut out of an enlarged bounding box by the
//! perpendicular bisectors towards its Delaunay neighbours, then clipped to
//! the boundary. `Ok(None)` means the diagram could not be built and the
//! caller should fall back to the grid.

use geo::{coord, Area, Coord, LineString, Polygon};
use rand::Rng;
use spade::{DelaunayTriangulation, Point2, Triangulation as _};
use tracing::{debug, warn};

use crate::cancel::CancelToken;
use crate::config::{EDGE_CELL_MIN_FRACTION, MAX_CELLS, VORONOI_ATTEMPT_FACTOR, VORONOI_MIN_SEEDS};
use crate::coordinate_frame::CoordinateFrame;
use crate::error::{GeometryError, SiteError, SkipReport};
use crate::geometry::{intersect_polygon, Boundary};
use crate::inputs::ResolvedSubdivision;
use crate::site_rng::SiteRng;

use super::types::{CellCandidate, ParcelSource};

/// Number of seeds for a site of `site_area_m2`.
pub fn seed_count(site_area_m2: f64, target_area_m2: f64) -> usize {
    let raw = (site_area_m2 / target_area_m2).floor();
    if raw.is_finite() && raw > 0.0 {
        (raw as usize).clamp(VORONOI_MIN_SEEDS, MAX_CELLS)
    } else {
        VORONOI_MIN_SEEDS
    }
}

/// Rejection-sample up to `count` points inside the boundary.
pub fn sample_seeds(boundary: &Boundary, count: usize, rng: &mut SiteRng) -> Vec<Coord<f64>> {
    let bounds = boundary.bounds();
    let (min, max) = (bounds.min(), bounds.max());
    let max_attempts = count * VORONOI_ATTEMPT_FACTOR;
    let mut seeds = Vec::with_capacity(count);
    let mut attempts = 0;
    while seeds.len() < count && attempts < max_attempts {
        attempts += 1;
        let candidate = coord! {
            x: rng.0.gen_range(min.x..max.x),
            y: rng.0.gen_range(min.y..max.y),
        };
        if boundary.contains(candidate) {
            seeds.push(candidate);
        }
    }
    debug!("sampled {} voronoi seeds in {} attempts", seeds.len(), attempts);
    seeds
}

pub(crate) fn voronoi_cells(
    boundary: &Boundary,
    frame: &CoordinateFrame,
    settings: &ResolvedSubdivision,
    rng: &mut SiteRng,
    cancel: &CancelToken,
    report: &mut SkipReport,
) -> Result<Option<Vec<CellCandidate>>, SiteError> {
    let site_area_m2 = boundary.area_m2(frame);
    let count = seed_count(site_area_m2, settings.target_parcel_area);
    let seeds = sample_seeds(boundary, count, rng);
    if seeds.len() < 2 {
        warn!("only {} voronoi seeds landed inside the boundary", seeds.len());
        return Ok(None);
    }

    let mut triangulation: DelaunayTriangulation<Point2<f64>> = DelaunayTriangulation::new();
    for seed in &seeds {
        if let Err(err) = triangulation.insert(Point2::new(seed.x, seed.y)) {
            warn!("voronoi seed rejected by triangulation: {:?}", err);
            return Ok(None);
        }
    }

    let bounds = boundary.bounds();
    let pad = bounds.width().max(bounds.height());
    let frame_ring = vec![
        coord! { x: bounds.min().x - pad, y: bounds.min().y - pad },
        coord! { x: bounds.max().x + pad, y: bounds.min().y - pad },
        coord! { x: bounds.max().x + pad, y: bounds.max().y + pad },
        coord! { x: bounds.min().x - pad, y: bounds.max().y + pad },
    ];
    let min_piece_m2 = settings.min_area * EDGE_CELL_MIN_FRACTION;

    let mut cells = Vec::new();
    for (seed_index, vertex) in triangulation.vertices().enumerate() {
        cancel.check()?;
        let position = vertex.position();
        let site = coord! { x: position.x, y: position.y };
        let neighbours: Vec<Coord<f64>> = vertex
            .out_edges()
            .map(|edge| {
                let to = edge.to().position();
                coord! { x: to.x, y: to.y }
            })
            .collect();

        let ring = neighbours
            .iter()
            .fold(frame_ring.clone(), |ring, &other| clip_half_plane(&ring, site, other));
        if ring.len() < 3 {
            report.record(
                "voronoi",
                seed_index,
                &GeometryError::Degenerate("cell collapsed while clipping".to_string()),
            );
            continue;
        }

        let cell = Polygon::new(LineString::new(ring), vec![]);
        let parts = match intersect_polygon(boundary.polygons(), &cell) {
            Ok(parts) => parts,
            Err(GeometryError::EmptyResult) => continue,
            Err(err) => {
                report.record("voronoi", seed_index, &err);
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
                source: ParcelSource::VoronoiCell {
                    seed: seed_index as u32,
                    part: part as u32,
                },
                area_m2,
            });
        }
    }
    Ok(Some(cells))
}

/// Sutherland-Hodgman step: keep the part of `ring` closer to `site` than to
/// `other`.
pub(crate) fn clip_half_plane(ring: &[Coord<f64>], site: Coord<f64>, other: Coord<f64>) -> Vec<Coord<f64>> {
    let normal = other - site;
    let mid = coord! { x: (site.x + other.x) / 2.0, y: (site.y + other.y) / 2.0 };
    let side = |p: Coord<f64>| (p.x - mid.x) * normal.x + (p.y - mid.y) * normal.y;

    let mut out = Vec::with_capacity(ring.len() + 1);
    for (i, &current) in ring.iter().enumerate() {
        let next = ring[(i + 1) % ring.len()];
        let (sc, sn) = (side(current), side(next));
        if sc <= 0.0 {
            out.push(current);
        }
        if (sc <= 0.0) != (sn <= 0.0) {
            let t = sc / (sc - sn);
            out.push(current + (next - current) * t);
        }
    }
    out
}
