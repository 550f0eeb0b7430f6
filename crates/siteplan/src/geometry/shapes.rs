//! Small geometry helpers built on the `geo` algorithms.

use geo::{
    Area, BooleanOps, Centroid, Closest, ClosestPoint, Coord, LineString, MultiPolygon, Point,
    Polygon, Rect,
};

use crate::error::{guarded, GeometryError};

/// Rounded coordinate used as a graph vertex key.
pub type CoordKey = (i64, i64);

/// Axis-aligned rectangle as a polygon.
pub fn rect_polygon(min: Coord<f64>, max: Coord<f64>) -> Polygon<f64> {
    Rect::new(min, max).to_polygon()
}

/// Intersect `cell` with `target`, returning the non-empty parts.
///
/// Boolean ops can panic on near-degenerate input; the panic is contained and
/// reported as a per-item error.
pub fn intersect_polygon(
    target: &MultiPolygon<f64>,
    cell: &Polygon<f64>,
) -> Result<Vec<Polygon<f64>>, GeometryError> {
    if cell
        .exterior()
        .coords()
        .any(|c| !c.x.is_finite() || !c.y.is_finite())
    {
        return Err(GeometryError::NonFinite);
    }
    let cell = MultiPolygon::new(vec![cell.clone()]);
    let clipped = guarded(|| target.intersection(&cell))?;
    let parts: Vec<Polygon<f64>> = clipped
        .0
        .into_iter()
        .filter(|p| p.unsigned_area() > 0.0)
        .collect();
    if parts.is_empty() {
        return Err(GeometryError::EmptyResult);
    }
    Ok(parts)
}

pub fn polygon_centroid(polygon: &Polygon<f64>) -> Result<Coord<f64>, GeometryError> {
    polygon
        .centroid()
        .map(|p| p.0)
        .ok_or_else(|| GeometryError::Degenerate("polygon has no centroid".to_string()))
}

/// Nearest point on `line` to `coord`.
pub fn closest_point_on(line: &LineString<f64>, coord: Coord<f64>) -> Option<Coord<f64>> {
    match line.closest_point(&Point::from(coord)) {
        Closest::Intersection(p) | Closest::SinglePoint(p) => Some(p.0),
        Closest::Indeterminate => None,
    }
}

/// Round a coordinate to a grid of `1 / scale` units.
pub fn coord_key(coord: Coord<f64>, scale: f64) -> CoordKey {
    ((coord.x * scale).round() as i64, (coord.y * scale).round() as i64)
}
