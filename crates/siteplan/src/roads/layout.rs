//! Line layouts shared by the parcel-driven and boundary-only designs.

use geo::{coord, Coord, LineString, Rect};

use crate::config::MAX_GRID_LINES;
use crate::coordinate_frame::CoordinateFrame;

/// West-east line through the vertical midpoint and south-north line through
/// the horizontal midpoint, as `(start, end)` pairs.
pub fn midlines(bounds: Rect<f64>) -> [(Coord<f64>, Coord<f64>); 2] {
    let (min, max, center) = (bounds.min(), bounds.max(), bounds.center());
    [
        (coord! { x: min.x, y: center.y }, coord! { x: max.x, y: center.y }),
        (coord! { x: center.x, y: min.y }, coord! { x: center.x, y: max.y }),
    ]
}

/// Vertical then horizontal lines spanning `bounds`, spaced `spacing_m`
/// apart. `phase` shifts the first line: lines sit at `(k + phase) * spacing`
/// for `k >= 0`, strictly inside the box.
pub fn grid_lines(bounds: Rect<f64>, spacing_m: f64, phase: f64, frame: &CoordinateFrame) -> Vec<LineString<f64>> {
    let (min, max) = (bounds.min(), bounds.max());
    let step_x = spacing_m / frame.lon_meters_per_degree;
    let step_y = spacing_m / frame.lat_meters_per_degree;
    let mut lines = Vec::new();
    if !(step_x.is_finite() && step_x > 0.0 && step_y.is_finite() && step_y > 0.0) {
        return lines;
    }

    for x in offsets(min.x, max.x, step_x, phase) {
        lines.push(LineString::new(vec![coord! { x: x, y: min.y }, coord! { x: x, y: max.y }]));
    }
    for y in offsets(min.y, max.y, step_y, phase) {
        lines.push(LineString::new(vec![coord! { x: min.x, y: y }, coord! { x: max.x, y: y }]));
    }
    lines
}

fn offsets(lo: f64, hi: f64, step: f64, phase: f64) -> impl Iterator<Item = f64> {
    (0..MAX_GRID_LINES)
        .map(move |k| lo + (k as f64 + phase) * step)
        .filter(move |&v| v > lo)
        .take_while(move |&v| v < hi)
}
