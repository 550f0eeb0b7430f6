//! Routing of primary roads across the site.
//!
//! [`DirectPathfinder`] is the default: a straight segment if it touches the
//! target, otherwise a dog-leg through the target's center.
//! [`GridAStarPathfinder`] rasterizes the bounding box and runs A* with
//! cheaper steps inside the target, so the route bends into the site.

use geo::{coord, Coord, LineString};
use pathfinding::prelude::astar;

use crate::coordinate_frame::CoordinateFrame;
use crate::error::GeometryError;
use crate::geometry::SiteFootprint;

/// Strategy for routing a road between two points through a target area.
pub trait PathfindingStrategy {
    /// Label reported on the produced segments.
    fn label(&self) -> &'static str;

    fn find_path(
        &self,
        start: Coord<f64>,
        end: Coord<f64>,
        target: &SiteFootprint,
        frame: &CoordinateFrame,
    ) -> Result<LineString<f64>, GeometryError>;
}

fn check_endpoints(start: Coord<f64>, end: Coord<f64>) -> Result<(), GeometryError> {
    if [start.x, start.y, end.x, end.y].iter().any(|v| !v.is_finite()) {
        return Err(GeometryError::NonFinite);
    }
    if start == end {
        return Err(GeometryError::Degenerate("start equals end".to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Direct / dog-leg
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct DirectPathfinder {
    /// Distance in meters within which the direct line counts as touching.
    pub buffer_m: f64,
}

impl PathfindingStrategy for DirectPathfinder {
    fn label(&self) -> &'static str {
        "A*"
    }

    fn find_path(
        &self,
        start: Coord<f64>,
        end: Coord<f64>,
        target: &SiteFootprint,
        frame: &CoordinateFrame,
    ) -> Result<LineString<f64>, GeometryError> {
        check_endpoints(start, end)?;
        let direct = LineString::new(vec![start, end]);
        if target.touches_line(&direct, frame.meters_to_native(self.buffer_m)) {
            return Ok(direct);
        }
        let center = target.center();
        if center == start || center == end {
            return Ok(direct);
        }
        Ok(LineString::new(vec![start, center, end]))
    }
}

// ---------------------------------------------------------------------------
// Grid A*
// ---------------------------------------------------------------------------

const STRAIGHT_STEP: u32 = 10;
const DIAGONAL_STEP: u32 = 14;
/// Step multiplier outside the target footprint.
const OUTSIDE_PENALTY: u32 = 3;

#[derive(Debug, Clone, Copy)]
pub struct GridAStarPathfinder {
    /// Cells along the longer side of the search box.
    pub resolution: usize,
}

impl Default for GridAStarPathfinder {
    fn default() -> Self {
        Self { resolution: 64 }
    }
}

struct CostField {
    origin: Coord<f64>,
    step_x: f64,
    step_y: f64,
    cols: usize,
    rows: usize,
    inside: Vec<bool>,
}

impl CostField {
    fn build(start: Coord<f64>, end: Coord<f64>, target: &SiteFootprint, resolution: usize) -> Self {
        let bounds = target.bounds();
        let min = coord! {
            x: bounds.min().x.min(start.x).min(end.x),
            y: bounds.min().y.min(start.y).min(end.y),
        };
        let max = coord! {
            x: bounds.max().x.max(start.x).max(end.x),
            y: bounds.max().y.max(start.y).max(end.y),
        };
        let (width, height) = (max.x - min.x, max.y - min.y);
        let longest = width.max(height);
        let resolution = resolution.max(2);
        let cols = ((width / longest * resolution as f64).ceil() as usize).max(1);
        let rows = ((height / longest * resolution as f64).ceil() as usize).max(1);
        let step_x = if width > 0.0 { width / cols as f64 } else { 1.0 };
        let step_y = if height > 0.0 { height / rows as f64 } else { 1.0 };

        let mut inside = Vec::with_capacity(cols * rows);
        for row in 0..rows {
            for col in 0..cols {
                let center = coord! {
                    x: min.x + (col as f64 + 0.5) * step_x,
                    y: min.y + (row as f64 + 0.5) * step_y,
                };
                inside.push(target.contains(center));
            }
        }
        Self {
            origin: min,
            step_x,
            step_y,
            cols,
            rows,
            inside,
        }
    }

    fn cell_of(&self, c: Coord<f64>) -> (usize, usize) {
        let col = ((c.x - self.origin.x) / self.step_x).floor().max(0.0) as usize;
        let row = ((c.y - self.origin.y) / self.step_y).floor().max(0.0) as usize;
        (col.min(self.cols - 1), row.min(self.rows - 1))
    }

    fn center_of(&self, (col, row): (usize, usize)) -> Coord<f64> {
        coord! {
            x: self.origin.x + (col as f64 + 0.5) * self.step_x,
            y: self.origin.y + (row as f64 + 0.5) * self.step_y,
        }
    }

    fn multiplier(&self, (col, row): (usize, usize)) -> u32 {
        if self.inside[row * self.cols + col] {
            1
        } else {
            OUTSIDE_PENALTY
        }
    }

    fn successors(&self, cell: (usize, usize)) -> Vec<((usize, usize), u32)> {
        let (col, row) = (cell.0 as i64, cell.1 as i64);
        let mut out = Vec::with_capacity(8);
        for dy in -1..=1i64 {
            for dx in -1..=1i64 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let (nc, nr) = (col + dx, row + dy);
                if nc < 0 || nr < 0 || nc >= self.cols as i64 || nr >= self.rows as i64 {
                    continue;
                }
                let next = (nc as usize, nr as usize);
                let step = if dx != 0 && dy != 0 {
                    DIAGONAL_STEP
                } else {
                    STRAIGHT_STEP
                };
                out.push((next, step * self.multiplier(next)));
            }
        }
        out
    }
}

/// Octile distance in step units; admissible since the cheapest step
/// multiplier is 1.
fn octile(a: (usize, usize), b: (usize, usize)) -> u32 {
    let dx = a.0.abs_diff(b.0) as u32;
    let dy = a.1.abs_diff(b.1) as u32;
    let (lo, hi) = if dx < dy { (dx, dy) } else { (dy, dx) };
    DIAGONAL_STEP * lo + STRAIGHT_STEP * (hi - lo)
}

/// Drop interior vertices where the direction does not change.
fn simplify_collinear(points: Vec<Coord<f64>>) -> Vec<Coord<f64>> {
    if points.len() < 3 {
        return points;
    }
    let mut out = vec![points[0]];
    for window in points.windows(3) {
        let (a, b, c) = (window[0], window[1], window[2]);
        let cross = (b.x - a.x) * (c.y - b.y) - (b.y - a.y) * (c.x - b.x);
        if cross.abs() > f64::EPSILON * (1.0 + a.x.abs() + a.y.abs()) {
            out.push(b);
        }
    }
    out.push(points[points.len() - 1]);
    out
}

impl PathfindingStrategy for GridAStarPathfinder {
    fn label(&self) -> &'static str {
        "A* (grid)"
    }

    fn find_path(
        &self,
        start: Coord<f64>,
        end: Coord<f64>,
        target: &SiteFootprint,
        _frame: &CoordinateFrame,
    ) -> Result<LineString<f64>, GeometryError> {
        check_endpoints(start, end)?;
        let field = CostField::build(start, end, target, self.resolution);
        let from = field.cell_of(start);
        let goal = field.cell_of(end);
        if from == goal {
            return Ok(LineString::new(vec![start, end]));
        }

        let (cells, _cost) = astar(
            &from,
            |&cell| field.successors(cell),
            |&cell| octile(cell, goal),
            |&cell| cell == goal,
        )
        .ok_or_else(|| GeometryError::Degenerate("no grid path between endpoints".to_string()))?;

        let mut points: Vec<Coord<f64>> = Vec::with_capacity(cells.len() + 2);
        points.push(start);
        points.extend(cells.iter().skip(1).take(cells.len().saturating_sub(2)).map(|&c| field.center_of(c)));
        points.push(end);
        Ok(LineString::new(simplify_collinear(points)))
    }
}
