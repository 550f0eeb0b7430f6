//! The developable area that roads are routed through.
//!
//! Either the parcel set (after subdivision) or the raw boundary polygons.
//! Roads are kept when they touch the footprint, optionally within a buffer.

use geo::{BoundingRect, Contains, Coord, EuclideanDistance, Intersects, LineString, Point, Polygon, Rect};

use super::boundary::Boundary;
use super::spatial_index::SpatialIndex;

pub struct SiteFootprint {
    polygons: Vec<Polygon<f64>>,
    index: SpatialIndex,
    bounds: Rect<f64>,
}

impl SiteFootprint {
    /// `None` when no polygon has a bounding box.
    pub fn new(polygons: Vec<Polygon<f64>>) -> Option<Self> {
        let rects: Vec<(usize, Rect<f64>)> = polygons
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.bounding_rect().map(|r| (i, r)))
            .collect();
        let bounds = rects.iter().map(|(_, r)| *r).reduce(|a, b| {
            Rect::new(
                Coord {
                    x: a.min().x.min(b.min().x),
                    y: a.min().y.min(b.min().y),
                },
                Coord {
                    x: a.max().x.max(b.max().x),
                    y: a.max().y.max(b.max().y),
                },
            )
        })?;
        Some(Self {
            index: SpatialIndex::bulk_load(rects),
            polygons,
            bounds,
        })
    }

    pub fn from_boundary(boundary: &Boundary) -> Option<Self> {
        Self::new(boundary.polygons().0.clone())
    }

    pub fn bounds(&self) -> Rect<f64> {
        self.bounds
    }

    pub fn center(&self) -> Coord<f64> {
        self.bounds.center()
    }

    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    /// Whether `line` crosses the footprint or passes within `buffer` of it.
    pub fn touches_line(&self, line: &LineString<f64>, buffer: f64) -> bool {
        let Some(line_bounds) = line.bounding_rect() else {
            return false;
        };
        self.index
            .query_around(line_bounds, buffer.max(0.0))
            .into_iter()
            .any(|i| {
                let polygon = &self.polygons[i];
                line.intersects(polygon)
                    || (buffer > 0.0 && line.euclidean_distance(polygon.exterior()) <= buffer)
            })
    }

    pub fn contains(&self, coord: Coord<f64>) -> bool {
        let point = Point::from(coord);
        let point_rect = Rect::new(coord, coord);
        self.index
            .query_rect(point_rect)
            .into_iter()
            .any(|i| self.polygons[i].contains(&point))
    }
}
