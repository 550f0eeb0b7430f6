//! R-tree indexes over bounding boxes and points.
//!
//! Intersection counting, corner-lot neighbour detection and nearest-road
//! search all go through these instead of scanning every pair.

use geo::{Coord, Rect};
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, AABB};

type IndexedRect = GeomWithData<Rectangle<[f64; 2]>, usize>;
type IndexedPoint = GeomWithData<[f64; 2], usize>;

/// Bounding-box index keyed by item position.
pub struct SpatialIndex {
    tree: RTree<IndexedRect>,
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self { tree: RTree::new() }
    }
}

impl SpatialIndex {
    pub fn bulk_load(rects: impl IntoIterator<Item = (usize, Rect<f64>)>) -> Self {
        let entries: Vec<IndexedRect> = rects
            .into_iter()
            .map(|(idx, rect)| {
                GeomWithData::new(
                    Rectangle::from_corners(
                        [rect.min().x, rect.min().y],
                        [rect.max().x, rect.max().y],
                    ),
                    idx,
                )
            })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Items whose bounding box intersects `rect`, in ascending index order.
    pub fn query_rect(&self, rect: Rect<f64>) -> Vec<usize> {
        let envelope = AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]);
        let mut result: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|entry| entry.data)
            .collect();
        result.sort_unstable();
        result
    }

    /// Like [`query_rect`](Self::query_rect) with the rectangle grown by `margin`.
    pub fn query_around(&self, rect: Rect<f64>, margin: f64) -> Vec<usize> {
        self.query_around_xy(rect, (margin, margin))
    }

    /// Rectangle grown by separate x and y margins.
    pub fn query_around_xy(&self, rect: Rect<f64>, (mx, my): (f64, f64)) -> Vec<usize> {
        let grown = Rect::new(
            Coord {
                x: rect.min().x - mx,
                y: rect.min().y - my,
            },
            Coord {
                x: rect.max().x + mx,
                y: rect.max().y + my,
            },
        );
        self.query_rect(grown)
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

/// Point index used for nearest-vertex lookups.
pub struct PointIndex {
    tree: RTree<IndexedPoint>,
}

impl Default for PointIndex {
    fn default() -> Self {
        Self { tree: RTree::new() }
    }
}

impl PointIndex {
    pub fn bulk_load(points: impl IntoIterator<Item = (usize, Coord<f64>)>) -> Self {
        let entries: Vec<IndexedPoint> = points
            .into_iter()
            .map(|(idx, c)| GeomWithData::new([c.x, c.y], idx))
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Nearest point within `max_distance`, as `(index, distance)`.
    pub fn nearest_within(&self, coord: Coord<f64>, max_distance: f64) -> Option<(usize, f64)> {
        let nearest = self.tree.nearest_neighbor(&[coord.x, coord.y])?;
        let [x, y] = *nearest.geom();
        let distance = ((x - coord.x).powi(2) + (y - coord.y).powi(2)).sqrt();
        (distance <= max_distance).then_some((nearest.data, distance))
    }

    /// All points within `max_distance`, as `(index, distance)`.
    pub fn within(&self, coord: Coord<f64>, max_distance: f64) -> Vec<(usize, f64)> {
        self.tree
            .locate_within_distance([coord.x, coord.y], max_distance * max_distance)
            .map(|entry| {
                let [x, y] = *entry.geom();
                let distance = ((x - coord.x).powi(2) + (y - coord.y).powi(2)).sqrt();
                (entry.data, distance)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
