//! Linking new points (parcel centroids) to an existing road network.
//!
//! Both strategies work on a graph whose vertices are the rounded vertices of
//! the existing roads. A connection is a straight link from the new point to
//! one chosen vertex within the search radius.

use std::collections::HashMap;

use geo::{Coord, LineString, Rect};
use pathfinding::prelude::dijkstra_all;
use tracing::debug;

use crate::cancel::CancelToken;
use crate::coordinate_frame::CoordinateFrame;
use crate::error::SiteError;
use crate::geometry::{coord_key, CoordKey, PointIndex};

/// A link from `points[point_index]` to the network.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub point_index: usize,
    pub geometry: LineString<f64>,
}

/// Strategy for linking points to an existing network.
pub trait ConnectionStrategy {
    /// Label reported on the produced segments.
    fn label(&self) -> &'static str;

    fn connect(
        &self,
        points: &[Coord<f64>],
        network: &[LineString<f64>],
        frame: &CoordinateFrame,
        cancel: &CancelToken,
    ) -> Result<Vec<Connection>, SiteError>;
}

// ---------------------------------------------------------------------------
// Road graph
// ---------------------------------------------------------------------------

/// Vertex graph of a set of road lines. Edge weights are centimeters. The
/// vertex index holds metric coordinates, so radius searches are in meters.
pub struct RoadGraph {
    vertices: Vec<Coord<f64>>,
    adjacency: Vec<Vec<(usize, u64)>>,
    index: PointIndex,
    frame: CoordinateFrame,
}

fn centimeters(meters: f64) -> u64 {
    (meters * 100.0).round().max(0.0) as u64
}

impl RoadGraph {
    pub fn build(network: &[LineString<f64>], frame: &CoordinateFrame) -> Self {
        let scale = frame.key_scale();
        let mut keys: HashMap<CoordKey, usize> = HashMap::new();
        let mut vertices = Vec::new();
        let mut adjacency: Vec<Vec<(usize, u64)>> = Vec::new();

        let mut vertex_of = |c: Coord<f64>, vertices: &mut Vec<Coord<f64>>, adjacency: &mut Vec<Vec<(usize, u64)>>| {
            *keys.entry(coord_key(c, scale)).or_insert_with(|| {
                vertices.push(c);
                adjacency.push(Vec::new());
                vertices.len() - 1
            })
        };

        for line in network {
            let mut previous: Option<usize> = None;
            for &c in &line.0 {
                if !c.x.is_finite() || !c.y.is_finite() {
                    previous = None;
                    continue;
                }
                let v = vertex_of(c, &mut vertices, &mut adjacency);
                if let Some(p) = previous.filter(|&p| p != v) {
                    let cost = centimeters(frame.distance_m(vertices[p], vertices[v]));
                    adjacency[p].push((v, cost));
                    adjacency[v].push((p, cost));
                }
                previous = Some(v);
            }
        }

        let index = PointIndex::bulk_load(vertices.iter().map(|&c| frame.to_metric(c)).enumerate());
        Self {
            vertices,
            adjacency,
            index,
            frame: *frame,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn vertex(&self, v: usize) -> Coord<f64> {
        self.vertices[v]
    }

    /// Vertex closest to the center of the vertex bounding box.
    pub fn hub(&self) -> Option<usize> {
        let first = *self.vertices.first()?;
        let bounds = self.vertices.iter().fold(Rect::new(first, first), |r, c| {
            Rect::new(
                Coord {
                    x: r.min().x.min(c.x),
                    y: r.min().y.min(c.y),
                },
                Coord {
                    x: r.max().x.max(c.x),
                    y: r.max().y.max(c.y),
                },
            )
        });
        self.index
            .nearest_within(self.frame.to_metric(bounds.center()), f64::INFINITY)
            .map(|(v, _)| v)
    }

    /// Network distance in centimeters from `hub` to every reachable vertex.
    pub fn distances_from(&self, hub: usize) -> HashMap<usize, u64> {
        let mut distances: HashMap<usize, u64> = dijkstra_all(&hub, |&v| self.adjacency[v].iter().copied())
            .into_iter()
            .map(|(v, (_, cost))| (v, cost))
            .collect();
        distances.insert(hub, 0);
        distances
    }

    /// Nearest vertex within `max_m` meters, as `(vertex, meters)`.
    pub fn nearest_within(&self, c: Coord<f64>, max_m: f64) -> Option<(usize, f64)> {
        self.index.nearest_within(self.frame.to_metric(c), max_m)
    }

    /// Every vertex within `max_m` meters, as `(vertex, meters)`.
    pub fn within(&self, c: Coord<f64>, max_m: f64) -> Vec<(usize, f64)> {
        self.index.within(self.frame.to_metric(c), max_m)
    }
}

fn link(point_index: usize, from: Coord<f64>, to: Coord<f64>) -> Option<Connection> {
    (from != to).then(|| Connection {
        point_index,
        geometry: LineString::new(vec![from, to]),
    })
}

// ---------------------------------------------------------------------------
// Nearest vertex
// ---------------------------------------------------------------------------

/// Link each point to its nearest existing vertex within `threshold_m`.
#[derive(Debug, Clone, Copy)]
pub struct NearestVertexConnector {
    pub threshold_m: f64,
}

impl ConnectionStrategy for NearestVertexConnector {
    fn label(&self) -> &'static str {
        "Dijkstra"
    }

    fn connect(
        &self,
        points: &[Coord<f64>],
        network: &[LineString<f64>],
        frame: &CoordinateFrame,
        cancel: &CancelToken,
    ) -> Result<Vec<Connection>, SiteError> {
        let graph = RoadGraph::build(network, frame);
        let mut connections = Vec::new();
        for (i, &point) in points.iter().enumerate() {
            cancel.check()?;
            if let Some((v, _)) = graph.nearest_within(point, self.threshold_m) {
                connections.extend(link(i, point, graph.vertex(v)));
            }
        }
        debug!(
            "connected {} of {} points to {} network vertices",
            connections.len(),
            points.len(),
            graph.vertex_count()
        );
        Ok(connections)
    }
}

// ---------------------------------------------------------------------------
// Shortest path to hub
// ---------------------------------------------------------------------------

/// Link each point to the vertex within `threshold_m` that minimizes link
/// length plus network distance to the hub vertex.
#[derive(Debug, Clone, Copy)]
pub struct ShortestPathConnector {
    pub threshold_m: f64,
}

impl ConnectionStrategy for ShortestPathConnector {
    fn label(&self) -> &'static str {
        "shortest-path"
    }

    fn connect(
        &self,
        points: &[Coord<f64>],
        network: &[LineString<f64>],
        frame: &CoordinateFrame,
        cancel: &CancelToken,
    ) -> Result<Vec<Connection>, SiteError> {
        let graph = RoadGraph::build(network, frame);
        let Some(hub) = graph.hub() else {
            return Ok(Vec::new());
        };
        let distances = graph.distances_from(hub);

        let mut connections = Vec::new();
        for (i, &point) in points.iter().enumerate() {
            cancel.check()?;
            let candidates = graph.within(point, self.threshold_m);
            let best = candidates
                .iter()
                .filter_map(|&(v, _)| {
                    let network_cm = distances.get(&v)?;
                    let link_cm = centimeters(frame.distance_m(point, graph.vertex(v)));
                    Some((link_cm + network_cm, v))
                })
                .min()
                .map(|(_, v)| v)
                .or_else(|| {
                    candidates
                        .iter()
                        .min_by(|a, b| a.1.total_cmp(&b.1))
                        .map(|&(v, _)| v)
                });
            if let Some(v) = best {
                connections.extend(link(i, point, graph.vertex(v)));
            }
        }
        Ok(connections)
    }
}
