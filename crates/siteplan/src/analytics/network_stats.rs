//! Network-level measurements: lengths per tier, intersections and road
//! nodes.

use std::collections::{BTreeMap, HashMap};

use geo::{BoundingRect, Coord, Intersects, Rect};
use serde::Serialize;

use crate::cancel::CancelToken;
use crate::config::NODE_TOLERANCE_M;
use crate::coordinate_frame::CoordinateFrame;
use crate::error::SiteError;
use crate::geometry::{closest_point_on, coord_key, CoordKey, SpatialIndex};
use crate::roads::{RoadNetwork, RoadSegment, RoadTier};

use super::hierarchy::{find_violations, HierarchyViolation};

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

/// A point where vehicular segments end or meet.
#[derive(Debug, Clone)]
pub(crate) struct RoadNode {
    pub position: Coord<f64>,
    /// `(segment, passes_through)`: index into the vehicular segment list and
    /// whether the segment continues through the node instead of ending.
    pub incident: Vec<(usize, bool)>,
}

impl RoadNode {
    pub fn degree(&self) -> usize {
        self.incident
            .iter()
            .map(|&(_, through)| if through { 2 } else { 1 })
            .sum()
    }
}

/// Nodes at every vehicular segment end, including segments that pass
/// through an end without ending there.
pub(crate) fn build_nodes(segments: &[&RoadSegment], frame: &CoordinateFrame) -> Vec<RoadNode> {
    let scale = frame.key_scale();
    let mut by_key: HashMap<CoordKey, usize> = HashMap::new();
    let mut nodes: Vec<RoadNode> = Vec::new();
    for (i, segment) in segments.iter().enumerate() {
        for end in [segment.start(), segment.end()].into_iter().flatten() {
            let n = *by_key.entry(coord_key(end, scale)).or_insert_with(|| {
                nodes.push(RoadNode {
                    position: end,
                    incident: Vec::new(),
                });
                nodes.len() - 1
            });
            if !nodes[n].incident.iter().any(|&(s, _)| s == i) {
                nodes[n].incident.push((i, false));
            }
        }
    }

    let index = SpatialIndex::bulk_load(
        segments
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.geometry.bounding_rect().map(|r| (i, r))),
    );
    let tolerance = frame.axis_margins(NODE_TOLERANCE_M);
    for node in &mut nodes {
        let candidates = index.query_around_xy(Rect::new(node.position, node.position), tolerance);
        for j in candidates {
            if node.incident.iter().any(|&(s, _)| s == j) {
                continue;
            }
            let touches = closest_point_on(&segments[j].geometry, node.position)
                .is_some_and(|c| frame.distance_m(c, node.position) <= NODE_TOLERANCE_M);
            if touches {
                node.incident.push((j, true));
            }
        }
    }
    nodes
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NodeDegreeStats {
    pub node_count: usize,
    pub average_degree: f64,
    pub max_degree: usize,
    /// Nodes with a single incident segment end.
    pub dead_ends: usize,
}

impl NodeDegreeStats {
    pub(crate) fn from_nodes(nodes: &[RoadNode]) -> Self {
        if nodes.is_empty() {
            return Self::default();
        }
        let degrees: Vec<usize> = nodes.iter().map(RoadNode::degree).collect();
        Self {
            node_count: nodes.len(),
            average_degree: degrees.iter().sum::<usize>() as f64 / nodes.len() as f64,
            max_degree: degrees.iter().copied().max().unwrap_or(0),
            dead_ends: degrees.iter().filter(|&&d| d == 1).count(),
        }
    }
}

// ---------------------------------------------------------------------------
// Intersections
// ---------------------------------------------------------------------------

/// Pairs of distinct vehicular segments that touch or cross. Overlapping
/// copies of the same geometry are not counted.
pub fn count_intersections(network: &RoadNetwork, cancel: &CancelToken) -> Result<usize, SiteError> {
    let segments: Vec<&RoadSegment> = network.vehicular().collect();
    let index = SpatialIndex::bulk_load(
        segments
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.geometry.bounding_rect().map(|r| (i, r))),
    );
    let mut count = 0;
    for (i, segment) in segments.iter().enumerate() {
        if i % 256 == 0 {
            cancel.check()?;
        }
        let Some(rect) = segment.geometry.bounding_rect() else {
            continue;
        };
        count += index
            .query_rect(rect)
            .into_iter()
            .filter(|&j| j > i)
            .filter(|&j| segments[j].geometry != segment.geometry)
            .filter(|&j| segments[j].geometry.intersects(&segment.geometry))
            .count();
    }
    Ok(count)
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct NetworkStatistics {
    /// Sum of `tier_lengths_km`.
    pub total_road_length_km: f64,
    /// Sum of `overlay_lengths_km`.
    pub overlay_length_km: f64,
    /// Vehicular tiers only.
    pub tier_lengths_km: BTreeMap<RoadTier, f64>,
    /// Pedestrian, bike and emergency overlays, which reuse or parallel the
    /// vehicular geometry.
    pub overlay_lengths_km: BTreeMap<RoadTier, f64>,
    pub segment_counts: BTreeMap<RoadTier, usize>,
    pub total_segments: usize,
    pub intersection_count: usize,
    /// Vehicular km per hectare of site.
    pub road_density_km_per_ha: f64,
    pub nodes: NodeDegreeStats,
    pub hierarchy_violations: Vec<HierarchyViolation>,
}

impl NetworkStatistics {
    pub fn compute(
        network: &RoadNetwork,
        frame: &CoordinateFrame,
        area_hectares: f64,
        cancel: &CancelToken,
    ) -> Result<Self, SiteError> {
        let (tier_lengths_km, overlay_lengths_km): (BTreeMap<RoadTier, f64>, BTreeMap<RoadTier, f64>) =
            RoadTier::ALL
                .iter()
                .map(|&t| (t, network.tier_length_km(t)))
                .partition(|(t, _)| t.is_vehicular());
        let segment_counts: BTreeMap<RoadTier, usize> = RoadTier::ALL
            .iter()
            .map(|&t| (t, network.tier_count(t)))
            .collect();
        let total_road_length_km = tier_lengths_km.values().fold(0.0, |acc, km| acc + km);
        let overlay_length_km = overlay_lengths_km.values().fold(0.0, |acc, km| acc + km);

        let intersection_count = count_intersections(network, cancel)?;
        let vehicular: Vec<&RoadSegment> = network.vehicular().collect();
        let nodes = build_nodes(&vehicular, frame);
        cancel.check()?;
        let hierarchy_violations = find_violations(&vehicular, &nodes);

        Ok(Self {
            total_road_length_km,
            overlay_length_km,
            tier_lengths_km,
            overlay_lengths_km,
            segment_counts,
            total_segments: network.len(),
            intersection_count,
            road_density_km_per_ha: if area_hectares > 0.0 {
                total_road_length_km / area_hectares
            } else {
                0.0
            },
            nodes: NodeDegreeStats::from_nodes(&nodes),
            hierarchy_violations,
        })
    }
}
