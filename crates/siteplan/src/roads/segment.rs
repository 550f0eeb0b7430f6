//! Road segments and the tiered network they form.

use std::collections::{BTreeMap, HashSet};

use geo::{BoundingRect, Coord, Intersects, LineString};

use crate::cancel::CancelToken;
use crate::coordinate_frame::CoordinateFrame;
use crate::error::{GeometryError, SiteError, SkipReport};
use crate::geometry::{coord_key, CoordKey, SpatialIndex};

use super::tier::RoadTier;

/// Crossing count at which a segment's connectivity score saturates.
const FULL_CONNECTIVITY_CROSSINGS: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentId(pub u32);

#[derive(Debug, Clone)]
pub struct RoadSegment {
    pub id: SegmentId,
    pub tier: RoadTier,
    pub geometry: LineString<f64>,
    pub width_m: f64,
    pub length_m: f64,
    /// Which algorithm produced the geometry.
    pub algorithm: &'static str,
    /// `min(1, crossing vehicular segments / 4)`.
    pub connectivity_score: f64,
}

impl RoadSegment {
    pub fn length_km(&self) -> f64 {
        self.length_m / 1000.0
    }

    /// Vehicles per hour this segment can carry.
    pub fn estimated_capacity(&self) -> f64 {
        self.tier.capacity_per_km() * self.length_km()
    }

    pub fn start(&self) -> Option<Coord<f64>> {
        self.geometry.0.first().copied()
    }

    pub fn end(&self) -> Option<Coord<f64>> {
        self.geometry.0.last().copied()
    }
}

// ---------------------------------------------------------------------------
// Network
// ---------------------------------------------------------------------------

/// All segments of one design, in creation order.
#[derive(Debug, Clone, Default)]
pub struct RoadNetwork {
    segments: Vec<RoadSegment>,
}

impl RoadNetwork {
    pub fn segments(&self) -> &[RoadSegment] {
        &self.segments
    }

    pub fn tier(&self, tier: RoadTier) -> impl Iterator<Item = &RoadSegment> + '_ {
        self.segments.iter().filter(move |s| s.tier == tier)
    }

    pub fn vehicular(&self) -> impl Iterator<Item = &RoadSegment> + '_ {
        self.segments.iter().filter(|s| s.tier.is_vehicular())
    }

    pub fn tier_count(&self, tier: RoadTier) -> usize {
        self.tier(tier).count()
    }

    /// Total length of one tier; `0.0` (never `-0.0`) when the tier is empty.
    pub fn tier_length_km(&self, tier: RoadTier) -> f64 {
        self.tier(tier).fold(0.0, |acc, s| acc + s.length_km())
    }

    /// Segments grouped by tier. Every tier is present, possibly empty.
    pub fn by_tier(&self) -> BTreeMap<RoadTier, Vec<&RoadSegment>> {
        let mut grouped: BTreeMap<RoadTier, Vec<&RoadSegment>> =
            RoadTier::ALL.iter().map(|&t| (t, Vec::new())).collect();
        for segment in &self.segments {
            grouped.entry(segment.tier).or_default().push(segment);
        }
        grouped
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Accumulates segments during synthesis; `finish` computes the derived
/// per-segment connectivity and freezes the network.
pub struct RoadNetworkBuilder {
    frame: CoordinateFrame,
    segments: Vec<RoadSegment>,
    attempts: usize,
    skipped: SkipReport,
}

impl RoadNetworkBuilder {
    pub fn new(frame: CoordinateFrame) -> Self {
        Self {
            frame,
            segments: Vec::new(),
            attempts: 0,
            skipped: SkipReport::default(),
        }
    }

    pub fn frame(&self) -> &CoordinateFrame {
        &self.frame
    }

    /// Add a segment. Degenerate geometry is recorded in the skip report and
    /// yields `None`.
    pub fn push(
        &mut self,
        tier: RoadTier,
        geometry: LineString<f64>,
        algorithm: &'static str,
    ) -> Option<SegmentId> {
        let attempt = self.attempts;
        self.attempts += 1;
        match self.validate(&geometry) {
            Ok(length_m) => {
                let id = SegmentId(self.segments.len() as u32 + 1);
                self.segments.push(RoadSegment {
                    id,
                    tier,
                    geometry,
                    width_m: tier.width_m(),
                    length_m,
                    algorithm,
                    connectivity_score: 0.0,
                });
                Some(id)
            }
            Err(err) => {
                self.skipped.record(tier.as_str(), attempt, &err);
                None
            }
        }
    }

    /// Record a failure that happened before a geometry existed.
    pub fn skip(&mut self, stage: &'static str, index: usize, reason: &dyn std::fmt::Display) {
        self.skipped.record(stage, index, reason);
    }

    fn validate(&self, geometry: &LineString<f64>) -> Result<f64, GeometryError> {
        if geometry.0.len() < 2 {
            return Err(GeometryError::Degenerate(format!(
                "line has {} vertices",
                geometry.0.len()
            )));
        }
        if geometry.0.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
            return Err(GeometryError::NonFinite);
        }
        let length_m = self.frame.line_string_length_m(geometry);
        if length_m <= 0.0 {
            return Err(GeometryError::Degenerate("zero-length line".to_string()));
        }
        Ok(length_m)
    }

    pub fn tier(&self, tier: RoadTier) -> impl Iterator<Item = &RoadSegment> + '_ {
        self.segments.iter().filter(move |s| s.tier == tier)
    }

    /// Geometries of the given tiers, in creation order.
    pub fn geometries(&self, tiers: &[RoadTier]) -> Vec<LineString<f64>> {
        self.segments
            .iter()
            .filter(|s| tiers.contains(&s.tier))
            .map(|s| s.geometry.clone())
            .collect()
    }

    /// Rounded start points of the vehicular segments built so far.
    pub fn link_origins(&self) -> HashSet<CoordKey> {
        let scale = self.frame.key_scale();
        self.segments
            .iter()
            .filter(|s| s.tier.is_vehicular())
            .filter_map(RoadSegment::start)
            .map(|c| coord_key(c, scale))
            .collect()
    }

    /// Whether a vehicular segment with exactly this geometry exists.
    pub fn has_vehicular_geometry(&self, geometry: &LineString<f64>) -> bool {
        self.segments
            .iter()
            .any(|s| s.tier.is_vehicular() && &s.geometry == geometry)
    }

    /// Copy up to `limit` geometries of `sources` into `tier`.
    pub fn duplicate(&mut self, sources: &[RoadTier], tier: RoadTier, limit: usize) -> usize {
        let geometries: Vec<LineString<f64>> =
            self.geometries(sources).into_iter().take(limit).collect();
        geometries
            .into_iter()
            .filter_map(|g| self.push(tier, g, "overlay"))
            .count()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn finish(mut self, cancel: &CancelToken) -> Result<(RoadNetwork, SkipReport), SiteError> {
        let scores = connectivity_scores(&self.segments, cancel)?;
        for (segment, score) in self.segments.iter_mut().zip(scores) {
            segment.connectivity_score = score;
        }
        Ok((
            RoadNetwork {
                segments: self.segments,
            },
            self.skipped,
        ))
    }
}

/// Score every segment by the number of distinct vehicular segments crossing
/// it. Identical geometry (overlay copies) does not count as a crossing.
fn connectivity_scores(segments: &[RoadSegment], cancel: &CancelToken) -> Result<Vec<f64>, SiteError> {
    let index = SpatialIndex::bulk_load(
        segments
            .iter()
            .enumerate()
            .filter(|(_, s)| s.tier.is_vehicular())
            .filter_map(|(i, s)| s.geometry.bounding_rect().map(|r| (i, r))),
    );
    let mut scores = Vec::with_capacity(segments.len());
    for (i, segment) in segments.iter().enumerate() {
        if i % 256 == 0 {
            cancel.check()?;
        }
        let Some(rect) = segment.geometry.bounding_rect() else {
            scores.push(0.0);
            continue;
        };
        let crossings = index
            .query_rect(rect)
            .into_iter()
            .filter(|&j| j != i)
            .filter(|&j| segments[j].geometry != segment.geometry)
            .filter(|&j| segments[j].geometry.intersects(&segment.geometry))
            .count();
        scores.push((crossings as f64 / FULL_CONNECTIVITY_CROSSINGS).min(1.0));
    }
    Ok(scores)
}
