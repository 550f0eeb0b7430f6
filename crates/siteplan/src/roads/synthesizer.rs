//! Road network synthesis.
//!
//! Tiers are built strictly in order, each stage seeing only the tiers
//! before it:
//!
//! 1. primary: two midlines routed by the [`PathfindingStrategy`], kept when
//!    they touch the parcels (50 m) or the boundary (10 m)
//! 2. secondary: parcel centroids linked to primary roads by the
//!    [`ConnectionStrategy`], then a regular grid of lines
//! 3. local, then residential: centroid to nearest existing road, for
//!    parcels that no earlier link starts from
//! 4. pedestrian, bike and emergency overlays
//!
//! Per-item failures land in the skip report; only cancellation and invalid
//! input abort a design.

use geo::{BoundingRect, Coord, LineString, Rect};
use serde::Serialize;
use tracing::{debug, info};

use crate::cancel::CancelToken;
use crate::config::{
    CONNECTOR_THRESHOLD_M, PRIMARY_BOUNDARY_BUFFER_M, PRIMARY_PARCEL_BUFFER_M,
};
use crate::coordinate_frame::CoordinateFrame;
use crate::error::{SiteError, SkipReport};
use crate::geometry::{closest_point_on, coord_key, Boundary, SiteFootprint, SpatialIndex};
use crate::inputs::{ConnectorMode, DesignParameters, PathfindingMode, TerrainData};
use crate::parcels::{Parcel, SiteContext};

use super::connector::{ConnectionStrategy, NearestVertexConnector, ShortestPathConnector};
use super::layout::{grid_lines, midlines};
use super::pathfinder::{DirectPathfinder, GridAStarPathfinder, PathfindingStrategy};
use super::segment::{RoadNetwork, RoadNetworkBuilder};
use super::tier::RoadTier;

/// What the design was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DesignMode {
    Parcels,
    /// No parcels: a grid derived from the boundary bounds.
    BasicGrid,
    /// Neither parcels nor boundary.
    Empty,
}

#[derive(Debug, Clone)]
pub struct RoadDesign {
    pub network: RoadNetwork,
    pub mode: DesignMode,
    pub frame: CoordinateFrame,
    pub skipped: SkipReport,
}

/// Road synthesizer with its routing and connection strategies.
pub struct RoadSynthesizer {
    pub(super) params: DesignParameters,
    pub(super) pathfinder: Box<dyn PathfindingStrategy>,
    pub(super) connector: Box<dyn ConnectionStrategy>,
}

impl RoadSynthesizer {
    /// Strategies selected by `params.pathfinding` and `params.connector`.
    pub fn new(params: DesignParameters) -> Self {
        let pathfinder: Box<dyn PathfindingStrategy> = match params.pathfinding {
            PathfindingMode::Heuristic => Box::new(DirectPathfinder {
                buffer_m: PRIMARY_PARCEL_BUFFER_M,
            }),
            PathfindingMode::GridAstar => Box::new(GridAStarPathfinder::default()),
        };
        let connector: Box<dyn ConnectionStrategy> = match params.connector {
            ConnectorMode::Nearest => Box::new(NearestVertexConnector {
                threshold_m: CONNECTOR_THRESHOLD_M,
            }),
            ConnectorMode::ShortestPath => Box::new(ShortestPathConnector {
                threshold_m: CONNECTOR_THRESHOLD_M,
            }),
        };
        Self {
            params,
            pathfinder,
            connector,
        }
    }

    pub fn with_pathfinder(mut self, pathfinder: Box<dyn PathfindingStrategy>) -> Self {
        self.pathfinder = pathfinder;
        self
    }

    pub fn with_connector(mut self, connector: Box<dyn ConnectionStrategy>) -> Self {
        self.connector = connector;
        self
    }

    pub fn params(&self) -> &DesignParameters {
        &self.params
    }

    /// Design a network for `parcels`, or for `boundary` alone when there are
    /// no parcels.
    pub fn design(
        &self,
        parcels: &[Parcel],
        boundary: Option<&Boundary>,
        context: SiteContext<'_>,
        cancel: &CancelToken,
    ) -> Result<RoadDesign, SiteError> {
        let parcel_footprint =
            SiteFootprint::new(parcels.iter().map(|p| p.geometry.clone()).collect());
        let design = match (parcel_footprint, boundary) {
            (Some(footprint), _) => {
                self.design_from_parcels(parcels, &footprint, boundary, context.terrain, cancel)?
            }
            (None, Some(boundary)) => self.design_basic(boundary, context.terrain, cancel)?,
            (None, None) => RoadDesign {
                network: RoadNetwork::default(),
                mode: DesignMode::Empty,
                frame: CoordinateFrame::default(),
                skipped: SkipReport::default(),
            },
        };
        info!(
            "designed {} road segments ({:?}, {} skipped)",
            design.network.len(),
            design.mode,
            design.skipped.len()
        );
        Ok(design)
    }

    fn design_from_parcels(
        &self,
        parcels: &[Parcel],
        parcel_footprint: &SiteFootprint,
        boundary: Option<&Boundary>,
        terrain: Option<&TerrainData>,
        cancel: &CancelToken,
    ) -> Result<RoadDesign, SiteError> {
        let frame = match boundary {
            Some(b) => b.frame(),
            None => CoordinateFrame::resolve(&parcel_footprint.bounds()),
        };
        let bounds = boundary.map_or_else(|| parcel_footprint.bounds(), Boundary::bounds);
        let boundary_footprint = boundary.and_then(SiteFootprint::from_boundary);
        let parcel_buffer = frame.meters_to_native(PRIMARY_PARCEL_BUFFER_M);
        let boundary_buffer = frame.meters_to_native(PRIMARY_BOUNDARY_BUFFER_M);
        let touches_site = |line: &LineString<f64>| {
            parcel_footprint.touches_line(line, parcel_buffer)
                || boundary_footprint
                    .as_ref()
                    .is_some_and(|fp| fp.touches_line(line, boundary_buffer))
        };

        let mut builder = RoadNetworkBuilder::new(frame);
        let limits = self.params.limits;

        self.build_primary(&mut builder, bounds, parcel_footprint, &touches_site);
        cancel.check()?;

        // Secondary (a): connectors from parcel centroids to primary roads.
        let centroids: Vec<Coord<f64>> = parcels
            .iter()
            .take(limits.connector_parcels)
            .map(|p| p.centroid)
            .collect();
        let primary = builder.geometries(&[RoadTier::Primary]);
        for link in self.connector.connect(&centroids, &primary, &frame, cancel)? {
            builder.push(RoadTier::Secondary, link.geometry, self.connector.label());
        }

        // Secondary (b): regular grid.
        let grid = grid_lines(bounds, self.params.grid_spacing_m(), 0.0, &frame);
        push_grid(&mut builder, RoadTier::Secondary, grid, terrain, &touches_site);
        cancel.check()?;

        // Local and residential roads serve parcels no earlier link starts from.
        let served = builder.link_origins();
        let local_sources: Vec<Coord<f64>> = parcels
            .iter()
            .map(|p| p.centroid)
            .filter(|c| !served.contains(&coord_key(*c, frame.key_scale())))
            .take(limits.local_parcels)
            .collect();
        connect_to_nearest(
            &mut builder,
            RoadTier::Local,
            &[RoadTier::Primary, RoadTier::Secondary],
            &local_sources,
            self.params.max_distance_to_road,
            cancel,
        )?;

        let served = builder.link_origins();
        let residential_sources: Vec<Coord<f64>> = parcels
            .iter()
            .filter(|p| p.zone_type.is_residential())
            .map(|p| p.centroid)
            .filter(|c| !served.contains(&coord_key(*c, frame.key_scale())))
            .take(limits.local_parcels)
            .collect();
        connect_to_nearest(
            &mut builder,
            RoadTier::Residential,
            &[RoadTier::Primary, RoadTier::Secondary, RoadTier::Local],
            &residential_sources,
            self.params.max_distance_to_road,
            cancel,
        )?;

        let major = [RoadTier::Primary, RoadTier::Secondary];
        builder.duplicate(&major, RoadTier::Pedestrian, limits.pedestrian_overlay);
        builder.duplicate(&major, RoadTier::Bike, limits.bike_overlay);
        builder.duplicate(&major, RoadTier::Emergency, usize::MAX);

        let (network, skipped) = builder.finish(cancel)?;
        Ok(RoadDesign {
            network,
            mode: DesignMode::Parcels,
            frame,
            skipped,
        })
    }

    /// Route both midlines; keep those `keep` accepts.
    pub(super) fn build_primary(
        &self,
        builder: &mut RoadNetworkBuilder,
        bounds: Rect<f64>,
        target: &SiteFootprint,
        keep: &dyn Fn(&LineString<f64>) -> bool,
    ) {
        let frame = *builder.frame();
        for (i, (start, end)) in midlines(bounds).into_iter().enumerate() {
            match self.pathfinder.find_path(start, end, target, &frame) {
                Ok(path) if keep(&path) => {
                    builder.push(RoadTier::Primary, path, self.pathfinder.label());
                }
                Ok(_) => debug!("primary route {} does not reach the site", i),
                Err(err) => builder.skip("primary", i, &err),
            }
        }
    }
}

/// Push grid lines that touch the site, avoid unsuitable terrain and do not
/// repeat an existing road.
pub(super) fn push_grid(
    builder: &mut RoadNetworkBuilder,
    tier: RoadTier,
    lines: Vec<LineString<f64>>,
    terrain: Option<&TerrainData>,
    keep: &dyn Fn(&LineString<f64>) -> bool,
) -> usize {
    let mut kept = 0;
    let mut blocked = 0;
    for line in lines {
        if terrain.is_some_and(|t| t.crosses_unsuitable(&line)) {
            blocked += 1;
            continue;
        }
        if builder.has_vehicular_geometry(&line) {
            continue;
        }
        if keep(&line) && builder.push(tier, line, "grid").is_some() {
            kept += 1;
        }
    }
    if blocked > 0 {
        debug!("{} {} grid lines blocked by unsuitable terrain", blocked, tier);
    }
    kept
}

/// Link each source point to the nearest point on a road of `targets` when it
/// is closer than `max_distance_m`. Targets are fixed before any link is
/// added.
fn connect_to_nearest(
    builder: &mut RoadNetworkBuilder,
    tier: RoadTier,
    targets: &[RoadTier],
    sources: &[Coord<f64>],
    max_distance_m: f64,
    cancel: &CancelToken,
) -> Result<usize, SiteError> {
    let frame = *builder.frame();
    let roads = builder.geometries(targets);
    let index = SpatialIndex::bulk_load(
        roads
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.bounding_rect().map(|b| (i, b))),
    );
    let margins = frame.axis_margins(max_distance_m);

    let mut links = Vec::new();
    for (n, &source) in sources.iter().enumerate() {
        if n % 64 == 0 {
            cancel.check()?;
        }
        let nearest = index
            .query_around_xy(Rect::new(source, source), margins)
            .into_iter()
            .filter_map(|i| closest_point_on(&roads[i], source))
            .map(|p| (frame.distance_m(source, p), p))
            .min_by(|a, b| a.0.total_cmp(&b.0));
        if let Some((distance, point)) = nearest {
            if distance > 0.0 && distance < max_distance_m {
                links.push(LineString::new(vec![source, point]));
            }
        }
    }

    Ok(links
        .into_iter()
        .filter_map(|link| builder.push(tier, link, "nearest-road"))
        .count())
}
