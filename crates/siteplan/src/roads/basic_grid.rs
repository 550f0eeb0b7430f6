//! Boundary-only design used when a site has no parcels yet.
//!
//! Primary midlines, a secondary grid at the design spacing and a finer
//! residential grid at half that spacing. Residential lines that repeat a
//! primary or secondary line are skipped. There are no local roads; the
//! emergency tier is the primary roads plus the first two secondary lines.

use geo::LineString;

use crate::cancel::CancelToken;
use crate::config::{BASIC_EMERGENCY_SECONDARY, PRIMARY_BOUNDARY_BUFFER_M};
use crate::error::SiteError;
use crate::geometry::{Boundary, SiteFootprint};
use crate::inputs::TerrainData;

use super::layout::grid_lines;
use super::segment::{RoadNetwork, RoadNetworkBuilder};
use super::synthesizer::{push_grid, DesignMode, RoadDesign, RoadSynthesizer};
use super::tier::RoadTier;

impl RoadSynthesizer {
    pub(super) fn design_basic(
        &self,
        boundary: &Boundary,
        terrain: Option<&TerrainData>,
        cancel: &CancelToken,
    ) -> Result<RoadDesign, SiteError> {
        let frame = boundary.frame();
        let Some(footprint) = SiteFootprint::from_boundary(boundary) else {
            return Ok(RoadDesign {
                network: RoadNetwork::default(),
                mode: DesignMode::Empty,
                frame,
                skipped: Default::default(),
            });
        };
        let bounds = boundary.bounds();
        let buffer = frame.meters_to_native(PRIMARY_BOUNDARY_BUFFER_M);
        let touches_boundary = |line: &LineString<f64>| footprint.touches_line(line, buffer);

        let mut builder = RoadNetworkBuilder::new(frame);
        self.build_primary(&mut builder, bounds, &footprint, &touches_boundary);
        cancel.check()?;

        let spacing = self.params.grid_spacing_m();
        let secondary = grid_lines(bounds, spacing, 0.0, &frame);
        push_grid(&mut builder, RoadTier::Secondary, secondary, terrain, &touches_boundary);
        let residential = grid_lines(bounds, spacing / 2.0, 0.0, &frame);
        push_grid(&mut builder, RoadTier::Residential, residential, terrain, &touches_boundary);
        cancel.check()?;

        let limits = self.params.limits;
        let major = [RoadTier::Primary, RoadTier::Secondary];
        builder.duplicate(&major, RoadTier::Pedestrian, limits.pedestrian_overlay);
        builder.duplicate(&major, RoadTier::Bike, limits.bike_overlay);
        builder.duplicate(&[RoadTier::Primary], RoadTier::Emergency, usize::MAX);
        builder.duplicate(&[RoadTier::Secondary], RoadTier::Emergency, BASIC_EMERGENCY_SECONDARY);

        let (network, skipped) = builder.finish(cancel)?;
        Ok(RoadDesign {
            network,
            mode: DesignMode::BasicGrid,
            frame,
            skipped,
        })
    }
}
