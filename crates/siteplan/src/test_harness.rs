//! # TestSite: builder harness for layout tests
//!
//! Wraps a boundary plus optional zoning, terrain and configuration so tests
//! can describe a site in a few chained calls and then run the subdivision or
//! road design on it.

use geo::{coord, Coord, LineString, MultiPolygon, Polygon};

use crate::cancel::CancelToken;
use crate::geometry::{rect_polygon, Boundary};
use crate::inputs::{
    DesignParameters, SlopeSummary, SubdivisionConfig, SubdivisionMethod, TerrainData, Zone,
    ZoneType, ZoningData,
};
use crate::parcels::{subdivide, Parcel, SiteContext, Subdivision};
use crate::roads::{RoadDesign, RoadSynthesizer};
use crate::site_rng::SiteRng;

/// A site under test.
pub struct TestSite {
    pub boundary: Boundary,
    pub config: SubdivisionConfig,
    pub design: DesignParameters,
    pub zoning: Option<ZoningData>,
    pub terrain: Option<TerrainData>,
    pub cancel: CancelToken,
}

impl TestSite {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    pub fn from_boundary(boundary: Boundary) -> Self {
        Self {
            boundary,
            config: SubdivisionConfig::default().with_method(SubdivisionMethod::Grid),
            design: DesignParameters::default(),
            zoning: None,
            terrain: None,
            cancel: CancelToken::new(),
        }
    }

    /// Projected `width` x `height` meter rectangle with its corner at the
    /// origin.
    pub fn rectangle(width: f64, height: f64) -> Self {
        let boundary = Boundary::from_polygon(rect_polygon(
            coord! { x: 0.0, y: 0.0 },
            coord! { x: width, y: height },
        ))
        .expect("valid rectangle");
        Self::from_boundary(boundary)
    }

    pub fn square(size: f64) -> Self {
        Self::rectangle(size, size)
    }

    /// Lon/lat square of `size_deg` degrees with its south-west corner at
    /// (`lon`, `lat`).
    pub fn geographic_square(lon: f64, lat: f64, size_deg: f64) -> Self {
        let boundary = Boundary::from_polygon(rect_polygon(
            coord! { x: lon, y: lat },
            coord! { x: lon + size_deg, y: lat + size_deg },
        ))
        .expect("valid geographic square");
        Self::from_boundary(boundary)
    }

    /// L-shaped site: a `size` square with its upper-right quadrant removed.
    pub fn l_shape(size: f64) -> Self {
        let half = size / 2.0;
        let ring: Vec<Coord<f64>> = vec![
            coord! { x: 0.0, y: 0.0 },
            coord! { x: size, y: 0.0 },
            coord! { x: size, y: half },
            coord! { x: half, y: half },
            coord! { x: half, y: size },
            coord! { x: 0.0, y: size },
        ];
        let boundary = Boundary::from_polygon(Polygon::new(LineString::new(ring), vec![]))
            .expect("valid L shape");
        Self::from_boundary(boundary)
    }

    // -----------------------------------------------------------------------
    // Builder methods
    // -----------------------------------------------------------------------

    pub fn with_method(mut self, method: SubdivisionMethod) -> Self {
        self.config.method = method;
        self
    }

    pub fn with_target_area(mut self, area: f64) -> Self {
        self.config.target_parcel_area = Some(area);
        self
    }

    pub fn with_area_bounds(mut self, min_area: f64, max_area: f64) -> Self {
        self.config.min_area = Some(min_area);
        self.config.max_area = Some(max_area);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn with_config(mut self, config: SubdivisionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_design(mut self, design: DesignParameters) -> Self {
        self.design = design;
        self
    }

    /// Add a rectangular zone.
    pub fn with_zone(mut self, zone_type: ZoneType, min: Coord<f64>, max: Coord<f64>) -> Self {
        let zone = Zone::new(zone_type, MultiPolygon::new(vec![rect_polygon(min, max)]));
        self.zoning.get_or_insert_with(ZoningData::default).zones.push(zone);
        self
    }

    /// Add a rectangular unsuitable terrain area.
    pub fn with_unsuitable(mut self, min: Coord<f64>, max: Coord<f64>) -> Self {
        self.terrain
            .get_or_insert_with(TerrainData::default)
            .unsuitable_areas
            .push(MultiPolygon::new(vec![rect_polygon(min, max)]));
        self
    }

    pub fn with_slope(mut self, average: f64) -> Self {
        self.terrain.get_or_insert_with(TerrainData::default).slope = Some(SlopeSummary {
            average,
            maximum: None,
        });
        self
    }

    // -----------------------------------------------------------------------
    // Running
    // -----------------------------------------------------------------------

    pub fn context(&self) -> SiteContext<'_> {
        SiteContext {
            zoning: self.zoning.as_ref(),
            terrain: self.terrain.as_ref(),
        }
    }

    /// RNG for this site: the configured seed, else the default seed.
    pub fn rng(&self) -> SiteRng {
        self.config
            .seed
            .map(SiteRng::from_seed_u64)
            .unwrap_or_default()
    }

    pub fn subdivide(&self) -> Subdivision {
        subdivide(
            &self.boundary,
            &self.config,
            self.context(),
            &mut self.rng(),
            &self.cancel,
        )
        .expect("subdivision succeeds")
    }

    /// Design roads for `parcels` with this site's boundary and layers.
    pub fn design_roads(&self, parcels: &[Parcel]) -> RoadDesign {
        RoadSynthesizer::new(self.design.clone())
            .design(parcels, Some(&self.boundary), self.context(), &self.cancel)
            .expect("road design succeeds")
    }

    /// Subdivide, then design roads for the result.
    pub fn plan(&self) -> (Subdivision, RoadDesign) {
        let subdivision = self.subdivide();
        let design = self.design_roads(&subdivision.parcels);
        (subdivision, design)
    }
}
