//! Site parcelization, road network synthesis and network analytics.
//!
//! [`pipeline`] holds the entry points; the engines live in [`parcels`],
//! [`roads`] and [`analytics`].

pub mod analytics;
pub mod cancel;
pub mod config;
pub mod coordinate_frame;
pub mod error;
pub mod geometry;
pub mod inputs;
pub mod parcels;
pub mod pipeline;
pub mod roads;
pub mod serializer;
pub mod site_rng;

#[cfg(test)]
pub mod test_harness;

pub use cancel::CancelToken;
pub use error::{GeometryError, SiteError, SkipReport};
pub use geometry::Boundary;
pub use inputs::{DesignParameters, SubdivisionConfig, SubdivisionMethod, TerrainData, ZoneType, ZoningData};
pub use parcels::{subdivide, Parcel, SiteContext, Subdivision};
pub use pipeline::{design_road_network, plan, plan_site, subdivide_land, SiteInputs, SitePlan};
pub use roads::{RoadNetwork, RoadSynthesizer, RoadTier};
pub use site_rng::SiteRng;
