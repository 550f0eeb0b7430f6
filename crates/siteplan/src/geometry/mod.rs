//! Geometry plumbing shared by the parcelization engine and the road
//! synthesizer: boundary parsing, measurement helpers, an R-tree backed
//! spatial index and the site footprint that roads are routed against.

pub mod boundary;
pub mod footprint;
pub mod shapes;
pub mod spatial_index;

pub use boundary::{multipolygon_from_json, Boundary};
pub use footprint::SiteFootprint;
pub use shapes::{
    closest_point_on, coord_key, intersect_polygon, polygon_centroid, rect_polygon, CoordKey,
};
pub use spatial_index::{PointIndex, SpatialIndex};
