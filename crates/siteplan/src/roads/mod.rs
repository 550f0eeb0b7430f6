//! Road network synthesis: tiers, segments, routing and connection
//! strategies.

pub mod basic_grid;
pub mod connector;
pub mod layout;
pub mod pathfinder;
pub mod segment;
pub mod synthesizer;
pub mod tier;


pub use connector::{Connection, ConnectionStrategy, NearestVertexConnector, RoadGraph, ShortestPathConnector};
pub use pathfinder::{DirectPathfinder, GridAStarPathfinder, PathfindingStrategy};
pub use segment::{RoadNetwork, RoadNetworkBuilder, RoadSegment, SegmentId};
pub use synthesizer::{DesignMode, RoadDesign, RoadSynthesizer};
pub use tier::RoadTier;
