pub const METERS_PER_DEGREE: f64 = 111_320.0;
pub const GEOGRAPHIC_MAX_EXTENT_DEG: f64 = 10.0;
pub const MAX_LONGITUDE: f64 = 180.0;
pub const MAX_LATITUDE: f64 = 90.0;

pub const DEFAULT_MIN_AREA: f64 = 200.0;
pub const DEFAULT_MAX_AREA: f64 = 5_000.0;
pub const COMMERCIAL_AREA_FACTOR: f64 = 1.2;
pub const INDUSTRIAL_AREA_FACTOR: f64 = 1.3;
pub const STEEP_SLOPE_AREA_FACTOR: f64 = 1.2;
/// Average terrain slope (degrees) above which parcel bounds are widened.
pub const STEEP_SLOPE_DEG: f64 = 15.0;

/// Boundary-crossing cells smaller than this fraction of `min_area` are dropped
/// before the area filter runs.
pub const EDGE_CELL_MIN_FRACTION: f64 = 0.5;

/// Upper bound on grid cells or Voronoi seeds for one subdivision call.
pub const MAX_CELLS: usize = 250_000;

pub const VORONOI_MIN_SEEDS: usize = 4;
pub const VORONOI_ATTEMPT_FACTOR: usize = 10;

/// Parcels with this many touching neighbours or fewer are corner lots.
pub const CORNER_LOT_MAX_NEIGHBORS: usize = 2;

pub const DEFAULT_ROAD_ACCESS_PERCENTAGE: f64 = 100.0;
pub const DEFAULT_CORNER_LOT_RATIO: f64 = 20.0;

pub const PRIMARY_PARCEL_BUFFER_M: f64 = 50.0;
pub const PRIMARY_BOUNDARY_BUFFER_M: f64 = 10.0;
pub const DEFAULT_SECONDARY_SPACING_M: f64 = 200.0;
pub const DEFAULT_MAX_DISTANCE_TO_ROAD_M: f64 = 100.0;
pub const CONNECTOR_THRESHOLD_M: f64 = 200.0;
/// Grid lines per axis are capped at this count.
pub const MAX_GRID_LINES: usize = 2_000;

pub const DEFAULT_CONNECTOR_PARCELS: usize = 50;
pub const DEFAULT_LOCAL_PARCELS: usize = 100;
pub const DEFAULT_PEDESTRIAN_OVERLAY: usize = 10;
pub const DEFAULT_BIKE_OVERLAY: usize = 5;
pub const DEFAULT_ACCESSIBILITY_SAMPLE: usize = 50;
/// Secondary grid roads kept as emergency routes when no parcels exist.
pub const BASIC_EMERGENCY_SECONDARY: usize = 2;

/// Vertex keys round coordinates to 1/scale native units.
pub const GEOGRAPHIC_KEY_SCALE: f64 = 1e6;
pub const PROJECTED_KEY_SCALE: f64 = 1e2;

pub const SQUARE_METERS_PER_HECTARE: f64 = 10_000.0;

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

/// Share of hourly capacity used as the peak-hour figure.
pub const PEAK_HOUR_FACTOR: f64 = 0.15;
/// Daily capacity as a multiple of hourly capacity.
pub const DAILY_CAPACITY_FACTOR: f64 = 10.0;
/// Peak-hour trips generated per parcel.
pub const TRIPS_PER_PARCEL: f64 = 1.0;
/// Average on-site trip length in km.
pub const AVERAGE_TRIP_KM: f64 = 0.5;
pub const DAYS_PER_YEAR: f64 = 365.0;

pub const BIKE_LANE_COST_PER_KM: f64 = 40_000.0;
pub const SIDEWALK_COST_PER_KM_PER_SIDE: f64 = 25_000.0;
pub const MEDIAN_COST_PER_KM: f64 = 80_000.0;
pub const STREET_TREE_COST: f64 = 300.0;
pub const STREET_TREE_SPACING_M: f64 = 10.0;
pub const ANNUAL_MAINTENANCE_RATE: f64 = 0.03;
pub const LIFECYCLE_YEARS: f64 = 10.0;

pub const CONSTRUCTION_CO2_TONNES_PER_KM: f64 = 500.0;
pub const OPERATION_CO2_KG_PER_VEHICLE_KM: f64 = 0.15;
pub const TREE_SEQUESTRATION_KG_PER_YEAR: f64 = 20.0;

/// Crashes per million vehicle-km.
pub const CRASHES_PER_MILLION_VKM: f64 = 3.0;
/// Intersections per km above which a safety recommendation is raised.
pub const HIGH_INTERSECTION_DENSITY: f64 = 4.0;
/// Two road ends closer than this (meters) meet at the same node.
pub const NODE_TOLERANCE_M: f64 = 0.05;
