use geo::{coord, LineString};

use super::*;
use crate::cancel::CancelToken;
use crate::coordinate_frame::CoordinateFrame;
use crate::inputs::DesignParameters;
use crate::roads::{RoadNetworkBuilder, RoadTier};
use crate::test_harness::TestSite;

fn line(points: &[(f64, f64)]) -> LineString<f64> {
    LineString::new(points.iter().map(|&(x, y)| coord! { x: x, y: y }).collect())
}

fn network_of(segments: &[(RoadTier, &[(f64, f64)])]) -> RoadNetwork {
    let mut builder = RoadNetworkBuilder::new(CoordinateFrame::projected());
    for (tier, points) in segments {
        builder.push(*tier, line(points), "test");
    }
    builder.finish(&CancelToken::new()).unwrap().0
}

/// 1000 m square with the boundary-only grid: 18 km of vehicular road.
fn basic_grid_analysis() -> NetworkAnalysis {
    let site = TestSite::square(1000.0);
    let design = site.design_roads(&[]);
    let params = DesignParameters::default();
    analyze(
        AnalysisInput {
            network: &design.network,
            parcels: &[],
            area_hectares: 100.0,
            frame: design.frame,
            params: &params,
        },
        &CancelToken::new(),
    )
    .unwrap()
}

// ---------------------------------------------------------------------------
// Network statistics
// ---------------------------------------------------------------------------

#[test]
fn test_basic_grid_lengths_and_intersections() {
    let stats = basic_grid_analysis().network_statistics;
    assert!((stats.total_road_length_km - 18.0).abs() < 1e-9);
    // pedestrian 10 km + bike 5 km + emergency 4 km
    assert!((stats.overlay_length_km - 19.0).abs() < 1e-9);
    // nine verticals cross nine horizontals
    assert_eq!(stats.intersection_count, 81);
    assert!((stats.road_density_km_per_ha - 0.18).abs() < 1e-9);
    assert_eq!(stats.segment_counts[&RoadTier::Local], 0);
    assert_eq!(stats.tier_lengths_km.len(), 4);
    assert!((stats.overlay_lengths_km[&RoadTier::Pedestrian] - 10.0).abs() < 1e-9);
    assert!(!stats.tier_lengths_km.contains_key(&RoadTier::Bike));
}

#[test]
fn test_empty_tier_length_is_positive_zero() {
    let stats = basic_grid_analysis().network_statistics;
    let local = stats.tier_lengths_km[&RoadTier::Local];
    assert_eq!(local, 0.0);
    assert!(local.is_sign_positive());
    let json = serde_json::to_string(&stats.tier_lengths_km).unwrap();
    assert!(json.contains("\"local\":0.0"), "{json}");
    assert!(!json.contains("-0.0"));
}

#[test]
fn test_duplicate_geometry_is_not_an_intersection() {
    let network = network_of(&[
        (RoadTier::Primary, &[(0.0, 0.0), (100.0, 0.0)]),
        (RoadTier::Secondary, &[(0.0, 0.0), (100.0, 0.0)]),
    ]);
    assert_eq!(count_intersections_of(&network), 0);
}

fn count_intersections_of(network: &RoadNetwork) -> usize {
    network_stats::count_intersections(network, &CancelToken::new()).unwrap()
}

#[test]
fn test_node_degrees() {
    // T junction: a local road ends on the middle of a secondary.
    let network = network_of(&[
        (RoadTier::Secondary, &[(0.0, 0.0), (200.0, 0.0)]),
        (RoadTier::Local, &[(100.0, 0.0), (100.0, 100.0)]),
    ]);
    let stats = NetworkStatistics::compute(&network, &CoordinateFrame::projected(), 1.0, &CancelToken::new())
        .unwrap();
    assert_eq!(stats.nodes.node_count, 4);
    assert_eq!(stats.nodes.max_degree, 3);
    assert_eq!(stats.nodes.dead_ends, 3);
    assert!(stats.hierarchy_violations.is_empty());
}

#[test]
fn test_hierarchy_violation_residential_on_primary() {
    let network = network_of(&[
        (RoadTier::Primary, &[(0.0, 0.0), (100.0, 0.0)]),
        (RoadTier::Residential, &[(100.0, 0.0), (100.0, 100.0)]),
    ]);
    let stats = NetworkStatistics::compute(&network, &CoordinateFrame::projected(), 1.0, &CancelToken::new())
        .unwrap();
    assert_eq!(stats.hierarchy_violations.len(), 1);
    let violation = &stats.hierarchy_violations[0];
    assert_eq!(violation.low_tier, RoadTier::Residential);
    assert_eq!(violation.high_tier, RoadTier::Primary);
    assert_eq!(violation.levels_skipped, 2);
    assert_eq!(violation.node, [100.0, 0.0]);
}

// ---------------------------------------------------------------------------
// Traffic
// ---------------------------------------------------------------------------

#[test]
fn test_traffic_without_parcels_uses_peak_hour_share() {
    let traffic = basic_grid_analysis().traffic_analysis;
    // 2 km x 2000 + 8 km x 1200 + 8 km x 300
    assert!((traffic.total_capacity_vph - 16_000.0).abs() < 1e-6);
    assert!((traffic.peak_hour_traffic_vph - 2_400.0).abs() < 1e-6);
    assert!((traffic.peak_hour_demand - 2_400.0).abs() < 1e-6);
    assert!((traffic.volume_capacity_ratio.unwrap() - 0.15).abs() < 1e-12);
    assert!((traffic.daily_capacity - 160_000.0).abs() < 1e-6);
    assert_eq!(traffic.level_of_service, LosGrade::A);
    assert_eq!(traffic.level_of_service_label, "LOS A (Free Flow)");
    assert_eq!(traffic.congested_percentage, 0.0);
    assert!((traffic.annual_vehicle_km - 4_380_000.0).abs() < 1e-3);
}

#[test]
fn test_traffic_parcel_demand_on_a_short_road() {
    let subdivision = TestSite::square(200.0).with_target_area(400.0).subdivide();
    // 0.1 km residential: 30 vph for 100 parcel trips.
    let network = network_of(&[(RoadTier::Residential, &[(0.0, 0.0), (100.0, 0.0)])]);
    let traffic = TrafficAnalysis::compute(&network, &subdivision.parcels, &CoordinateFrame::projected(), 0);
    assert_eq!(traffic.peak_hour_demand, 100.0);
    assert_eq!(traffic.parcel_demand_los, LosGrade::F);
    assert!((traffic.parcel_demand_vc_ratio.unwrap() - 100.0 / 30.0).abs() < 1e-9);
    // The network grade is the peak-hour share of capacity regardless of parcels.
    assert!((traffic.volume_capacity_ratio.unwrap() - 0.15).abs() < 1e-12);
    assert_eq!(traffic.level_of_service, LosGrade::A);
    assert_eq!(traffic.los_distribution[&LosGrade::F], 1);
    assert_eq!(traffic.congested_percentage, 100.0);
}

// ---------------------------------------------------------------------------
// Accessibility
// ---------------------------------------------------------------------------

#[test]
fn test_accessibility_half_the_parcels_within_threshold() {
    let subdivision = TestSite::square(200.0).with_target_area(400.0).subdivide();
    let network = network_of(&[(RoadTier::Local, &[(0.0, 0.0), (200.0, 0.0)])]);
    let access = AccessibilityAnalysis::compute(
        &network,
        &subdivision.parcels,
        &CoordinateFrame::projected(),
        100.0,
        100,
    );
    // centroid rows at y = 10, 30, ..., 190
    assert_eq!(access.sampled_parcels, 100);
    assert_eq!(access.accessible_parcels, 50);
    assert!((access.accessibility_score - 50.0).abs() < 1e-9);
    assert!((access.average_distance_m - 100.0).abs() < 1e-6);
    assert!((access.max_distance_m - 190.0).abs() < 1e-6);
}

#[test]
fn test_nearest_road_is_measured_in_meters_at_high_latitude() {
    // At 70°N the road 0.0006° east (~23 m) is nearer than the one 0.0003°
    // north (~33 m).
    let frame = CoordinateFrame::geographic(70.0);
    let mut builder = RoadNetworkBuilder::new(frame);
    builder.push(RoadTier::Local, line(&[(20.0006, 69.9995), (20.0006, 70.0005)]), "test");
    builder.push(RoadTier::Local, line(&[(19.9995, 70.0003), (20.0005, 70.0003)]), "test");
    let network = builder.finish(&CancelToken::new()).unwrap().0;

    let locator = RoadLocator::vehicular(&network, frame);
    let (segment, distance_m) = locator.nearest(coord! { x: 20.0, y: 70.0 }).unwrap();
    assert_eq!(segment.geometry.0[0].x, 20.0006);
    let expected = 0.0006 * frame.lon_meters_per_degree;
    assert!((distance_m - expected).abs() < 1e-6, "got {distance_m}");
}

#[test]
fn test_accessibility_without_parcels() {
    let network = network_of(&[(RoadTier::Local, &[(0.0, 0.0), (200.0, 0.0)])]);
    let access = AccessibilityAnalysis::compute(&network, &[], &CoordinateFrame::projected(), 100.0, 50);
    assert_eq!(access.sampled_parcels, 0);
    assert_eq!(access.accessibility_score, 0.0);
}

// ---------------------------------------------------------------------------
// Cost
// ---------------------------------------------------------------------------

#[test]
fn test_cost_of_one_km_primary() {
    let network = network_of(&[(RoadTier::Primary, &[(0.0, 0.0), (1000.0, 0.0)])]);
    let cost = CostAnalysis::compute(&network, &DesignParameters::default(), 10, 5.0);
    assert!((cost.road_construction - 500_000.0).abs() < 1e-6);
    assert!((cost.features.bike_lanes - 40_000.0).abs() < 1e-6);
    assert!((cost.features.sidewalks - 50_000.0).abs() < 1e-6);
    assert_eq!(cost.features.medians, 0.0);
    // 100 trees at 10 m spacing
    assert!((cost.features.street_trees - 30_000.0).abs() < 1e-6);
    assert!((cost.total_construction - 620_000.0).abs() < 1e-6);
    assert!((cost.annual_maintenance - 18_600.0).abs() < 1e-6);
    assert!((cost.lifecycle_cost_10yr - 806_000.0).abs() < 1e-6);
    assert!((cost.cost_per_parcel - 62_000.0).abs() < 1e-6);
    assert!((cost.cost_per_hectare - 124_000.0).abs() < 1e-6);
}

#[test]
fn test_disabled_features_cost_nothing() {
    let network = network_of(&[(RoadTier::Primary, &[(0.0, 0.0), (1000.0, 0.0)])]);
    let params = DesignParameters {
        bike_lanes: false,
        sidewalks: false,
        street_trees: false,
        medians: true,
        ..DesignParameters::default()
    };
    let cost = CostAnalysis::compute(&network, &params, 0, 0.0);
    assert_eq!(cost.features.bike_lanes, 0.0);
    assert_eq!(cost.features.sidewalks, 0.0);
    assert!((cost.features.medians - 80_000.0).abs() < 1e-6);
    assert_eq!(cost.cost_per_parcel, 0.0);
    assert_eq!(cost.cost_per_hectare, 0.0);
}

#[test]
fn test_emergency_routes_cost_nothing() {
    let network = network_of(&[(RoadTier::Emergency, &[(0.0, 0.0), (1000.0, 0.0)])]);
    let cost = CostAnalysis::compute(&network, &DesignParameters::default(), 1, 1.0);
    assert_eq!(cost.road_construction, 0.0);
}

// ---------------------------------------------------------------------------
// Environmental
// ---------------------------------------------------------------------------

#[test]
fn test_environmental_basic_grid() {
    let env = basic_grid_analysis().environmental_analysis;
    // 24 000 + 72 000 + 40 000 + 20 000 + 7 500 m², emergency excluded
    assert!((env.impervious_area_m2 - 163_500.0).abs() < 1e-6);
    assert!((env.impervious_percentage - 16.35).abs() < 1e-9);
    assert!((env.construction_co2_tonnes - 9_000.0).abs() < 1e-6);
    assert_eq!(env.street_trees, 1_800.0);
    // CO2 penalty saturates at 50
    assert!((env.environmental_score - 17.3).abs() < 1e-6);
}

#[test]
fn test_environmental_score_floor_and_sequestration_credit() {
    let network = network_of(&[(RoadTier::Local, &[(0.0, 0.0), (1000.0, 0.0)])]);
    let env = EnvironmentalAnalysis::compute(&network, &DesignParameters::default(), 1000.0, 0.0);
    // sequestration only: 100 trees offset 2 t, so the CO2 term adds 0.2
    assert!((env.annual_co2_tonnes + 2.0).abs() < 1e-9);
    // 6000 m2 on 1000 ha is 0.06 % impervious
    assert!((env.environmental_score - 100.08).abs() < 1e-9);

    let tiny = EnvironmentalAnalysis::compute(&network, &DesignParameters::default(), 0.1, 1e9);
    assert_eq!(tiny.environmental_score, 0.0);
}

// ---------------------------------------------------------------------------
// Safety
// ---------------------------------------------------------------------------

#[test]
fn test_safety_basic_grid() {
    let safety = basic_grid_analysis().safety_analysis;
    assert!((safety.intersection_density - 4.5).abs() < 1e-9);
    // local tier missing
    assert!((safety.hierarchy_score - 200.0 / 3.0).abs() < 1e-9);
    assert!((safety.estimated_annual_crashes - 13.14).abs() < 1e-6);
    assert_eq!(safety.rating, SafetyRating::Fair);
    assert!(safety
        .recommendations
        .iter()
        .any(|r| r.contains("intersection density")));
    assert!(safety.recommendations.iter().any(|r| r.contains("local")));
}

#[test]
fn test_safety_rating_bands() {
    assert_eq!(SafetyRating::from_score(80.0), SafetyRating::Excellent);
    assert_eq!(SafetyRating::from_score(79.9), SafetyRating::Good);
    assert_eq!(SafetyRating::from_score(40.0), SafetyRating::Fair);
    assert_eq!(SafetyRating::from_score(39.9), SafetyRating::Poor);
}

#[test]
fn test_analysis_serializes_tier_keys_as_names() {
    let json = serde_json::to_value(basic_grid_analysis()).unwrap();
    assert!(json["network_statistics"]["tier_lengths_km"]["primary"].is_number());
    assert_eq!(json["safety_analysis"]["rating"], "fair");
    assert_eq!(json["traffic_analysis"]["level_of_service"], "A");
}
