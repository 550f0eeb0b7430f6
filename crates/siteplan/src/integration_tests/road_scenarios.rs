use geo::coord;

use crate::inputs::{ConnectorMode, DesignParameters, PathfindingMode};
use crate::roads::{DesignMode, RoadTier};
use crate::test_harness::TestSite;

// ====================================================================
// Road design scenarios
// ====================================================================

#[test]
fn test_parcel_design_links_and_overlays() {
    let (subdivision, design) = TestSite::square(400.0).with_target_area(400.0).plan();
    let network = &design.network;
    assert_eq!(design.mode, DesignMode::Parcels);
    assert_eq!(subdivision.parcels.len(), 400);

    let connectors = network
        .tier(RoadTier::Secondary)
        .filter(|s| s.algorithm == "Dijkstra")
        .count();
    assert!(connectors > 0);
    for local in network.tier(RoadTier::Local) {
        assert_eq!(local.algorithm, "nearest-road");
        assert!(local.length_m < site_max_distance());
    }
    assert_eq!(
        network.tier_count(RoadTier::Emergency),
        network.tier_count(RoadTier::Primary) + network.tier_count(RoadTier::Secondary)
    );
    assert!(network.tier_count(RoadTier::Pedestrian) <= 10);
    assert!(network.tier_count(RoadTier::Bike) <= 5);
}

fn site_max_distance() -> f64 {
    DesignParameters::default().max_distance_to_road
}

#[test]
fn test_alternative_strategies_on_l_shape() {
    let design = DesignParameters {
        pathfinding: PathfindingMode::GridAstar,
        connector: ConnectorMode::ShortestPath,
        ..DesignParameters::default()
    };
    let (_, roads) = TestSite::l_shape(400.0)
        .with_target_area(1600.0)
        .with_design(design)
        .plan();
    assert!(roads.network.tier_count(RoadTier::Primary) > 0);
    for primary in roads.network.tier(RoadTier::Primary) {
        assert_eq!(primary.algorithm, "A* (grid)");
    }
    assert!(roads
        .network
        .tier(RoadTier::Secondary)
        .all(|s| s.algorithm == "shortest-path" || s.algorithm == "grid"));
}

#[test]
fn test_unsuitable_strip_removes_crossing_grid_roads() {
    let site = TestSite::square(1000.0)
        .with_target_area(2500.0)
        .with_unsuitable(coord! { x: 0.0, y: 590.0 }, coord! { x: 1000.0, y: 610.0 });
    let (_, design) = site.plan();
    let terrain = site.terrain.as_ref().unwrap();
    for road in design.network.tier(RoadTier::Secondary) {
        if road.algorithm == "grid" {
            assert!(!terrain.crosses_unsuitable(&road.geometry));
        }
    }
}

#[test]
fn test_geographic_plan_has_metric_lengths() {
    let (_, design) = TestSite::geographic_square(34.78, 32.08, 0.005).plan();
    assert!(design.frame.is_geographic);
    for primary in design.network.tier(RoadTier::Primary) {
        // 0.005° is ~472 m west-east and ~557 m south-north at 32°N
        assert!(primary.length_m > 400.0 && primary.length_m < 600.0, "{}", primary.length_m);
    }
}
