use serde_json::json;

use crate::analytics::{analyze, AnalysisInput, LosGrade, NetworkAnalysis};
use crate::cancel::CancelToken;
use crate::config::SQUARE_METERS_PER_HECTARE;
use crate::error::SiteError;
use crate::pipeline::{plan_site, SiteInputs};
use crate::test_harness::TestSite;

fn analyzed(site: &TestSite, cancel: &CancelToken) -> Result<NetworkAnalysis, SiteError> {
    let (subdivision, design) = site.plan();
    analyze(
        AnalysisInput {
            network: &design.network,
            parcels: &subdivision.parcels,
            area_hectares: subdivision.statistics.site_area_m2 / SQUARE_METERS_PER_HECTARE,
            frame: design.frame,
            params: &site.design,
        },
        cancel,
    )
}

// ====================================================================
// Analytics over planned sites
// ====================================================================

#[test]
fn test_planned_site_analytics_are_bounded() {
    let site = TestSite::square(600.0).with_target_area(900.0);
    let analysis = analyzed(&site, &CancelToken::new()).unwrap();

    let traffic = &analysis.traffic_analysis;
    assert!(traffic.peak_hour_demand > 0.0);
    let vc = traffic.volume_capacity_ratio.unwrap();
    assert!((vc - 0.15).abs() < 1e-12);
    assert_eq!(traffic.level_of_service, LosGrade::A);
    assert!(traffic.parcel_demand_vc_ratio.is_some());
    let graded: usize = traffic.los_distribution.values().sum();
    let vehicular: usize = analysis
        .network_statistics
        .segment_counts
        .iter()
        .filter(|(tier, _)| tier.is_vehicular())
        .map(|(_, n)| n)
        .sum();
    assert_eq!(graded, vehicular);

    let access = &analysis.accessibility_analysis;
    assert_eq!(access.sampled_parcels, 50);
    assert!((0.0..=100.0).contains(&access.accessibility_score));

    let cost = &analysis.cost_analysis;
    assert!((cost.total_construction - cost.road_construction - cost.features.total()).abs() < 1e-6);
    assert!((cost.lifecycle_cost_10yr - cost.total_construction * 1.3).abs() < 1e-3);

    let env = &analysis.environmental_analysis;
    assert!((0.0..=100.0).contains(&env.environmental_score));
    let safety = &analysis.safety_analysis;
    assert!((0.0..=100.0).contains(&safety.safety_score));
}

#[test]
fn test_analysis_honours_cancellation() {
    let site = TestSite::square(200.0).with_target_area(400.0);
    let cancel = CancelToken::new();
    cancel.cancel();
    assert!(matches!(analyzed(&site, &cancel), Err(SiteError::Cancelled)));
}

#[test]
fn test_plan_site_envelope_reports_everything() {
    let boundary = json!({
        "type": "Feature",
        "properties": {},
        "geometry": {
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [500.0, 0.0], [500.0, 500.0], [0.0, 500.0], [0.0, 0.0]]]
        }
    });
    let zoning = json!({"zones": [
        {"type": "commercial", "geometry": {
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [250.0, 0.0], [250.0, 500.0], [0.0, 500.0], [0.0, 0.0]]]
        }},
        {"type": "not-a-zone", "geometry": null}
    ]});
    let terrain = json!({"slope": {"average": 4.0}});
    let config = json!({"targetParcelArea": 625.0, "cornerLotRatio": 10});

    let response = plan_site(
        &SiteInputs {
            boundary: Some(&boundary),
            config: Some(&config),
            zoning: Some(&zoning),
            terrain: Some(&terrain),
            ..Default::default()
        },
        &CancelToken::new(),
    );
    assert_eq!(response["success"], true, "{response}");
    assert_eq!(response["statistics"]["total_parcels"], 400);
    assert_eq!(response["statistics"]["zone_distribution"]["commercial"], 200);
    // the unknown zone is skipped, not fatal
    assert_eq!(response["statistics"]["skipped_items"], 1);
    assert_eq!(response["skipped"]["items"][0]["stage"], "zoning");
    assert!(response["roads"]["primary"]["features"].as_array().unwrap().len() >= 1);
    assert!(response["safety_analysis"]["rating"].is_string());
}
