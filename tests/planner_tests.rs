//! End-to-end planning over the Bengaluru - Chennai corridor with fake
//! collaborators and straight-line routing.

mod fixtures;

use ev_trip_planner::catalog::{InMemoryCatalog, PopularRoute};
use ev_trip_planner::haversine::HaversineRouter;
use ev_trip_planner::model::{Infeasibility, VerifiedRouteEntry};
use ev_trip_planner::selector::StationSources;
use ev_trip_planner::traits::RoadRouter;
use ev_trip_planner::{PlanSource, PlannerError, TripPlanner, TripRequest};

use fixtures::{
    BENGALURU, CHENNAI, FailingDirectory, FixedGeocoder, RecordingDirectory, TestStation,
    WAYPOINT_TOWNS, verified_entry,
};

fn town(name: &str) -> &'static fixtures::Location {
    WAYPOINT_TOWNS
        .iter()
        .find(|town| town.name == name)
        .expect("known corridor town")
}

fn town_entry(name: &str, km: f64) -> VerifiedRouteEntry {
    verified_entry(
        TestStation::new(&name.to_lowercase(), town(name).coords())
            .connector(60.0)
            .build(),
        km,
    )
}

fn corridor_catalog(entries: Vec<VerifiedRouteEntry>) -> InMemoryCatalog {
    let route = PopularRoute {
        route_id: "blr-maa".to_string(),
        name: "Bangalore to Chennai".to_string(),
        start_city: "Bangalore".to_string(),
        end_city: "Chennai".to_string(),
        keywords: vec!["bangalore".to_string(), "chennai".to_string(), "madras".to_string()],
        start_keywords: Vec::new(),
        end_keywords: vec!["madras".to_string()],
        distance_km: 290.0,
        stations: entries,
    };
    InMemoryCatalog::new(vec![route], Vec::new())
}

fn blr_to_maa(current: f64, max: f64) -> TripRequest {
    TripRequest::new(BENGALURU.name, CHENNAI.name, current, max)
}

// ============================================================================
// Verified routes
// ============================================================================

#[test]
fn catalog_route_uses_verified_stations() {
    let geocoder = FixedGeocoder::corridor();
    let router = HaversineRouter::default();
    let directory = RecordingDirectory::empty("primary");
    let catalog = corridor_catalog(vec![town_entry("Hosur", 70.0), town_entry("Vellore", 200.0)]);

    let planner = TripPlanner::new(&geocoder, &router, StationSources::new(&directory))
        .with_catalog(&catalog);
    let itinerary = planner.plan_trip(&blr_to_maa(150.0, 300.0)).unwrap();

    assert_eq!(itinerary.source, PlanSource::VerifiedRoute);
    assert!(itinerary.plan.is_possible);
    assert_eq!(itinerary.plan.stops.len(), 1);
    assert_eq!(itinerary.plan.stops[0].station.id, "hosur");
    assert!(directory.radii().is_empty());

    let segments = &itinerary.segments;
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].from_label, "Start");
    assert_eq!(segments[0].to_label, "hosur");
    assert_eq!(segments[1].to_label, "Destination");
    let label = segments[0].range_at_arrival_label.as_deref().unwrap();
    assert!(label.starts_with('~') && label.ends_with("km remaining"), "{}", label);
    assert!(segments[1].range_at_arrival_label.is_none());

    let direct = router.route(itinerary.start, itinerary.destination).unwrap();
    assert!(itinerary.route.distance_km >= direct.distance_km);
}

#[test]
fn reversed_trip_mirrors_catalog_distances() {
    let geocoder = FixedGeocoder::corridor();
    let router = HaversineRouter::default();
    let directory = RecordingDirectory::empty("primary");
    let catalog = corridor_catalog(vec![town_entry("Hosur", 70.0), town_entry("Vellore", 200.0)]);

    let planner = TripPlanner::new(&geocoder, &router, StationSources::new(&directory))
        .with_catalog(&catalog);
    let request = TripRequest::new(CHENNAI.name, BENGALURU.name, 150.0, 300.0);
    let itinerary = planner.plan_trip(&request).unwrap();

    assert_eq!(itinerary.source, PlanSource::VerifiedRoute);
    assert_eq!(itinerary.plan.stops.len(), 1);
    let stop = &itinerary.plan.stops[0];
    assert_eq!(stop.station.id, "vellore");
    assert_eq!(stop.distance_from_start_km, 90.0);
}

#[test]
fn reversed_trip_named_by_alias_starts_near_chennai() {
    let geocoder = FixedGeocoder::new(&[
        ("Madras", CHENNAI.coords()),
        (BENGALURU.name, BENGALURU.coords()),
    ]);
    let router = HaversineRouter::default();
    let directory = RecordingDirectory::empty("primary");
    let catalog = corridor_catalog(vec![town_entry("Hosur", 70.0), town_entry("Vellore", 200.0)]);

    let planner = TripPlanner::new(&geocoder, &router, StationSources::new(&directory))
        .with_catalog(&catalog);
    let itinerary = planner
        .plan_trip(&TripRequest::new("Madras", BENGALURU.name, 150.0, 300.0))
        .unwrap();

    assert!(itinerary.plan.is_possible);
    let stop = &itinerary.plan.stops[0];
    assert_eq!(stop.station.id, "vellore");
    // The first leg really is drivable on the 150 km the car has.
    let first_leg = &itinerary.segments[0];
    assert!(first_leg.distance_km < 150.0, "{}", first_leg.distance_km);
}

#[test]
fn unknown_pair_falls_back_to_discovery() {
    let geocoder = FixedGeocoder::corridor();
    let router = HaversineRouter::default();
    let directory = RecordingDirectory::empty("primary");
    let catalog = corridor_catalog(vec![town_entry("Hosur", 70.0)]);

    let planner = TripPlanner::new(&geocoder, &router, StationSources::new(&directory))
        .with_catalog(&catalog);
    let itinerary = planner
        .plan_trip(&TripRequest::new("Hosur", "Vellore", 400.0, 400.0))
        .unwrap();

    assert_eq!(itinerary.source, PlanSource::Discovery);
    assert!(itinerary.plan.is_possible);
}

// ============================================================================
// Discovery
// ============================================================================

#[test]
fn discovery_places_stop_ahead_on_the_road() {
    let geocoder = FixedGeocoder::corridor();
    let router = HaversineRouter::default();
    let direct = router.route(BENGALURU.coords(), CHENNAI.coords()).unwrap();
    // A few km past the 170 km mark.
    let near_target = direct.polyline.points()[175];
    let directory = RecordingDirectory::new(
        "primary",
        vec![TestStation::new("ambur-plaza", near_target).connector(60.0).build()],
    );

    let planner = TripPlanner::new(&geocoder, &router, StationSources::new(&directory));
    let itinerary = planner.plan_trip(&blr_to_maa(200.0, 300.0)).unwrap();

    assert_eq!(itinerary.source, PlanSource::Discovery);
    assert!(itinerary.plan.is_possible);
    assert_eq!(itinerary.plan.stops.len(), 1);
    assert_eq!(itinerary.plan.stops[0].station.id, "ambur-plaza");
    assert_eq!(directory.radii(), vec![30.0]);

    let labels: Vec<_> = itinerary
        .segments
        .iter()
        .map(|s| (s.from_label.as_str(), s.to_label.as_str()))
        .collect();
    assert_eq!(
        labels,
        vec![("Start", "ambur-plaza"), ("ambur-plaza", "Destination")]
    );
}

#[test]
fn reachable_trip_has_no_stops_and_no_segments() {
    let geocoder = FixedGeocoder::corridor();
    let router = HaversineRouter::default();
    let directory = RecordingDirectory::empty("primary");

    let planner = TripPlanner::new(&geocoder, &router, StationSources::new(&directory));
    let itinerary = planner.plan_trip(&blr_to_maa(400.0, 400.0)).unwrap();

    assert!(itinerary.plan.is_possible);
    assert!(itinerary.plan.stops.is_empty());
    assert!(itinerary.segments.is_empty());
    assert!(directory.radii().is_empty());
    assert!(itinerary.route.distance_km > 250.0 && itinerary.route.distance_km < 320.0);
}

// ============================================================================
// Infeasible trips
// ============================================================================

#[test]
fn empty_battery_returns_direct_route_with_reason() {
    let geocoder = FixedGeocoder::corridor();
    let router = HaversineRouter::default();
    let directory = RecordingDirectory::empty("primary");

    let planner = TripPlanner::new(&geocoder, &router, StationSources::new(&directory));
    let itinerary = planner.plan_trip(&blr_to_maa(0.0, 300.0)).unwrap();

    assert!(!itinerary.plan.is_possible);
    assert_eq!(itinerary.plan.infeasibility, Some(Infeasibility::NoCurrentRange));
    assert!(itinerary.segments.is_empty());
    let direct = router.route(itinerary.start, itinerary.destination).unwrap();
    assert_eq!(itinerary.route, direct);
}

#[test]
fn catalog_gap_is_reported_not_raised() {
    let geocoder = FixedGeocoder::corridor();
    let router = HaversineRouter::default();
    let directory = RecordingDirectory::empty("primary");
    let catalog = corridor_catalog(vec![town_entry("Vellore", 200.0)]);

    let planner = TripPlanner::new(&geocoder, &router, StationSources::new(&directory))
        .with_catalog(&catalog);
    let itinerary = planner.plan_trip(&blr_to_maa(100.0, 300.0)).unwrap();

    assert!(!itinerary.plan.is_possible);
    assert!(itinerary.plan.stops.is_empty());
    let reason = itinerary.plan.infeasibility_reason().unwrap();
    assert!(reason.contains("vellore at 200km"), "{}", reason);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn unknown_place_is_an_error() {
    let geocoder = FixedGeocoder::corridor();
    let router = HaversineRouter::default();
    let directory = RecordingDirectory::empty("primary");

    let planner = TripPlanner::new(&geocoder, &router, StationSources::new(&directory));
    let result = planner.plan_trip(&TripRequest::new("Atlantis", CHENNAI.name, 200.0, 300.0));

    match result {
        Err(PlannerError::NotFound { place }) => assert_eq!(place, "Atlantis"),
        other => panic!("expected NotFound, got {:?}", other.map(|i| i.plan)),
    }
}

#[test]
fn directory_failure_is_an_error() {
    let geocoder = FixedGeocoder::corridor();
    let router = HaversineRouter::default();

    let planner = TripPlanner::new(&geocoder, &router, StationSources::new(&FailingDirectory));
    let result = planner.plan_trip(&blr_to_maa(200.0, 300.0));

    assert!(matches!(result, Err(PlannerError::MalformedResponse { .. })));
}

#[test]
fn malformed_requests_are_rejected() {
    let geocoder = FixedGeocoder::corridor();
    let router = HaversineRouter::default();
    let directory = RecordingDirectory::empty("primary");
    let planner = TripPlanner::new(&geocoder, &router, StationSources::new(&directory));

    let nan_range = planner.plan_trip(&blr_to_maa(f64::NAN, 300.0));
    assert!(matches!(nan_range, Err(PlannerError::InvalidRequest { .. })));

    let blank_start = planner.plan_trip(&TripRequest::new("  ", CHENNAI.name, 200.0, 300.0));
    assert!(matches!(blank_start, Err(PlannerError::InvalidRequest { .. })));
}
