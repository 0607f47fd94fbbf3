//! Provider outcomes pass through the trip assembler unchanged.

use geo::LineString;
use hitchspots_core::{
    AssembleError, EncodingRepair, SpotDocument, SpotRecord, Trip, TripError, Waypoint,
    assemble_trip,
};
use hitchspots_data::routing::test_support::StubTripPlanner;
use rstest::{fixture, rstest};
use serde_json::json;

#[fixture]
fn spots() -> Vec<SpotDocument> {
    [
        json!({ "id": 1, "lat": "52.52", "lon": "13.40" }),
        json!({ "id": 2, "lat": 48.14, "lon": 11.58 }),
    ]
    .into_iter()
    .map(|raw| {
        SpotRecord::from_upstream(raw)
            .expect("valid upstream spot")
            .to_document(EncodingRepair::Enabled)
            .expect("numeric coordinates")
    })
    .collect()
}

#[rstest]
fn provider_trip_is_returned(spots: Vec<SpotDocument>) {
    let expected = Trip {
        provider: "stub".to_owned(),
        waypoints: vec![Waypoint::new(52.52, 13.40), Waypoint::new(48.14, 11.58)],
        geometry: LineString::from(vec![(13.40, 52.52), (11.58, 48.14)]),
        distance_meters: 584_000.0,
        duration_seconds: 20_000.0,
    };
    let planner = StubTripPlanner::with_trip(expected.clone());

    let trip = assemble_trip(&planner, &spots).expect("trip");

    assert_eq!(trip, expected);
}

#[rstest]
#[case(TripError::ProviderUnavailable {
    provider: "mapbox",
    status: Some(401),
    message: "unexpected HTTP status 401 Unauthorized".to_owned(),
})]
#[case(TripError::ServiceError {
    provider: "osrm",
    code: "NoTrips".to_owned(),
    message: String::new(),
})]
fn provider_failures_surface_unchanged(spots: Vec<SpotDocument>, #[case] error: TripError) {
    let planner = StubTripPlanner::with_error(error.clone());

    let err = assemble_trip(&planner, &spots).expect_err("provider failure");

    assert_eq!(err, AssembleError::Trip(error));
}

#[rstest]
fn spots_without_coordinates_never_reach_the_provider() {
    let spot = SpotRecord::new(9, serde_json::Map::new())
        .to_document(EncodingRepair::Enabled)
        .expect("no coordinates to coerce");
    let planner = StubTripPlanner::with_error(TripError::ProviderUnavailable {
        provider: "osrm",
        status: None,
        message: "should not be called".to_owned(),
    });

    let err = assemble_trip(&planner, &[spot.clone(), spot]).expect_err("no coordinates");

    assert_eq!(
        err,
        AssembleError::MissingCoordinates {
            external_id: Some(9)
        }
    );
}
