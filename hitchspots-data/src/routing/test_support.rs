//! Test utilities for routing providers.
//!
//! [`StubTripPlanner`] returns pre-configured responses without making HTTP
//! requests.

use hitchspots_core::{Trip, TripError, TripPlanner, Waypoint, ensure_enough_waypoints};

/// Stub [`TripPlanner`] for testing.
///
/// ```
/// use hitchspots_core::{TripError, TripPlanner, Waypoint};
/// use hitchspots_data::routing::test_support::StubTripPlanner;
///
/// let planner = StubTripPlanner::with_error(TripError::ProviderUnavailable {
///     provider: "osrm",
///     status: Some(503),
///     message: "maintenance".into(),
/// });
///
/// let result = planner.plan_trip(&[Waypoint::new(0.0, 0.0), Waypoint::new(1.0, 1.0)]);
/// assert!(result.is_err_and(|err| err.is_unavailable()));
/// ```
#[derive(Debug, Clone)]
pub struct StubTripPlanner {
    response: StubResponse,
}

#[derive(Debug, Clone)]
enum StubResponse {
    Trip(Trip),
    Error(TripError),
}

impl StubTripPlanner {
    /// Planner returning `trip` for any valid input.
    #[must_use]
    pub fn with_trip(trip: Trip) -> Self {
        Self {
            response: StubResponse::Trip(trip),
        }
    }

    /// Planner failing every valid request with `error`.
    #[must_use]
    pub fn with_error(error: TripError) -> Self {
        Self {
            response: StubResponse::Error(error),
        }
    }
}

impl TripPlanner for StubTripPlanner {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn plan_trip(&self, waypoints: &[Waypoint]) -> Result<Trip, TripError> {
        ensure_enough_waypoints(waypoints)?;
        match &self.response {
            StubResponse::Trip(trip) => Ok(trip.clone()),
            StubResponse::Error(err) => Err(err.clone()),
        }
    }
}
