//! OSRM Trip service provider.
//!
//! The Trip service solves a travelling-salesman style ordering; requests fix
//! the first and last input coordinates as start and finish and disable the
//! round trip, so only intermediate stops may be reordered.
//!
//! See: <http://project-osrm.org/docs/v5.24.0/api/#trip-service>

use serde::Deserialize;

use hitchspots_core::{Trip, TripError, TripPlanner, Waypoint, ensure_enough_waypoints};

use super::response::{ResponseWaypoint, RouteSummary, ensure_ok};
use super::transport::{HttpProviderConfig, HttpTransport, ProviderBuildError, coordinate_path};

/// Public OSRM demo server.
pub const OSRM_BASE_URL: &str = "https://router.project-osrm.org";

const PROVIDER: &str = "osrm";

/// OSRM Trip API response.
#[derive(Debug, Deserialize)]
pub struct TripResponse {
    /// Status code, `"Ok"` on success.
    pub code: String,
    /// Error description when `code` is not `"Ok"`.
    pub message: Option<String>,
    /// Planned trips; one when `roundtrip=false`.
    #[serde(default)]
    pub trips: Vec<RouteSummary>,
    /// Input coordinates in input order, annotated with their trip position.
    #[serde(default)]
    pub waypoints: Vec<ResponseWaypoint>,
}

impl TripResponse {
    fn into_trip(self) -> Result<Trip, TripError> {
        ensure_ok(PROVIDER, &self.code, self.message.as_deref())?;
        let summary = self
            .trips
            .into_iter()
            .next()
            .ok_or_else(|| TripError::InvalidResponse {
                provider: PROVIDER,
                message: "response contains no trips".to_owned(),
            })?;

        let mut visits: Vec<(usize, &ResponseWaypoint)> = self
            .waypoints
            .iter()
            .enumerate()
            .map(|(position, waypoint)| (waypoint.waypoint_index.unwrap_or(position), waypoint))
            .collect();
        visits.sort_by_key(|(index, _)| *index);

        Ok(Trip {
            provider: PROVIDER.to_owned(),
            waypoints: visits
                .into_iter()
                .map(|(_, waypoint)| Waypoint::from(waypoint))
                .collect(),
            geometry: summary.geometry.into(),
            distance_meters: summary.distance,
            duration_seconds: summary.duration,
        })
    }
}

/// [`TripPlanner`] backed by the OSRM Trip service.
///
/// ```no_run
/// use hitchspots_core::{TripPlanner, Waypoint};
/// use hitchspots_data::routing::{HttpProviderConfig, OSRM_BASE_URL, OsrmTripPlanner};
///
/// let planner = OsrmTripPlanner::new(HttpProviderConfig::new(OSRM_BASE_URL))?;
/// let trip = planner.plan_trip(&[Waypoint::new(60.17, 24.94), Waypoint::new(59.44, 24.75)])?;
/// println!("{} m", trip.distance_meters);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct OsrmTripPlanner {
    transport: HttpTransport,
    profile: String,
}

impl OsrmTripPlanner {
    /// Create a planner for the OSRM service described by `config`.
    pub fn new(config: HttpProviderConfig) -> Result<Self, ProviderBuildError> {
        Ok(Self {
            transport: HttpTransport::new(PROVIDER, &config)?,
            profile: config.profile,
        })
    }

    fn trip_url(&self, waypoints: &[Waypoint]) -> url::Url {
        let coordinates = coordinate_path(waypoints);
        self.transport.endpoint(
            ["trip", "v1", self.profile.as_str(), coordinates.as_str()],
            &[
                ("source", "first"),
                ("destination", "last"),
                ("roundtrip", "false"),
                ("geometries", "geojson"),
            ],
        )
    }
}

impl TripPlanner for OsrmTripPlanner {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn plan_trip(&self, waypoints: &[Waypoint]) -> Result<Trip, TripError> {
        ensure_enough_waypoints(waypoints)?;
        self.transport
            .get_json::<TripResponse>(self.trip_url(waypoints))?
            .into_trip()
    }
}
