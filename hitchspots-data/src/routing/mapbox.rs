//! Mapbox Directions provider.
//!
//! See: <https://docs.mapbox.com/api/navigation/directions/>

use std::fmt;

use serde::Deserialize;

use hitchspots_core::{Trip, TripError, TripPlanner, Waypoint, ensure_enough_waypoints};

use super::response::{ResponseWaypoint, RouteSummary, ensure_ok};
use super::transport::{HttpProviderConfig, HttpTransport, ProviderBuildError, coordinate_path};

/// Mapbox API root.
pub const MAPBOX_BASE_URL: &str = "https://api.mapbox.com";

const PROVIDER: &str = "mapbox";

/// Mapbox Directions API response.
#[derive(Debug, Deserialize)]
pub struct DirectionsResponse {
    /// Status code, `"Ok"` on success.
    pub code: String,
    /// Error description when `code` is not `"Ok"`.
    pub message: Option<String>,
    /// Candidate routes, best first.
    #[serde(default)]
    pub routes: Vec<RouteSummary>,
    /// Input coordinates snapped to the network, in input order.
    #[serde(default)]
    pub waypoints: Vec<ResponseWaypoint>,
}

impl DirectionsResponse {
    fn into_trip(self) -> Result<Trip, TripError> {
        ensure_ok(PROVIDER, &self.code, self.message.as_deref())?;
        let route = self
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| TripError::InvalidResponse {
                provider: PROVIDER,
                message: "response contains no routes".to_owned(),
            })?;
        Ok(Trip {
            provider: PROVIDER.to_owned(),
            waypoints: self.waypoints.iter().map(Waypoint::from).collect(),
            geometry: route.geometry.into(),
            distance_meters: route.distance,
            duration_seconds: route.duration,
        })
    }
}

/// [`TripPlanner`] backed by the Mapbox Directions service.
pub struct MapboxTripPlanner {
    transport: HttpTransport,
    profile: String,
    access_token: String,
}

impl fmt::Debug for MapboxTripPlanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapboxTripPlanner")
            .field("transport", &self.transport)
            .field("profile", &self.profile)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

impl MapboxTripPlanner {
    /// Create a planner authenticating with `access_token`.
    ///
    /// A blank token is rejected with
    /// [`ProviderBuildError::MissingAccessToken`].
    pub fn new(
        config: HttpProviderConfig,
        access_token: impl Into<String>,
    ) -> Result<Self, ProviderBuildError> {
        let access_token = access_token.into();
        if access_token.trim().is_empty() {
            return Err(ProviderBuildError::MissingAccessToken { provider: PROVIDER });
        }
        Ok(Self {
            transport: HttpTransport::new(PROVIDER, &config)?,
            profile: config.profile,
            access_token,
        })
    }

    fn directions_url(&self, waypoints: &[Waypoint]) -> url::Url {
        let coordinates = coordinate_path(waypoints);
        self.transport.endpoint(
            [
                "directions",
                "v5",
                "mapbox",
                self.profile.as_str(),
                coordinates.as_str(),
            ],
            &[
                ("geometries", "geojson"),
                ("access_token", self.access_token.as_str()),
            ],
        )
    }
}

impl TripPlanner for MapboxTripPlanner {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn plan_trip(&self, waypoints: &[Waypoint]) -> Result<Trip, TripError> {
        ensure_enough_waypoints(waypoints)?;
        self.transport
            .get_json::<DirectionsResponse>(self.directions_url(waypoints))?
            .into_trip()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn planner() -> MapboxTripPlanner {
        MapboxTripPlanner::new(HttpProviderConfig::new("http://mapbox.example.com"), "pk.test")
            .expect("planner should build")
    }

    #[rstest]
    fn directions_url_carries_token(planner: MapboxTripPlanner) {
        let url = planner.directions_url(&[Waypoint::new(1.0, 2.0), Waypoint::new(3.0, 4.0)]);

        assert_eq!(
            url.as_str(),
            "http://mapbox.example.com/directions/v5/mapbox/driving/2,1;4,3\
             ?geometries=geojson&access_token=pk.test"
        );
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_tokens_are_rejected(#[case] token: &str) {
        let err = MapboxTripPlanner::new(HttpProviderConfig::new(MAPBOX_BASE_URL), token)
            .expect_err("should fail");
        assert!(matches!(
            err,
            ProviderBuildError::MissingAccessToken { provider: "mapbox" }
        ));
    }

    #[rstest]
    fn debug_output_hides_token(planner: MapboxTripPlanner) {
        assert!(!format!("{planner:?}").contains("pk.test"));
    }

    #[rstest]
    fn converts_first_route() {
        let response: DirectionsResponse = serde_json::from_str(
            r#"{
                "code": "Ok",
                "routes": [
                    {
                        "geometry": { "type": "LineString", "coordinates": [[2, 1], [3, 2], [4, 3]] },
                        "distance": 3120.4,
                        "duration": 240.2
                    },
                    {
                        "geometry": { "type": "LineString", "coordinates": [[2, 1], [4, 3]] },
                        "distance": 9999.0,
                        "duration": 999.0
                    }
                ],
                "waypoints": [
                    { "name": "A", "location": [2, 1] },
                    { "name": "B", "location": [4, 3] }
                ]
            }"#,
        )
        .expect("should deserialise");

        let trip = response.into_trip().expect("should convert");

        assert_eq!(
            trip.waypoints,
            vec![Waypoint::new(1.0, 2.0), Waypoint::new(3.0, 4.0)]
        );
        assert_eq!(trip.geometry.0.len(), 3);
        assert_eq!(trip.distance_meters, 3120.4);
        assert_eq!(trip.duration_seconds, 240.2);
    }

    #[rstest]
    fn no_route_becomes_service_error() {
        let response: DirectionsResponse = serde_json::from_str(
            r#"{ "code": "NoRoute", "message": "No route found", "routes": [] }"#,
        )
        .expect("should deserialise");

        let err = response.into_trip().expect_err("should fail");

        assert_eq!(
            err,
            TripError::ServiceError {
                provider: "mapbox",
                code: "NoRoute".into(),
                message: "No route found".into(),
            }
        );
    }
}
