//! Trip planner trait and the waypoint/trip values it exchanges.

use geo::{Coord, LineString};
use serde::{Deserialize, Serialize};

use super::error::TripError;

/// Smallest number of waypoints a trip can be planned through.
pub const MIN_WAYPOINTS: usize = 2;

/// A single coordinate pair exchanged with routing providers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

impl Waypoint {
    /// Create a waypoint from latitude and longitude.
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl From<Waypoint> for Coord<f64> {
    fn from(waypoint: Waypoint) -> Self {
        Self {
            x: waypoint.lon,
            y: waypoint.lat,
        }
    }
}

impl From<Coord<f64>> for Waypoint {
    fn from(coord: Coord<f64>) -> Self {
        Self {
            lat: coord.y,
            lon: coord.x,
        }
    }
}

/// A planned route returned by a provider.
///
/// `geometry` uses `x = longitude`, `y = latitude`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    /// Name of the provider that planned the trip.
    pub provider: String,
    /// Waypoints as snapped and ordered by the provider.
    pub waypoints: Vec<Waypoint>,
    /// Path followed by the trip.
    pub geometry: LineString<f64>,
    /// Total distance in metres.
    pub distance_meters: f64,
    /// Total travel time in seconds.
    pub duration_seconds: f64,
}

/// Plan a trip visiting waypoints in order.
///
/// # Examples
///
/// ```rust
/// use geo::LineString;
/// use hitchspots_core::{Trip, TripError, TripPlanner, Waypoint, ensure_enough_waypoints};
///
/// struct StraightLine;
///
/// impl TripPlanner for StraightLine {
///     fn name(&self) -> &'static str {
///         "straight-line"
///     }
///
///     fn plan_trip(&self, waypoints: &[Waypoint]) -> Result<Trip, TripError> {
///         ensure_enough_waypoints(waypoints)?;
///         Ok(Trip {
///             provider: self.name().to_owned(),
///             waypoints: waypoints.to_vec(),
///             geometry: waypoints.iter().copied().map(geo::Coord::from).collect::<LineString<f64>>(),
///             distance_meters: 0.0,
///             duration_seconds: 0.0,
///         })
///     }
/// }
///
/// let trip = StraightLine.plan_trip(&[Waypoint::new(1.0, 2.0), Waypoint::new(3.0, 4.0)])?;
/// assert_eq!(trip.geometry.0.len(), 2);
/// # Ok::<(), TripError>(())
/// ```
pub trait TripPlanner {
    /// Provider name used in errors and trip metadata.
    fn name(&self) -> &'static str;

    /// Plan a trip through `waypoints`, in the given order.
    ///
    /// Implementations must return `Err(TripError::TooFewWaypoints)` when
    /// fewer than [`MIN_WAYPOINTS`] waypoints are supplied.
    fn plan_trip(&self, waypoints: &[Waypoint]) -> Result<Trip, TripError>;
}

/// Reject inputs that cannot form a trip.
pub fn ensure_enough_waypoints(waypoints: &[Waypoint]) -> Result<(), TripError> {
    if waypoints.len() < MIN_WAYPOINTS {
        return Err(TripError::TooFewWaypoints {
            count: waypoints.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    use crate::test_support::EchoTripPlanner;

    #[rstest]
    fn waypoint_maps_to_lon_lat_coordinate() {
        let coord = Coord::from(Waypoint::new(51.5, -0.1));
        assert_eq!(coord, Coord { x: -0.1, y: 51.5 });
        assert_eq!(Waypoint::from(coord), Waypoint::new(51.5, -0.1));
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    fn rejects_fewer_than_two_waypoints(#[case] count: usize) {
        let waypoints = vec![Waypoint::new(0.0, 0.0); count];
        let err = EchoTripPlanner
            .plan_trip(&waypoints)
            .expect_err("expected TooFewWaypoints");
        assert_eq!(err, TripError::TooFewWaypoints { count });
    }

    #[rstest]
    fn echo_planner_preserves_order() {
        let waypoints = [Waypoint::new(1.0, 2.0), Waypoint::new(3.0, 4.0)];
        let trip = EchoTripPlanner
            .plan_trip(&waypoints)
            .expect("two waypoints suffice");
        assert_eq!(trip.waypoints, waypoints.to_vec());
        assert_eq!(
            trip.geometry,
            LineString::from(vec![(2.0, 1.0), (4.0, 3.0)])
        );
    }
}
