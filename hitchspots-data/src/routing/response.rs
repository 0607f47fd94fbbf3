//! Response fragments shared by the Mapbox Directions and OSRM Trip APIs.
//!
//! Both services describe a route as a GeoJSON `LineString` plus a total
//! distance and duration, and snap every input coordinate to a waypoint.

use geo::{Coord, LineString};
use serde::Deserialize;

use hitchspots_core::{TripError, Waypoint};

/// Status code both services use for success.
pub(super) const OK_CODE: &str = "Ok";

/// GeoJSON `LineString` geometry (`geometries=geojson`).
#[derive(Debug, Clone, Deserialize)]
pub struct GeoJsonLineString {
    /// `[lon, lat]` positions along the route.
    pub coordinates: Vec<[f64; 2]>,
}

impl From<GeoJsonLineString> for LineString<f64> {
    fn from(geometry: GeoJsonLineString) -> Self {
        geometry
            .coordinates
            .into_iter()
            .map(|[x, y]| Coord { x, y })
            .collect()
    }
}

/// A route (Mapbox) or trip (OSRM) summary.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteSummary {
    /// Path of the route.
    pub geometry: GeoJsonLineString,
    /// Distance in metres.
    #[serde(default)]
    pub distance: f64,
    /// Duration in seconds.
    #[serde(default)]
    pub duration: f64,
}

/// An input coordinate snapped to the road network.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseWaypoint {
    /// Snapped `[lon, lat]` position.
    pub location: [f64; 2],
    /// Street name, possibly empty.
    #[serde(default)]
    pub name: Option<String>,
    /// Position of the waypoint in the visiting order (OSRM Trip only).
    #[serde(default)]
    pub waypoint_index: Option<usize>,
}

impl From<&ResponseWaypoint> for Waypoint {
    fn from(waypoint: &ResponseWaypoint) -> Self {
        let [lon, lat] = waypoint.location;
        Self::new(lat, lon)
    }
}

/// Fail with [`TripError::ServiceError`] unless `code` is `"Ok"`.
pub(super) fn ensure_ok(
    provider: &'static str,
    code: &str,
    message: Option<&str>,
) -> Result<(), TripError> {
    if code == OK_CODE {
        return Ok(());
    }
    Err(TripError::ServiceError {
        provider,
        code: code.to_owned(),
        message: message.unwrap_or_default().to_owned(),
    })
}
