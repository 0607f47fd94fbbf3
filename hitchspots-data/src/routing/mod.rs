//! HTTP routing providers.
//!
//! Two services implement [`hitchspots_core::TripPlanner`]:
//!
//! - [`MapboxTripPlanner`] calls the Mapbox Directions API;
//! - [`OsrmTripPlanner`] calls the OSRM Trip API with fixed start and finish.
//!
//! Both encode waypoints as `lon,lat` pairs joined by `;` in the request
//! path, issue a single GET and report any non-200 status as
//! [`TripError::ProviderUnavailable`](hitchspots_core::TripError). Callers
//! pick one through [`RoutingConfig`] and [`build_planner`] and depend only on
//! the trait.
//!
//! # Example
//!
//! ```no_run
//! use hitchspots_core::Waypoint;
//! use hitchspots_data::routing::{ProviderKind, RoutingConfig, build_planner};
//!
//! let config = RoutingConfig::new(ProviderKind::Mapbox).with_access_token("pk.example");
//! let planner = build_planner(&config)?;
//! let trip = planner.plan_trip(&[Waypoint::new(48.85, 2.35), Waypoint::new(50.85, 4.35)])?;
//! println!("{} waypoints via {}", trip.waypoints.len(), trip.provider);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod mapbox;
mod osrm;
mod response;
mod selection;
mod transport;

#[doc(hidden)]
pub mod test_support;

pub use mapbox::{DirectionsResponse, MAPBOX_BASE_URL, MapboxTripPlanner};
pub use osrm::{OSRM_BASE_URL, OsrmTripPlanner, TripResponse};
pub use response::{GeoJsonLineString, ResponseWaypoint, RouteSummary};
pub use selection::{ProviderKind, RoutingConfig, UnknownProvider, build_planner};
pub use transport::{DEFAULT_PROFILE, DEFAULT_USER_AGENT, HttpProviderConfig, ProviderBuildError};
