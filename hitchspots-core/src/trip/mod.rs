//! Plan routed trips through a sequence of waypoints.
//!
//! The [`TripPlanner`] trait abstracts the third-party routing services. Each
//! provider maps its own request and response shapes onto the common
//! [`Trip`] type and reports failures through [`TripError`], so callers can
//! swap providers by configuration alone.

mod error;
mod planner;

pub use error::TripError;
pub use planner::{MIN_WAYPOINTS, Trip, TripPlanner, Waypoint, ensure_enough_waypoints};
