//! Data access for Hitchspots.
//!
//! Responsibilities:
//! - Implement [`hitchspots_core::TripPlanner`] over the Mapbox and OSRM HTTP
//!   APIs ([`routing`]).
//! - Read upstream Hitchwiki exports from disk ([`upstream`]).
//!
//! Boundaries:
//! - Domain rules (sanitisation, persistence policy) live in
//!   `hitchspots-core`.
//! - No global mutable state; providers own their HTTP client and runtime.

pub mod routing;
pub mod upstream;
