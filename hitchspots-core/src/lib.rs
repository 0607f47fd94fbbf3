//! Core domain for Hitchspots.
//!
//! Spots arrive from Hitchwiki as loosely typed JSON. This crate turns them
//! into [`SpotRecord`]s, sanitises them ([`sanitize`]), persists them through
//! a [`SpotStore`] over any [`DocumentBackend`], and assembles routed trips
//! from stored spots with any [`TripPlanner`].

pub mod assemble;
pub mod export;
pub mod sanitize;
pub mod spot;
pub mod store;
pub mod trip;

#[doc(hidden)]
pub mod test_support;

pub use assemble::{AssembleError, arrange_by_ids, assemble_trip};
pub use export::export_file_name;
pub use sanitize::{EncodingRepair, SanitizeError, sanitize};
pub use spot::{SpotDocument, SpotRecord, SpotRecordError};
pub use store::{
    BackendError, DocumentBackend, Filter, IngestFailure, IngestReport, MemoryBackend, SpotStore,
    SpotStoreError, UpsertOutcome, WriteKind,
};
#[cfg(feature = "store-sqlite")]
pub use store::{SqliteBackend, SqliteBackendError};
pub use trip::{MIN_WAYPOINTS, Trip, TripError, TripPlanner, Waypoint, ensure_enough_waypoints};
