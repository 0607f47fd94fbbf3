//! Facade crate for Hitchspots.
//!
//! This crate re-exports the core domain types and exposes the SQLite store
//! and the HTTP routing providers behind feature flags.

#![forbid(unsafe_code)]

pub use hitchspots_core::{
    AssembleError, BackendError, DocumentBackend, EncodingRepair, Filter, IngestFailure,
    IngestReport, MemoryBackend, SanitizeError, SpotDocument, SpotRecord, SpotRecordError,
    SpotStore, SpotStoreError, Trip, TripError, TripPlanner, UpsertOutcome, Waypoint, WriteKind,
    arrange_by_ids, assemble_trip, export_file_name, sanitize,
};

#[cfg(feature = "store-sqlite")]
pub use hitchspots_core::{SqliteBackend, SqliteBackendError};

#[cfg(feature = "routing")]
pub use hitchspots_data::routing::{
    MapboxTripPlanner, OsrmTripPlanner, ProviderBuildError, ProviderKind, RoutingConfig,
    build_planner,
};
