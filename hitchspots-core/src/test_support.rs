//! Deterministic planners and backends used by unit and behaviour tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use geo::{Coord, LineString};

use crate::store::{BackendError, DocumentBackend, Filter, MemoryBackend};
use crate::{SpotDocument, Trip, TripError, TripPlanner, Waypoint, ensure_enough_waypoints};

/// Planner returning the input waypoints as a straight-line trip.
#[derive(Default, Debug, Copy, Clone)]
pub struct EchoTripPlanner;

impl TripPlanner for EchoTripPlanner {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn plan_trip(&self, waypoints: &[Waypoint]) -> Result<Trip, TripError> {
        ensure_enough_waypoints(waypoints)?;
        Ok(Trip {
            provider: self.name().to_owned(),
            waypoints: waypoints.to_vec(),
            geometry: waypoints.iter().copied().map(Coord::from).collect::<LineString<f64>>(),
            distance_meters: 0.0,
            duration_seconds: 0.0,
        })
    }
}

/// Failure injected by [`FlakyBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteFault {
    /// Fail with [`BackendError::Rejected`].
    Reject,
    /// Fail with [`BackendError::Storage`].
    Storage,
}

/// In-memory backend whose first `n` writes fail.
///
/// Writes are `insert_one` and `find_one_and_update` calls; reads and deletes
/// always reach the inner [`MemoryBackend`].
#[derive(Debug, Default)]
pub struct FlakyBackend {
    inner: MemoryBackend,
    fault: Option<WriteFault>,
    failures: usize,
    attempts: AtomicUsize,
}

impl FlakyBackend {
    /// Fail the first `failures` writes with `fault`.
    #[must_use]
    pub fn failing(fault: WriteFault, failures: usize) -> Self {
        Self {
            fault: Some(fault),
            failures,
            ..Self::default()
        }
    }

    /// Number of write calls received so far, failed or not.
    pub fn write_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Backend holding the successfully written documents.
    pub const fn inner(&self) -> &MemoryBackend {
        &self.inner
    }

    fn check_write(&self) -> Result<(), BackendError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        match self.fault {
            Some(WriteFault::Reject) if attempt < self.failures => Err(BackendError::Rejected {
                reason: "injected rejection".to_owned(),
            }),
            Some(WriteFault::Storage) if attempt < self.failures => Err(BackendError::Storage {
                operation: "write document",
                source: "injected storage failure".into(),
            }),
            _ => Ok(()),
        }
    }
}

impl DocumentBackend for FlakyBackend {
    fn find(&self, filter: &Filter) -> Result<Vec<SpotDocument>, BackendError> {
        self.inner.find(filter)
    }

    fn insert_one(&self, document: &SpotDocument) -> Result<(), BackendError> {
        self.check_write()?;
        self.inner.insert_one(document)
    }

    fn find_one_and_update(
        &self,
        filter: &Filter,
        document: &SpotDocument,
    ) -> Result<Option<SpotDocument>, BackendError> {
        self.check_write()?;
        self.inner.find_one_and_update(filter, document)
    }

    fn find_one_and_delete(&self, filter: &Filter) -> Result<Option<SpotDocument>, BackendError> {
        self.inner.find_one_and_delete(filter)
    }
}
