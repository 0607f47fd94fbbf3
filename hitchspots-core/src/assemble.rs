//! Turning stored spots into a routed trip.

use std::collections::HashMap;

use thiserror::Error;

use crate::{SpotDocument, Trip, TripError, TripPlanner, Waypoint};

/// Errors returned by [`assemble_trip`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssembleError {
    /// A spot's sanitised view had no numeric `lat`/`lon` pair.
    #[error("spot {external_id:?} has no usable coordinates")]
    MissingCoordinates {
        /// Identifier of the spot, when present.
        external_id: Option<u64>,
    },
    /// The routing provider failed.
    #[error(transparent)]
    Trip(#[from] TripError),
}

/// Waypoints of `spots` in the order given.
pub fn waypoints_for(spots: &[SpotDocument]) -> Result<Vec<Waypoint>, AssembleError> {
    spots
        .iter()
        .map(|spot| {
            spot.waypoint()
                .ok_or(AssembleError::MissingCoordinates {
                    external_id: spot.external_id(),
                })
        })
        .collect()
}

/// Plan a trip visiting `spots` in order with `planner`.
///
/// # Examples
///
/// ```rust
/// use hitchspots_core::assemble::assemble_trip;
/// use hitchspots_core::test_support::EchoTripPlanner;
/// use hitchspots_core::{EncodingRepair, SpotRecord};
/// use serde_json::json;
///
/// let mut spots = Vec::new();
/// for raw in [json!({ "id": 1, "lat": 1, "lon": 2 }), json!({ "id": 2, "lat": 3, "lon": 4 })] {
///     spots.push(SpotRecord::from_upstream(raw)?.to_document(EncodingRepair::Enabled)?);
/// }
///
/// let trip = assemble_trip(&EchoTripPlanner, &spots)?;
/// assert_eq!(trip.waypoints.len(), 2);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn assemble_trip(
    planner: &dyn TripPlanner,
    spots: &[SpotDocument],
) -> Result<Trip, AssembleError> {
    let waypoints = waypoints_for(spots)?;
    log::debug!(
        "planning trip through {} spots with {}",
        waypoints.len(),
        planner.name()
    );
    Ok(planner.plan_trip(&waypoints)?)
}

/// Reorder `documents` to follow `ids`.
///
/// Ids without a matching document are skipped; documents whose id is not
/// listed are dropped. A repeated id yields its document at every position.
#[must_use]
pub fn arrange_by_ids(documents: Vec<SpotDocument>, ids: &[u64]) -> Vec<SpotDocument> {
    let by_id: HashMap<u64, SpotDocument> = documents
        .into_iter()
        .filter_map(|document| document.external_id().map(|id| (id, document)))
        .collect();
    ids.iter().filter_map(|id| by_id.get(id).cloned()).collect()
}
