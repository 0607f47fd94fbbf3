//! Errors reported by trip planners.

use thiserror::Error;

/// Errors from [`crate::trip::TripPlanner::plan_trip`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TripError {
    /// Fewer than two waypoints were supplied.
    #[error("at least two waypoints are required, got {count}")]
    TooFewWaypoints {
        /// Number of waypoints supplied.
        count: usize,
    },
    /// The provider could not be reached or did not answer with success.
    ///
    /// `status` is `None` when no HTTP response was received.
    #[error("{provider} unavailable: {message}")]
    ProviderUnavailable {
        /// Name of the provider that failed.
        provider: &'static str,
        /// HTTP status code, if a response arrived.
        status: Option<u16>,
        /// Human-readable failure description.
        message: String,
    },
    /// The provider answered but reported a routing failure in its payload.
    #[error("{provider} returned {code}: {message}")]
    ServiceError {
        /// Name of the provider that failed.
        provider: &'static str,
        /// Provider status code, for example `NoRoute`.
        code: String,
        /// Provider message, possibly empty.
        message: String,
    },
    /// The response body could not be mapped onto a trip.
    #[error("invalid {provider} response: {message}")]
    InvalidResponse {
        /// Name of the provider that failed.
        provider: &'static str,
        /// Description of the parse failure.
        message: String,
    },
}

impl TripError {
    /// Whether the error reports an unavailable provider.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::ProviderUnavailable { .. })
    }
}
