//! Persistence of spot documents.
//!
//! [`DocumentBackend`] models the document store as a small set of atomic
//! primitives keyed by `raw.external_id`. [`SpotStore`] builds idempotent
//! upserts, deletes and lookups on top of any backend passed to it, running
//! each record through the sanitiser on the way in.

use thiserror::Error;

use crate::SpotDocument;

mod memory;
mod spots;
#[cfg(feature = "store-sqlite")]
mod sqlite;

pub use memory::MemoryBackend;
pub use spots::{IngestFailure, IngestReport, SpotStore, SpotStoreError, UpsertOutcome, WriteKind};
#[cfg(feature = "store-sqlite")]
pub use sqlite::{SqliteBackend, SqliteBackendError};

/// Selects documents by their upstream identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Every document.
    All,
    /// The document whose `raw.external_id` equals the value.
    ExternalId(u64),
    /// Documents whose `raw.external_id` is one of the values.
    ExternalIds(Vec<u64>),
}

impl Filter {
    /// Whether `document` satisfies the filter.
    #[must_use]
    pub fn matches(&self, document: &SpotDocument) -> bool {
        match self {
            Self::All => true,
            Self::ExternalId(id) => document.external_id() == Some(*id),
            Self::ExternalIds(ids) => document
                .external_id()
                .is_some_and(|external_id| ids.contains(&external_id)),
        }
    }
}

/// Failures reported by a [`DocumentBackend`].
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend refused the document's shape or field types.
    #[error("document rejected: {reason}")]
    Rejected {
        /// Backend explanation of the rejection.
        reason: String,
    },
    /// A document with the same external id is already stored.
    #[error("a document with external id {external_id} already exists")]
    DuplicateKey {
        /// Conflicting identifier.
        external_id: u64,
    },
    /// Any other storage failure, including lost connectivity.
    #[error("storage failure while trying to {operation}: {source}")]
    Storage {
        /// Operation that failed.
        operation: &'static str,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl BackendError {
    /// Whether the backend refused the document itself.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// Minimal document store used by [`SpotStore`].
///
/// Implementations must make `find_one_and_update` and `find_one_and_delete`
/// atomic, and must refuse a second document with an existing external id
/// with [`BackendError::DuplicateKey`].
///
/// # Examples
///
/// ```rust
/// use hitchspots_core::store::{DocumentBackend, Filter, MemoryBackend};
/// use hitchspots_core::{EncodingRepair, SpotRecord};
/// use serde_json::json;
///
/// let backend = MemoryBackend::default();
/// let record = SpotRecord::from_upstream(json!({ "id": 1, "lat": 0, "lon": 0 }))?;
/// let document = record.to_document(EncodingRepair::Enabled)?;
///
/// backend.insert_one(&document)?;
/// assert_eq!(backend.find(&Filter::ExternalId(1))?, vec![document]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait DocumentBackend {
    /// Return every document matching `filter`, in no particular order.
    fn find(&self, filter: &Filter) -> Result<Vec<SpotDocument>, BackendError>;

    /// Store a new document.
    fn insert_one(&self, document: &SpotDocument) -> Result<(), BackendError>;

    /// Replace the first document matching `filter` and return it as stored,
    /// or `None` when nothing matched.
    fn find_one_and_update(
        &self,
        filter: &Filter,
        document: &SpotDocument,
    ) -> Result<Option<SpotDocument>, BackendError>;

    /// Remove the first document matching `filter` and return it, or `None`
    /// when nothing matched.
    fn find_one_and_delete(&self, filter: &Filter) -> Result<Option<SpotDocument>, BackendError>;
}
