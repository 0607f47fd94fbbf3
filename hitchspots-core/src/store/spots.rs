//! Idempotent spot persistence on top of a [`DocumentBackend`].

use log::{info, warn};
use serde_json::Value;
use thiserror::Error;

use crate::{EncodingRepair, SanitizeError, SpotDocument, SpotRecord, SpotRecordError};

use super::{BackendError, DocumentBackend, Filter};

/// Errors returned by [`SpotStore`] operations.
#[derive(Debug, Error)]
pub enum SpotStoreError {
    /// A coordinate field could not be coerced; the record was not written.
    #[error("spot {external_id} has malformed input: {source}")]
    MalformedInput {
        /// Identifier of the rejected record.
        external_id: u64,
        /// Sanitisation failure.
        #[source]
        source: SanitizeError,
    },
    /// The backend rejected the document with and without encoding repair.
    #[error("backend rejected spot {external_id} even without encoding repair: {source}")]
    PersistenceTypeRejection {
        /// Identifier of the rejected record.
        external_id: u64,
        /// Rejection returned by the second attempt.
        #[source]
        source: BackendError,
    },
    /// Writing the record failed for a reason other than a shape rejection.
    #[error("failed to upsert spot {external_id}: {source}")]
    Upsert {
        /// Identifier of the record being written.
        external_id: u64,
        /// Backend failure.
        #[source]
        source: BackendError,
    },
    /// A read or delete failed in the backend.
    #[error("failed to {operation}: {source}")]
    Backend {
        /// Store operation that failed.
        operation: &'static str,
        /// Backend failure.
        #[source]
        source: BackendError,
    },
    /// An upstream payload could not be turned into a record.
    #[error(transparent)]
    InvalidRecord(#[from] SpotRecordError),
}

impl SpotStoreError {
    /// Whether the failure stems from the record's own content.
    #[must_use]
    pub const fn is_malformed_input(&self) -> bool {
        matches!(self, Self::MalformedInput { .. } | Self::InvalidRecord(_))
    }
}

/// Which write path an upsert took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    /// No document existed; a new one was inserted.
    Inserted,
    /// An existing document was replaced.
    Updated,
}

/// Result of a successful [`SpotStore::upsert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertOutcome {
    /// Write path taken.
    pub write: WriteKind,
    /// Repair mode of the document that was finally stored.
    pub repair: EncodingRepair,
}

/// A record that could not be stored during a batch.
#[derive(Debug)]
pub struct IngestFailure {
    /// Identifier of the record, when it could be read.
    pub external_id: Option<u64>,
    /// Reason for the failure.
    pub error: SpotStoreError,
}

/// Summary of a batch upsert.
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Records inserted as new documents.
    pub inserted: usize,
    /// Records that replaced an existing document.
    pub updated: usize,
    /// Successful records that were stored without encoding repair.
    pub repair_disabled: usize,
    /// Records that were not stored.
    pub failures: Vec<IngestFailure>,
}

impl IngestReport {
    /// Number of records written.
    #[must_use]
    pub const fn stored(&self) -> usize {
        self.inserted + self.updated
    }

    fn record(&mut self, external_id: Option<u64>, result: Result<UpsertOutcome, SpotStoreError>) {
        match result {
            Ok(outcome) => {
                match outcome.write {
                    WriteKind::Inserted => self.inserted += 1,
                    WriteKind::Updated => self.updated += 1,
                }
                if outcome.repair == EncodingRepair::Disabled {
                    self.repair_disabled += 1;
                }
            }
            Err(error) => {
                warn!("skipping spot {external_id:?}: {error}");
                self.failures.push(IngestFailure { external_id, error });
            }
        }
    }
}

/// Spot persistence keyed by `raw.external_id`.
///
/// The store owns no state besides its backend; concurrency control is left
/// to the backend's atomic primitives.
///
/// # Examples
///
/// ```rust
/// use hitchspots_core::store::{MemoryBackend, SpotStore, WriteKind};
/// use hitchspots_core::SpotRecord;
/// use serde_json::json;
///
/// let store = SpotStore::new(MemoryBackend::default());
/// let record = SpotRecord::from_upstream(json!({ "id": 7, "lat": "1", "lon": "2" }))?;
///
/// assert_eq!(store.upsert(&record)?.write, WriteKind::Inserted);
/// assert_eq!(store.upsert(&record)?.write, WriteKind::Updated);
/// assert_eq!(store.find_by_ids(&[7])?.len(), 1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct SpotStore<B> {
    backend: B,
}

impl<B: DocumentBackend> SpotStore<B> {
    /// Wrap `backend`.
    pub const fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Borrow the underlying backend.
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Consume the store, returning its backend.
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Insert `record` or replace the stored document with the same id.
    ///
    /// The document is first sanitised with encoding repair. If the backend
    /// rejects its shape, the upsert is retried once with repair disabled.
    pub fn upsert(&self, record: &SpotRecord) -> Result<UpsertOutcome, SpotStoreError> {
        let external_id = record.external_id();
        match self.write(record, EncodingRepair::Enabled)? {
            Ok(write) => Ok(UpsertOutcome {
                write,
                repair: EncodingRepair::Enabled,
            }),
            Err(rejection) if rejection.is_rejection() => {
                warn!(
                    "backend rejected repaired spot {external_id} ({rejection}); \
                     retrying without encoding repair"
                );
                match self.write(record, EncodingRepair::Disabled)? {
                    Ok(write) => Ok(UpsertOutcome {
                        write,
                        repair: EncodingRepair::Disabled,
                    }),
                    Err(source) if source.is_rejection() => {
                        Err(SpotStoreError::PersistenceTypeRejection {
                            external_id,
                            source,
                        })
                    }
                    Err(source) => Err(SpotStoreError::Upsert {
                        external_id,
                        source,
                    }),
                }
            }
            Err(source) => Err(SpotStoreError::Upsert {
                external_id,
                source,
            }),
        }
    }

    /// Upsert every record, collecting per-record failures.
    pub fn upsert_all<I>(&self, records: I) -> IngestReport
    where
        I: IntoIterator<Item = SpotRecord>,
    {
        let mut report = IngestReport::default();
        for record in records {
            report.record(Some(record.external_id()), self.upsert(&record));
        }
        log_summary(&report);
        report
    }

    /// Build records from upstream payloads and upsert them.
    ///
    /// Payloads without a usable `id` are reported as failures with no
    /// external id.
    pub fn ingest_upstream<I>(&self, payloads: I) -> IngestReport
    where
        I: IntoIterator<Item = Value>,
    {
        let mut report = IngestReport::default();
        for payload in payloads {
            match SpotRecord::from_upstream(payload) {
                Ok(record) => {
                    report.record(Some(record.external_id()), self.upsert(&record));
                }
                Err(err) => report.record(None, Err(err.into())),
            }
        }
        log_summary(&report);
        report
    }

    /// Remove the document for `external_id`, returning it if one existed.
    pub fn delete(&self, external_id: u64) -> Result<Option<SpotDocument>, SpotStoreError> {
        self.backend
            .find_one_and_delete(&Filter::ExternalId(external_id))
            .map_err(|source| SpotStoreError::Backend {
                operation: "delete spot",
                source,
            })
    }

    /// Every stored document.
    pub fn find_all(&self) -> Result<Vec<SpotDocument>, SpotStoreError> {
        self.backend
            .find(&Filter::All)
            .map_err(|source| SpotStoreError::Backend {
                operation: "list spots",
                source,
            })
    }

    /// Documents whose external id is in `ids`, in no particular order.
    pub fn find_by_ids(&self, ids: &[u64]) -> Result<Vec<SpotDocument>, SpotStoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.backend
            .find(&Filter::ExternalIds(ids.to_vec()))
            .map_err(|source| SpotStoreError::Backend {
                operation: "find spots by id",
                source,
            })
    }

    /// Sanitise and write one record. The outer result carries sanitisation
    /// failures, the inner one backend failures.
    fn write(
        &self,
        record: &SpotRecord,
        repair: EncodingRepair,
    ) -> Result<Result<WriteKind, BackendError>, SpotStoreError> {
        let document =
            record
                .to_document(repair)
                .map_err(|source| SpotStoreError::MalformedInput {
                    external_id: record.external_id(),
                    source,
                })?;
        Ok(self.write_document(record.external_id(), &document))
    }

    fn write_document(
        &self,
        external_id: u64,
        document: &SpotDocument,
    ) -> Result<WriteKind, BackendError> {
        let filter = Filter::ExternalId(external_id);
        if self.backend.find_one_and_update(&filter, document)?.is_some() {
            return Ok(WriteKind::Updated);
        }
        match self.backend.insert_one(document) {
            Ok(()) => Ok(WriteKind::Inserted),
            Err(BackendError::DuplicateKey { .. }) => {
                // Lost an insert race; the other writer's document is replaced.
                self.backend
                    .find_one_and_update(&filter, document)?
                    .map(|_| WriteKind::Updated)
                    .ok_or(BackendError::DuplicateKey { external_id })
            }
            Err(err) => Err(err),
        }
    }
}

fn log_summary(report: &IngestReport) {
    info!(
        "stored {} spots ({} inserted, {} updated, {} without encoding repair); {} failed",
        report.stored(),
        report.inserted,
        report.updated,
        report.repair_disabled,
        report.failures.len()
    );
}
