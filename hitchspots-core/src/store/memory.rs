//! In-process backend for tests and short-lived tooling.

use std::sync::{Mutex, MutexGuard};

use crate::SpotDocument;

use super::{BackendError, DocumentBackend, Filter};

/// Document backend holding documents in a mutex-guarded vector.
///
/// Lookups are linear scans; suitable for small datasets only.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    documents: Mutex<Vec<SpotDocument>>,
}

impl MemoryBackend {
    /// Create a backend preloaded with `documents`.
    pub fn with_documents<I>(documents: I) -> Self
    where
        I: IntoIterator<Item = SpotDocument>,
    {
        Self {
            documents: Mutex::new(documents.into_iter().collect()),
        }
    }

    /// Number of stored documents.
    pub fn len(&self) -> Result<usize, BackendError> {
        Ok(self.lock("count documents")?.len())
    }

    /// Whether no documents are stored.
    pub fn is_empty(&self) -> Result<bool, BackendError> {
        Ok(self.lock("count documents")?.is_empty())
    }

    fn lock(
        &self,
        operation: &'static str,
    ) -> Result<MutexGuard<'_, Vec<SpotDocument>>, BackendError> {
        self.documents
            .lock()
            .map_err(|_| BackendError::Storage {
                operation,
                source: "memory backend mutex poisoned".into(),
            })
    }
}

fn require_external_id(document: &SpotDocument) -> Result<u64, BackendError> {
    document
        .external_id()
        .ok_or_else(|| BackendError::Rejected {
            reason: "raw.external_id must be an unsigned integer".to_owned(),
        })
}

impl DocumentBackend for MemoryBackend {
    fn find(&self, filter: &Filter) -> Result<Vec<SpotDocument>, BackendError> {
        Ok(self
            .lock("find documents")?
            .iter()
            .filter(|document| filter.matches(document))
            .cloned()
            .collect())
    }

    fn insert_one(&self, document: &SpotDocument) -> Result<(), BackendError> {
        let external_id = require_external_id(document)?;
        let mut documents = self.lock("insert document")?;
        if documents
            .iter()
            .any(|stored| stored.external_id() == Some(external_id))
        {
            return Err(BackendError::DuplicateKey { external_id });
        }
        documents.push(document.clone());
        Ok(())
    }

    fn find_one_and_update(
        &self,
        filter: &Filter,
        document: &SpotDocument,
    ) -> Result<Option<SpotDocument>, BackendError> {
        let external_id = require_external_id(document)?;
        let mut documents = self.lock("update document")?;
        let Some(position) = documents.iter().position(|stored| filter.matches(stored)) else {
            return Ok(None);
        };
        let clashes = documents.iter().enumerate().any(|(index, stored)| {
            index != position && stored.external_id() == Some(external_id)
        });
        if clashes {
            return Err(BackendError::DuplicateKey { external_id });
        }
        let Some(slot) = documents.get_mut(position) else {
            return Ok(None);
        };
        *slot = document.clone();
        Ok(Some(slot.clone()))
    }

    fn find_one_and_delete(&self, filter: &Filter) -> Result<Option<SpotDocument>, BackendError> {
        let mut documents = self.lock("delete document")?;
        Ok(documents
            .iter()
            .position(|stored| filter.matches(stored))
            .map(|position| documents.remove(position)))
    }
}
