//! SQLite-backed document backend.

use std::{
    collections::BTreeSet,
    fmt,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use rusqlite::{
    Connection, ErrorCode, OptionalExtension, Row, params, params_from_iter, types::Value as SqlValue,
};
use thiserror::Error;

use crate::SpotDocument;

use super::{BackendError, DocumentBackend, Filter};

/// SQLite limits bound parameters per statement to 999 by default. Lookups by
/// id are chunked to remain below that ceiling.
const SQLITE_MAX_VARIABLE_NUMBER: usize = 999;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS spot_documents (
    id INTEGER PRIMARY KEY,
    external_id INTEGER NOT NULL UNIQUE,
    raw TEXT NOT NULL,
    sanitized TEXT NOT NULL
)";

/// Error raised when opening a [`SqliteBackend`].
#[derive(Debug, Error)]
pub enum SqliteBackendError {
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path}: {source}")]
    Open {
        /// Location of the database on disk.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Creating the document table failed.
    #[error("failed to create spot document schema: {source}")]
    Schema {
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
}

/// Document backend persisting spots as JSON columns in SQLite.
///
/// Updates and deletes are single `... RETURNING` statements, so each is
/// atomic with respect to other connections.
pub struct SqliteBackend {
    connection: Mutex<Connection>,
}

impl fmt::Debug for SqliteBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteBackend").finish_non_exhaustive()
    }
}

impl SqliteBackend {
    /// Open or create the database at `path` and ensure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SqliteBackendError> {
        let path = path.as_ref();
        let connection = Connection::open(path).map_err(|source| SqliteBackendError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_connection(connection)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, SqliteBackendError> {
        let connection = Connection::open_in_memory().map_err(|source| SqliteBackendError::Open {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        Self::from_connection(connection)
    }

    /// Wrap an existing connection, creating the schema if needed.
    pub fn from_connection(connection: Connection) -> Result<Self, SqliteBackendError> {
        connection
            .execute(SCHEMA, [])
            .map_err(|source| SqliteBackendError::Schema { source })?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn lock(&self, operation: &'static str) -> Result<MutexGuard<'_, Connection>, BackendError> {
        self.connection
            .lock()
            .map_err(|_| BackendError::Storage {
                operation,
                source: "SQLite connection mutex poisoned".into(),
            })
    }
}

/// Columns bound for a write.
struct EncodedDocument {
    id: u64,
    external_id: i64,
    raw: String,
    sanitized: String,
}

fn encode(document: &SpotDocument) -> Result<EncodedDocument, BackendError> {
    let external_id = document
        .external_id()
        .ok_or_else(|| BackendError::Rejected {
            reason: "raw.external_id must be an unsigned integer".to_owned(),
        })?;
    let raw = serde_json::to_string(&document.raw).map_err(rejected)?;
    let sanitized = serde_json::to_string(&document.sanitized).map_err(rejected)?;
    Ok(EncodedDocument {
        id: external_id,
        external_id: sql_id(external_id)?,
        raw,
        sanitized,
    })
}

fn sql_id(external_id: u64) -> Result<i64, BackendError> {
    i64::try_from(external_id).map_err(|_| BackendError::Rejected {
        reason: format!("external id {external_id} exceeds the SQLite integer range"),
    })
}

fn rejected(err: serde_json::Error) -> BackendError {
    BackendError::Rejected {
        reason: err.to_string(),
    }
}

fn decode(row: &Row<'_>) -> rusqlite::Result<(String, String)> {
    Ok((row.get(0)?, row.get(1)?))
}

fn into_document(
    operation: &'static str,
    (raw, sanitized): (String, String),
) -> Result<SpotDocument, BackendError> {
    let storage = |source: serde_json::Error| BackendError::Storage {
        operation,
        source: Box::new(source),
    };
    Ok(SpotDocument {
        raw: serde_json::from_str(&raw).map_err(storage)?,
        sanitized: serde_json::from_str(&sanitized).map_err(storage)?,
    })
}

/// Classify a `rusqlite` failure for a write of `external_id`.
fn write_error(operation: &'static str, external_id: u64, err: rusqlite::Error) -> BackendError {
    match err.sqlite_error() {
        Some(code) if code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE => {
            BackendError::DuplicateKey { external_id }
        }
        Some(code) if matches!(code.code, ErrorCode::ConstraintViolation | ErrorCode::TooBig) => {
            BackendError::Rejected {
                reason: err.to_string(),
            }
        }
        _ => storage_error(operation, err),
    }
}

fn storage_error(operation: &'static str, err: rusqlite::Error) -> BackendError {
    BackendError::Storage {
        operation,
        source: Box::new(err),
    }
}

fn find_chunk(
    connection: &Connection,
    ids: &[SqlValue],
) -> Result<Vec<SpotDocument>, BackendError> {
    const OPERATION: &str = "find documents";
    let placeholders = vec!["?"; ids.len()].join(", ");
    let query = format!(
        "SELECT raw, sanitized FROM spot_documents WHERE external_id IN ({placeholders})"
    );
    let mut statement = connection
        .prepare(&query)
        .map_err(|err| storage_error(OPERATION, err))?;
    let rows = statement
        .query_map(params_from_iter(ids.iter()), decode)
        .map_err(|err| storage_error(OPERATION, err))?;
    rows.map(|row| {
        row.map_err(|err| storage_error(OPERATION, err))
            .and_then(|columns| into_document(OPERATION, columns))
    })
    .collect()
}

fn find_all(connection: &Connection) -> Result<Vec<SpotDocument>, BackendError> {
    const OPERATION: &str = "list documents";
    let mut statement = connection
        .prepare("SELECT raw, sanitized FROM spot_documents ORDER BY id")
        .map_err(|err| storage_error(OPERATION, err))?;
    let rows = statement
        .query_map([], decode)
        .map_err(|err| storage_error(OPERATION, err))?;
    rows.map(|row| {
        row.map_err(|err| storage_error(OPERATION, err))
            .and_then(|columns| into_document(OPERATION, columns))
    })
    .collect()
}

/// Id list for a filter, or `None` when every row matches.
fn filter_ids(filter: &Filter) -> Option<Vec<u64>> {
    match filter {
        Filter::All => None,
        Filter::ExternalId(id) => Some(vec![*id]),
        Filter::ExternalIds(ids) => Some(ids.clone()),
    }
}

/// Distinct ids as bind parameters. Ids outside the SQLite integer range can
/// never be stored, so they are dropped from lookups.
fn bindable(ids: &[u64]) -> Vec<SqlValue> {
    ids.iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .filter_map(|id| i64::try_from(*id).ok())
        .map(SqlValue::Integer)
        .collect()
}

/// Row-selecting clause and parameters for single-row operations.
fn target_clause(filter: &Filter) -> (String, Vec<SqlValue>) {
    match filter_ids(filter) {
        None => (
            "SELECT id FROM spot_documents ORDER BY id LIMIT 1".to_owned(),
            Vec::new(),
        ),
        Some(ids) => {
            let values = bindable(&ids);
            let placeholders = vec!["?"; values.len()].join(", ");
            (
                format!(
                    "SELECT id FROM spot_documents WHERE external_id IN ({placeholders}) \
                     ORDER BY id LIMIT 1"
                ),
                values,
            )
        }
    }
}

impl DocumentBackend for SqliteBackend {
    fn find(&self, filter: &Filter) -> Result<Vec<SpotDocument>, BackendError> {
        let connection = self.lock("find documents")?;
        let Some(ids) = filter_ids(filter) else {
            return find_all(&connection);
        };
        let values = bindable(&ids);
        let mut documents = Vec::new();
        for chunk in values.chunks(SQLITE_MAX_VARIABLE_NUMBER) {
            documents.extend(find_chunk(&connection, chunk)?);
        }
        Ok(documents)
    }

    fn insert_one(&self, document: &SpotDocument) -> Result<(), BackendError> {
        const OPERATION: &str = "insert document";
        let encoded = encode(document)?;
        let connection = self.lock(OPERATION)?;
        connection
            .execute(
                "INSERT INTO spot_documents (external_id, raw, sanitized) VALUES (?1, ?2, ?3)",
                params![encoded.external_id, encoded.raw, encoded.sanitized],
            )
            .map_err(|err| write_error(OPERATION, encoded.id, err))?;
        Ok(())
    }

    fn find_one_and_update(
        &self,
        filter: &Filter,
        document: &SpotDocument,
    ) -> Result<Option<SpotDocument>, BackendError> {
        const OPERATION: &str = "update document";
        let encoded = encode(document)?;
        let id = encoded.id;
        let (target, mut values) = target_clause(filter);
        if values.is_empty() && filter_ids(filter).is_some() {
            return Ok(None);
        }
        let query = format!(
            "UPDATE spot_documents SET external_id = ?, raw = ?, sanitized = ? \
             WHERE id = ({target}) RETURNING raw, sanitized"
        );
        let mut parameters = vec![
            SqlValue::Integer(encoded.external_id),
            SqlValue::Text(encoded.raw),
            SqlValue::Text(encoded.sanitized),
        ];
        parameters.append(&mut values);

        let connection = self.lock(OPERATION)?;
        let row = connection
            .query_row(&query, params_from_iter(parameters.iter()), decode)
            .optional()
            .map_err(|err| write_error(OPERATION, id, err))?;
        row.map(|columns| into_document(OPERATION, columns))
            .transpose()
    }

    fn find_one_and_delete(&self, filter: &Filter) -> Result<Option<SpotDocument>, BackendError> {
        const OPERATION: &str = "delete document";
        let (target, values) = target_clause(filter);
        if values.is_empty() && filter_ids(filter).is_some() {
            return Ok(None);
        }
        let query =
            format!("DELETE FROM spot_documents WHERE id = ({target}) RETURNING raw, sanitized");

        let connection = self.lock(OPERATION)?;
        let row = connection
            .query_row(&query, params_from_iter(values.iter()), decode)
            .optional()
            .map_err(|err| storage_error(OPERATION, err))?;
        row.map(|columns| into_document(OPERATION, columns))
            .transpose()
    }
}
