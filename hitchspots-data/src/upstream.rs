//! Reading Hitchwiki exports from disk.
//!
//! The upstream API answers with JSON arrays: full spot objects for detail
//! queries, and `{ "id": ... }` stubs for region listings. Both are read
//! here; turning them into records is left to
//! [`hitchspots_core::SpotRecord::from_upstream`].

use std::io::Read;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use serde_json::Value;
use thiserror::Error;

/// Errors raised while reading upstream exports.
#[derive(Debug, Error)]
pub enum LoadRecordsError {
    /// Opening the export failed.
    #[error("failed to open upstream export {path}")]
    Open {
        /// Export location.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The export was not valid JSON.
    #[error("failed to parse upstream export: {source}")]
    Parse {
        /// Parse failure.
        #[source]
        source: serde_json::Error,
    },
    /// The export was JSON but not an array.
    #[error("upstream export must be a JSON array, found {found}")]
    NotAnArray {
        /// Kind of JSON value found instead.
        found: &'static str,
    },
    /// A listing entry carried no usable id.
    #[error("listing entry {index} has no unsigned integer id: {entry}")]
    InvalidListingEntry {
        /// Position of the entry in the listing.
        index: usize,
        /// Offending entry.
        entry: Value,
    },
}

/// Read a JSON array of upstream spot objects.
///
/// Entries are returned unchanged, so one malformed spot does not prevent
/// the rest from being ingested.
pub fn read_upstream_records<R: Read>(reader: R) -> Result<Vec<Value>, LoadRecordsError> {
    let value: Value =
        serde_json::from_reader(reader).map_err(|source| LoadRecordsError::Parse { source })?;
    match value {
        Value::Array(entries) => Ok(entries),
        other => Err(LoadRecordsError::NotAnArray {
            found: kind_of(&other),
        }),
    }
}

/// Read upstream spot objects from the file at `path`.
pub fn load_upstream_records(path: &Utf8Path) -> Result<Vec<Value>, LoadRecordsError> {
    read_upstream_records(open(path)?)
}

/// Read spot ids from a region listing: an array of ids or of objects with
/// an `id` field.
///
/// ```
/// use hitchspots_data::upstream::read_spot_ids;
///
/// let ids = read_spot_ids(r#"[{ "id": "12" }, 7]"#.as_bytes())?;
/// assert_eq!(ids, vec![12, 7]);
/// # Ok::<(), hitchspots_data::upstream::LoadRecordsError>(())
/// ```
pub fn read_spot_ids<R: Read>(reader: R) -> Result<Vec<u64>, LoadRecordsError> {
    read_upstream_records(reader)?
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            listing_id(&entry).ok_or(LoadRecordsError::InvalidListingEntry { index, entry })
        })
        .collect()
}

/// Read a region listing from the file at `path`.
pub fn load_spot_ids(path: &Utf8Path) -> Result<Vec<u64>, LoadRecordsError> {
    read_spot_ids(open(path)?)
}

fn open(path: &Utf8Path) -> Result<fs_utf8::File, LoadRecordsError> {
    fs_utf8::File::open_ambient(path, ambient_authority()).map_err(|source| {
        LoadRecordsError::Open {
            path: path.to_path_buf(),
            source,
        }
    })
}

fn listing_id(entry: &Value) -> Option<u64> {
    let id = match entry {
        Value::Object(fields) => fields.get("id")?,
        other => other,
    };
    match id {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
