//! Record sanitisation: encoding repair and coordinate coercion.
//!
//! Hitchwiki records carry an inconsistent encoding history. Many text fields
//! were valid UTF-8 that got decoded as Windows-1252 and re-encoded as UTF-8,
//! so `Café` arrives as `CafÃ©`. [`sanitize`] walks a raw record and
//!
//! - coerces every `lat`/`lon` value to `f64`, rejecting non-numeric input;
//! - when [`EncodingRepair::Enabled`], re-interprets text as Windows-1252
//!   bytes and decodes them as UTF-8, storing `null` for text with no valid
//!   reinterpretation.
//!
//! The walk is deterministic and holds no state, so sanitising the same raw
//! value twice yields identical output.

use std::borrow::Cow;

use encoding_rs::{UTF_8, WINDOWS_1252};
use log::debug;
use serde_json::{Map, Value};
use thiserror::Error;

/// Keys whose values are coerced to floating point at any nesting depth.
pub const COORDINATE_KEYS: [&str; 2] = ["lat", "lon"];

/// Whether text fields should be run through encoding repair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncodingRepair {
    /// Repair double-encoded text; unrepairable text becomes `null`.
    Enabled,
    /// Leave everything except coordinates untouched.
    Disabled,
}

/// Errors returned by [`sanitize`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SanitizeError {
    /// A coordinate field could not be coerced to a finite number.
    #[error("coordinate field `{key}` is not numeric: {value}")]
    MalformedCoordinate {
        /// Offending key, `lat` or `lon`.
        key: String,
        /// Raw value as received.
        value: Value,
    },
}

/// Sanitise a raw value.
///
/// Objects are walked key by key; any other value is treated as a keyless
/// field.
///
/// # Examples
///
/// ```
/// use hitchspots_core::{EncodingRepair, sanitize};
/// use serde_json::json;
///
/// let raw = json!({ "lat": "45.5", "lon": -73.6, "name": "CafÃ©" });
/// let clean = sanitize(&raw, EncodingRepair::Enabled)?;
/// assert_eq!(clean, json!({ "lat": 45.5, "lon": -73.6, "name": "Café" }));
/// # Ok::<(), hitchspots_core::SanitizeError>(())
/// ```
pub fn sanitize(value: &Value, repair: EncodingRepair) -> Result<Value, SanitizeError> {
    match value {
        Value::Object(fields) => sanitize_fields(fields, repair).map(Value::Object),
        other => sanitize_entry(None, other, repair),
    }
}

/// Sanitise every field of a mapping, preserving keys.
pub fn sanitize_fields(
    fields: &Map<String, Value>,
    repair: EncodingRepair,
) -> Result<Map<String, Value>, SanitizeError> {
    fields
        .iter()
        .map(|(key, value)| Ok((key.clone(), sanitize_entry(Some(key), value, repair)?)))
        .collect()
}

/// Re-interpret mis-decoded text as Windows-1252 bytes and decode as UTF-8.
///
/// Returns `None` when a character has no Windows-1252 byte or when the bytes
/// do not form valid UTF-8.
///
/// ```
/// use hitchspots_core::sanitize::repair_text;
///
/// assert_eq!(repair_text("ZÃ¼rich").as_deref(), Some("Zürich"));
/// assert_eq!(repair_text("東京"), None);
/// ```
#[must_use]
pub fn repair_text(text: &str) -> Option<String> {
    let (bytes, _, unmappable) = WINDOWS_1252.encode(text);
    if unmappable {
        return None;
    }
    UTF_8
        .decode_without_bom_handling_and_without_replacement(&bytes)
        .map(Cow::into_owned)
}

/// Shape of a single field as seen by the walk.
enum Field<'a> {
    Coordinate(&'a str, &'a Value),
    Text(&'a str),
    Sequence(&'a [Value]),
    Mapping(&'a Map<String, Value>),
    Scalar(&'a Value),
}

impl<'a> Field<'a> {
    fn classify(key: Option<&'a str>, value: &'a Value) -> Self {
        match (key, value) {
            (Some(name), _) if COORDINATE_KEYS.contains(&name) => Self::Coordinate(name, value),
            (_, Value::String(text)) => Self::Text(text),
            (_, Value::Array(items)) => Self::Sequence(items),
            (_, Value::Object(fields)) => Self::Mapping(fields),
            (_, other) => Self::Scalar(other),
        }
    }
}

fn sanitize_entry(
    key: Option<&str>,
    value: &Value,
    repair: EncodingRepair,
) -> Result<Value, SanitizeError> {
    match Field::classify(key, value) {
        Field::Coordinate(name, raw) => coerce_coordinate(name, raw).map(Value::from),
        _ if repair == EncodingRepair::Disabled => Ok(value.clone()),
        Field::Text(text) => Ok(repair_text(text).map_or_else(
            || {
                debug!("encoding repair failed for field {key:?}; storing null");
                Value::Null
            },
            Value::String,
        )),
        Field::Sequence(items) => items
            .iter()
            .map(|item| sanitize_entry(None, item, repair))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Field::Mapping(fields) => sanitize_fields(fields, repair).map(Value::Object),
        Field::Scalar(other) => Ok(other.clone()),
    }
}

fn coerce_coordinate(key: &str, value: &Value) -> Result<f64, SanitizeError> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|coordinate| coordinate.is_finite())
        .ok_or_else(|| SanitizeError::MalformedCoordinate {
            key: key.to_owned(),
            value: value.clone(),
        })
}
