//! Spot records as received from Hitchwiki and as persisted.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::sanitize::{EncodingRepair, SanitizeError, sanitize_fields};
use crate::trip::Waypoint;

/// Key under which the upstream identifier is stored in `raw`.
pub const EXTERNAL_ID_KEY: &str = "external_id";

/// Identifier field used by upstream Hitchwiki payloads.
pub const UPSTREAM_ID_KEY: &str = "id";

/// Nested field map of a spot, keyed by field name.
pub type Fields = Map<String, Value>;

/// Errors returned by [`SpotRecord::from_upstream`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpotRecordError {
    /// The upstream payload was not a JSON object.
    #[error("upstream spot must be a JSON object, got {value}")]
    NotAnObject {
        /// Offending payload.
        value: Value,
    },
    /// The upstream payload had no `id` field.
    #[error("upstream spot has no `id` field")]
    MissingId,
    /// The `id` field was neither an unsigned integer nor a numeric string.
    #[error("upstream spot id {value} is not an unsigned integer")]
    InvalidId {
        /// Offending identifier value.
        value: Value,
    },
}

/// A spot as fetched from the upstream source.
///
/// `raw` always carries the `external_id` key.
///
/// # Examples
///
/// ```
/// use hitchspots_core::SpotRecord;
/// use serde_json::json;
///
/// let record = SpotRecord::from_upstream(json!({ "id": "7", "lat": 1.0, "lon": 2.0 }))?;
/// assert_eq!(record.external_id(), 7);
/// assert_eq!(record.raw()["external_id"], json!(7));
/// # Ok::<(), hitchspots_core::SpotRecordError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SpotRecord {
    external_id: u64,
    raw: Fields,
}

impl SpotRecord {
    /// Build a record from its identifier and upstream fields.
    ///
    /// The `external_id` key in `fields` is overwritten with `external_id`.
    #[must_use]
    pub fn new(external_id: u64, mut fields: Fields) -> Self {
        fields.insert(EXTERNAL_ID_KEY.to_owned(), Value::from(external_id));
        Self {
            external_id,
            raw: fields,
        }
    }

    /// Build a record from an upstream JSON object, reading its `id` field.
    pub fn from_upstream(value: Value) -> Result<Self, SpotRecordError> {
        let Value::Object(fields) = value else {
            return Err(SpotRecordError::NotAnObject { value });
        };
        let id = fields
            .get(UPSTREAM_ID_KEY)
            .ok_or(SpotRecordError::MissingId)?;
        let external_id =
            parse_external_id(id).ok_or_else(|| SpotRecordError::InvalidId { value: id.clone() })?;
        Ok(Self::new(external_id, fields))
    }

    /// Upstream identifier; the persistence key.
    #[must_use]
    pub const fn external_id(&self) -> u64 {
        self.external_id
    }

    /// Unmodified upstream fields.
    #[must_use]
    pub const fn raw(&self) -> &Fields {
        &self.raw
    }

    /// Derive the persisted `{raw, sanitized}` document.
    pub fn to_document(&self, repair: EncodingRepair) -> Result<SpotDocument, SanitizeError> {
        Ok(SpotDocument {
            sanitized: sanitize_fields(&self.raw, repair)?,
            raw: self.raw.clone(),
        })
    }
}

fn parse_external_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Persisted form of a spot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotDocument {
    /// Fields exactly as received upstream, including `external_id`.
    pub raw: Fields,
    /// Sanitised view of `raw`.
    pub sanitized: Fields,
}

impl SpotDocument {
    /// Upstream identifier read from `raw`, if present and numeric.
    #[must_use]
    pub fn external_id(&self) -> Option<u64> {
        self.raw.get(EXTERNAL_ID_KEY).and_then(Value::as_u64)
    }

    /// Coordinates read from the sanitised view.
    #[must_use]
    pub fn waypoint(&self) -> Option<Waypoint> {
        let lat = self.sanitized.get("lat").and_then(Value::as_f64)?;
        let lon = self.sanitized.get("lon").and_then(Value::as_f64)?;
        Some(Waypoint { lat, lon })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!(42))]
    #[case(json!("42"))]
    fn reads_numeric_and_string_ids(#[case] id: Value) {
        let record =
            SpotRecord::from_upstream(json!({ "id": id, "lat": 1 })).expect("valid upstream spot");
        assert_eq!(record.external_id(), 42);
        assert_eq!(record.raw()[EXTERNAL_ID_KEY], json!(42));
        assert_eq!(record.raw()["lat"], json!(1));
    }

    #[rstest]
    #[case(json!({ "lat": 1 }), SpotRecordError::MissingId)]
    #[case(json!({ "id": -3 }), SpotRecordError::InvalidId { value: json!(-3) })]
    #[case(json!({ "id": "abc" }), SpotRecordError::InvalidId { value: json!("abc") })]
    #[case(json!([1, 2]), SpotRecordError::NotAnObject { value: json!([1, 2]) })]
    fn rejects_invalid_upstream_payloads(#[case] payload: Value, #[case] expected: SpotRecordError) {
        let err = SpotRecord::from_upstream(payload).expect_err("payload should be rejected");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn new_overrides_external_id_field() {
        let mut fields = Fields::new();
        fields.insert(EXTERNAL_ID_KEY.into(), json!("stale"));

        let record = SpotRecord::new(9, fields);

        assert_eq!(record.raw()[EXTERNAL_ID_KEY], json!(9));
    }

    #[rstest]
    fn document_exposes_id_and_waypoint() {
        let record = SpotRecord::from_upstream(json!({ "id": 5, "lat": "60.1", "lon": "24.9" }))
            .expect("valid upstream spot");

        let document = record
            .to_document(EncodingRepair::Enabled)
            .expect("numeric coordinates");

        assert_eq!(document.external_id(), Some(5));
        assert_eq!(
            document.waypoint(),
            Some(Waypoint {
                lat: 60.1,
                lon: 24.9
            })
        );
        assert_eq!(document.raw["lat"], json!("60.1"));
    }

    #[rstest]
    fn waypoint_requires_both_coordinates() {
        let record = SpotRecord::new(1, json!({ "lat": 3 }).as_object().cloned().unwrap_or_default());
        let document = record
            .to_document(EncodingRepair::Enabled)
            .expect("numeric latitude");
        assert_eq!(document.waypoint(), None);
    }
}
