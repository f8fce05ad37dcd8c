//! Field normalization between native store values and portable JSON.
//!
//! The two directions mirror each other:
//!
//! - [`Normalizer::to_portable`] turns native values into JSON for export.
//! - [`Normalizer::to_native`] turns exported JSON back into native values.
//!
//! With timestamp normalization on, timestamps become
//! `M/D/YYYY, H:MM:SS AM|PM UTC+7` strings and map-shaped `sharedWith`
//! fields become arrays of their keys. With it off, timestamps are written
//! as `{"_seconds": .., "_nanoseconds": ..}` objects and `sharedWith` is left
//! alone. The raw timestamp shape is recognized on import in both modes.

mod timestamp;

pub use timestamp::{
    format_timestamp, looks_like_timestamp, parse_timestamp, TimestampError, ZONE_SUFFIX,
};

use serde_json::{Map, Number, Value as Json};

use crate::models::{Document, Fields, Timestamp, Value};

/// Field whose map form is collapsed to an array of identifiers.
pub const SHARED_WITH: &str = "sharedWith";

/// Key that carries the document id in portable form.
pub const ID_KEY: &str = "id";

const RAW_SECONDS: &str = "_seconds";
const RAW_NANOS: &str = "_nanoseconds";

/// Converts values between native and portable form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalizer {
    normalize_timestamps: bool,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Normalizer {
    pub fn new(normalize_timestamps: bool) -> Self {
        Self {
            normalize_timestamps,
        }
    }

    /// Normalizer that leaves timestamps in raw object form.
    pub fn raw() -> Self {
        Self::new(false)
    }

    // ------------------------------------------------------------------
    // Export direction
    // ------------------------------------------------------------------

    pub fn to_portable(&self, value: &Value) -> Json {
        match value {
            Value::Null => Json::Null,
            Value::Boolean(b) => Json::Bool(*b),
            Value::Integer(n) => Json::from(*n),
            // JSON has no NaN or infinity
            Value::Double(f) => Number::from_f64(*f).map(Json::Number).unwrap_or(Json::Null),
            Value::String(s) => Json::String(s.clone()),
            Value::Timestamp(ts) => self.timestamp_to_portable(ts),
            Value::Array(values) => {
                Json::Array(values.iter().map(|v| self.to_portable(v)).collect())
            }
            Value::Map(fields) => Json::Object(self.fields_to_portable(fields)),
        }
    }

    pub fn fields_to_portable(&self, fields: &Fields) -> Map<String, Json> {
        fields
            .iter()
            .map(|(key, value)| (key.clone(), self.entry_to_portable(key, value)))
            .collect()
    }

    fn entry_to_portable(&self, key: &str, value: &Value) -> Json {
        if self.normalize_timestamps && key == SHARED_WITH {
            if let Value::Map(shared) = value {
                return Json::Array(shared.keys().cloned().map(Json::String).collect());
            }
        }
        self.to_portable(value)
    }

    fn timestamp_to_portable(&self, ts: &Timestamp) -> Json {
        if self.normalize_timestamps {
            return Json::String(format_timestamp(ts));
        }
        let mut raw = Map::new();
        raw.insert(RAW_SECONDS.to_string(), Json::from(ts.seconds()));
        raw.insert(RAW_NANOS.to_string(), Json::from(ts.nanos()));
        Json::Object(raw)
    }

    /// Portable form of a whole document: `{id, ...fields}` with `id` first.
    pub fn document_to_portable(&self, doc: &Document) -> Map<String, Json> {
        let mut out = Map::new();
        out.insert(ID_KEY.to_string(), Json::String(doc.id.clone()));
        for (key, value) in self.fields_to_portable(&doc.fields) {
            if key == ID_KEY {
                tracing::warn!(
                    "Document {} has a field named 'id'; it is shadowed by the document id",
                    doc.id
                );
                continue;
            }
            out.insert(key, value);
        }
        out
    }

    // ------------------------------------------------------------------
    // Import direction
    // ------------------------------------------------------------------

    pub fn to_native(&self, json: &Json) -> Value {
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Boolean(*b),
            Json::Number(n) => number_to_native(n),
            Json::String(s) => self.string_to_native(s),
            Json::Array(items) => Value::Array(items.iter().map(|v| self.to_native(v)).collect()),
            Json::Object(map) => match raw_timestamp(map) {
                Some(ts) => Value::Timestamp(ts),
                None => Value::Map(self.fields_to_native(map)),
            },
        }
    }

    pub fn fields_to_native(&self, map: &Map<String, Json>) -> Fields {
        map.iter()
            .map(|(key, value)| (key.clone(), self.entry_to_native(key, value)))
            .collect()
    }

    fn entry_to_native(&self, key: &str, value: &Json) -> Value {
        if self.normalize_timestamps && key == SHARED_WITH {
            match value {
                Json::Array(items) => {
                    let verbatim = Self::raw();
                    return Value::Array(items.iter().map(|v| verbatim.to_native(v)).collect());
                }
                Json::Object(shared) if raw_timestamp(shared).is_none() => {
                    return Value::Array(shared.keys().cloned().map(Value::String).collect());
                }
                _ => {}
            }
        }
        self.to_native(value)
    }

    fn string_to_native(&self, s: &str) -> Value {
        if self.normalize_timestamps && looks_like_timestamp(s) {
            match parse_timestamp(s) {
                Ok(ts) => return Value::Timestamp(ts),
                Err(e) => {
                    tracing::warn!("Failed to parse timestamp \"{}\": {}", s, e);
                }
            }
        }
        Value::String(s.to_string())
    }
}

/// Splits a portable document into its id and remaining fields.
///
/// Returns `None` if `id` is missing or not a string.
pub fn split_id(mut obj: Map<String, Json>) -> Option<(String, Map<String, Json>)> {
    match obj.remove(ID_KEY) {
        Some(Json::String(id)) => Some((id, obj)),
        _ => None,
    }
}

fn number_to_native(n: &Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::Integer(i)
    } else {
        n.as_f64().map(Value::Double).unwrap_or(Value::Null)
    }
}

/// Recognizes `{"_seconds": n, "_nanoseconds": n}`.
fn raw_timestamp(map: &Map<String, Json>) -> Option<Timestamp> {
    if map.len() != 2 {
        return None;
    }
    let seconds = map.get(RAW_SECONDS)?.as_i64()?;
    let nanos = u32::try_from(map.get(RAW_NANOS)?.as_u64()?).ok()?;
    Timestamp::new(seconds, nanos)
}
