//! Firestore REST value encoding.
//!
//! Every value on the wire is a single-key object naming its type:
//! `{"stringValue": "x"}`, `{"integerValue": "42"}`,
//! `{"mapValue": {"fields": {...}}}` and so on.
//!
//! References, geo points and bytes have no native counterpart here and are
//! decoded lossily: a reference becomes its document path, a geo point a
//! `{latitude, longitude}` map, bytes their base64 string.

use chrono::{DateTime, SecondsFormat};
use serde_json::{json, Map, Value as Json};

use crate::models::{Fields, Timestamp, Value};
use crate::store::{StoreError, StoreResult};

/// Decodes a Firestore `fields` object.
pub fn decode_fields(fields: &Map<String, Json>) -> StoreResult<Fields> {
    fields
        .iter()
        .map(|(key, value)| Ok((key.clone(), decode_value(value)?)))
        .collect()
}

/// Encodes native fields into a Firestore `fields` object.
pub fn encode_fields(fields: &Fields) -> Map<String, Json> {
    fields
        .iter()
        .map(|(key, value)| (key.clone(), encode_value(value)))
        .collect()
}

pub fn decode_value(value: &Json) -> StoreResult<Value> {
    let obj = value
        .as_object()
        .ok_or_else(|| StoreError::Decode(format!("expected typed value, got {}", value)))?;
    let (kind, inner) = obj
        .iter()
        .next()
        .ok_or_else(|| StoreError::Decode("empty value object".to_string()))?;

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => inner
            .as_bool()
            .map(Value::Boolean)
            .ok_or_else(|| bad(kind, inner)),
        "integerValue" => decode_integer(inner).ok_or_else(|| bad(kind, inner)),
        "doubleValue" => decode_double(inner).ok_or_else(|| bad(kind, inner)),
        "stringValue" | "bytesValue" => inner
            .as_str()
            .map(Value::from)
            .ok_or_else(|| bad(kind, inner)),
        "referenceValue" => inner
            .as_str()
            .map(|name| Value::from(relative_reference(name)))
            .ok_or_else(|| bad(kind, inner)),
        "timestampValue" => {
            let s = inner.as_str().ok_or_else(|| bad(kind, inner))?;
            let dt = DateTime::parse_from_rfc3339(s)
                .map_err(|e| StoreError::Decode(format!("timestampValue {:?}: {}", s, e)))?;
            Ok(Value::Timestamp(Timestamp::from_datetime(&dt)))
        }
        "geoPointValue" => {
            let mut point = Fields::new();
            for axis in ["latitude", "longitude"] {
                let coordinate = inner.get(axis).and_then(Json::as_f64).unwrap_or(0.0);
                point.insert(axis.to_string(), Value::Double(coordinate));
            }
            Ok(Value::Map(point))
        }
        "arrayValue" => {
            let values = match inner.get("values") {
                Some(Json::Array(items)) => items
                    .iter()
                    .map(decode_value)
                    .collect::<StoreResult<Vec<_>>>()?,
                Some(other) => return Err(bad(kind, other)),
                None => Vec::new(),
            };
            Ok(Value::Array(values))
        }
        "mapValue" => {
            let fields = match inner.get("fields") {
                Some(Json::Object(fields)) => decode_fields(fields)?,
                Some(other) => return Err(bad(kind, other)),
                None => Fields::new(),
            };
            Ok(Value::Map(fields))
        }
        other => Err(StoreError::Decode(format!("unknown value type {:?}", other))),
    }
}

pub fn encode_value(value: &Value) -> Json {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Boolean(b) => json!({ "booleanValue": b }),
        Value::Integer(n) => json!({ "integerValue": n.to_string() }),
        Value::Double(f) => {
            if f.is_nan() {
                json!({ "doubleValue": "NaN" })
            } else if f.is_infinite() {
                let s = if *f > 0.0 { "Infinity" } else { "-Infinity" };
                json!({ "doubleValue": s })
            } else {
                json!({ "doubleValue": f })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Timestamp(ts) => json!({
            "timestampValue": ts.to_datetime().to_rfc3339_opts(SecondsFormat::Nanos, true)
        }),
        Value::Array(values) => {
            let values: Vec<Json> = values.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Map(fields) => json!({ "mapValue": { "fields": encode_fields(fields) } }),
    }
}

fn bad(kind: &str, inner: &Json) -> StoreError {
    StoreError::Decode(format!("malformed {}: {}", kind, inner))
}

fn decode_integer(inner: &Json) -> Option<Value> {
    match inner {
        Json::String(s) => s.parse().ok().map(Value::Integer),
        Json::Number(n) => n.as_i64().map(Value::Integer),
        _ => None,
    }
}

fn decode_double(inner: &Json) -> Option<Value> {
    match inner {
        Json::Number(n) => n.as_f64().map(Value::Double),
        Json::String(s) => match s.as_str() {
            "NaN" => Some(Value::Double(f64::NAN)),
            "Infinity" => Some(Value::Double(f64::INFINITY)),
            "-Infinity" => Some(Value::Double(f64::NEG_INFINITY)),
            _ => None,
        },
        _ => None,
    }
}

/// `projects/p/databases/d/documents/users/1` -> `users/1`
fn relative_reference(name: &str) -> &str {
    name.split_once("/documents/")
        .map(|(_, path)| path)
        .unwrap_or(name)
}
