//! Schemaless records and the documents that wrap them

use serde::de::DeserializeOwned;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

use crate::core::error::StoreError;

/// Field map of a stored record
pub type Record = Map<String, Value>;

/// A record annotated with its identifier
///
/// Serializes flat, as the record's fields plus `"id"`. A stored field named
/// `id` is shadowed by the document id. Spreading the stored fields over
/// `{ id, .. }` would let the stored field win instead; here the identifier
/// reported is always the one the store addresses the document by.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Record,
}

impl Document {
    pub fn new(id: impl Into<String>, data: Record) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    /// Look up a field, following dotted paths into nested maps
    pub fn get(&self, path: &str) -> Option<&Value> {
        get_path(&self.data, path)
    }

    /// Flatten into a single JSON object carrying the id
    pub fn to_value(&self) -> Value {
        let mut object = self.data.clone();
        object.insert("id".to_string(), Value::String(self.id.clone()));
        Value::Object(object)
    }

    /// Decode into a caller type, with `id` available as a field
    pub fn decode<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_value(self.to_value())
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields = self.data.iter().filter(|(key, _)| key.as_str() != "id");
        let mut map = serializer.serialize_map(Some(fields.clone().count() + 1))?;
        map.serialize_entry("id", &self.id)?;
        for (key, value) in fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Serialize a caller value into a record
///
/// Only values that serialize to a JSON object are accepted.
pub fn to_record<T: Serialize + ?Sized>(value: &T) -> Result<Record, StoreError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(record)) => Ok(record),
        Ok(other) => Err(StoreError::invalid_argument(format!(
            "Data must be an object, but it was: {}",
            json_type_name(&other)
        ))),
        Err(e) => Err(StoreError::invalid_argument(format!(
            "Data could not be serialized: {}",
            e
        ))),
    }
}

/// Reject field paths that are empty or have an empty segment
///
/// `"a."`, `".a"` and `"a..b"` all fail with `invalid-argument`.
pub fn validate_path(path: &str) -> Result<(), StoreError> {
    if path.split('.').any(str::is_empty) {
        return Err(StoreError::invalid_argument(format!(
            "Invalid field path '{}'. Paths must not be empty, begin with '.', end with '.', or contain '..'",
            path
        )));
    }
    Ok(())
}

/// Resolve a dotted field path (`"profile.city"`) within a record
pub fn get_path<'a>(record: &'a Record, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = record.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Write `value` at a dotted field path, creating intermediate maps
///
/// Intermediate values that are not maps are replaced.
pub fn set_path(record: &mut Record, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            record.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let child = record
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !child.is_object() {
                *child = Value::Object(Map::new());
            }
            if let Value::Object(map) = child {
                set_path(map, rest, value);
            }
        }
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
