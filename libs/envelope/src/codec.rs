//! Body codec strategies.
//!
//! The wire format is a strategy object chosen when a client is built.
//! Call sites hand over [`Fields`] and get [`Fields`] back; how those turn
//! into bytes never leaks past the codec.

use serde_json::{Map, Value};

use crate::error::EnvelopeError;
use crate::fields::Fields;

/// Strategy for wrapping request bodies and unwrapping response bodies.
pub trait BodyCodec: Send + Sync {
    /// MIME type declared on requests carrying an encoded body.
    fn content_type(&self) -> &'static str;

    /// Serializes one resource under the single top-level `key`.
    fn encode(&self, key: &str, fields: &Fields) -> Result<Vec<u8>, EnvelopeError>;

    /// Serializes several resources as a list under the plural `key`.
    fn encode_list(&self, key: &str, items: &[Fields]) -> Result<Vec<u8>, EnvelopeError>;

    /// Extracts the object found under `key` in a response body.
    fn decode(&self, key: &str, body: &[u8]) -> Result<Fields, EnvelopeError>;

    /// Extracts the list of objects found under `key` in a response body.
    fn decode_list(&self, key: &str, body: &[u8]) -> Result<Vec<Fields>, EnvelopeError>;
}

/// The JSON envelope convention: `{"<key>": {...}}` for a single resource,
/// `{"<key>": [...]}` for a list.
///
/// Encoding drops fields whose value is JSON `null`; callers use `null` as
/// the unset sentinel for optional attributes, and an unset attribute must
/// not appear on the wire at all. Nulls arriving in a response are real
/// data and pass through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEnvelope;

impl JsonEnvelope {
    fn wrap(key: &str, value: Value) -> Result<Vec<u8>, EnvelopeError> {
        let mut root = Map::new();
        root.insert(key.to_string(), value);
        Ok(serde_json::to_vec(&root)?)
    }

    fn unwrap<'a>(root: &'a Value, key: &str) -> Result<&'a Value, EnvelopeError> {
        root.get(key).ok_or_else(|| EnvelopeError::MissingKey {
            key: key.to_string(),
        })
    }

    fn without_unset(fields: &Fields) -> Value {
        let kept: Map<String, Value> = fields
            .as_map()
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Value::Object(kept)
    }

    fn as_object(key: &str, value: &Value) -> Result<Fields, EnvelopeError> {
        value
            .as_object()
            .map(|map| Fields::from_map(map.clone()))
            .ok_or_else(|| EnvelopeError::WrongShape {
                key: key.to_string(),
                expected: "an object",
            })
    }
}

impl BodyCodec for JsonEnvelope {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn encode(&self, key: &str, fields: &Fields) -> Result<Vec<u8>, EnvelopeError> {
        Self::wrap(key, Self::without_unset(fields))
    }

    fn encode_list(&self, key: &str, items: &[Fields]) -> Result<Vec<u8>, EnvelopeError> {
        let list: Vec<Value> = items.iter().map(Self::without_unset).collect();
        Self::wrap(key, Value::Array(list))
    }

    fn decode(&self, key: &str, body: &[u8]) -> Result<Fields, EnvelopeError> {
        let root: Value = serde_json::from_slice(body)?;
        Self::as_object(key, Self::unwrap(&root, key)?)
    }

    fn decode_list(&self, key: &str, body: &[u8]) -> Result<Vec<Fields>, EnvelopeError> {
        let root: Value = serde_json::from_slice(body)?;
        let items = Self::unwrap(&root, key)?
            .as_array()
            .ok_or_else(|| EnvelopeError::WrongShape {
                key: key.to_string(),
                expected: "a list",
            })?;
        items
            .iter()
            .map(|item| Self::as_object(key, item))
            .collect()
    }
}
