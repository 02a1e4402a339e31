//! Validated access to decoded resource bodies.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::FieldError;

/// A decoded resource body: the field map found under the envelope key.
///
/// Typed accessors replace raw string indexing at the service boundary, so
/// a missing or mistyped field fails with a named error at the call site
/// instead of a panic three frames deep in an assertion.
///
/// Field order is preserved as the service sent it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fields(Map<String, Value>);

impl Fields {
    /// Creates an empty body.
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Wraps an already-decoded field map.
    #[must_use]
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Inserts a field, returning the previous value if one existed.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Raw access to a field value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Whether a field is present at all.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of fields in the body.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the body has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The field as a string.
    pub fn str(&self, key: &str) -> Result<&str, FieldError> {
        self.require(key)?
            .as_str()
            .ok_or_else(|| FieldError::WrongType {
                field: key.to_string(),
                expected: "a string",
            })
    }

    /// The field as a signed integer.
    pub fn int(&self, key: &str) -> Result<i64, FieldError> {
        self.require(key)?
            .as_i64()
            .ok_or_else(|| FieldError::WrongType {
                field: key.to_string(),
                expected: "an integer",
            })
    }

    /// The field as a boolean.
    pub fn bool(&self, key: &str) -> Result<bool, FieldError> {
        self.require(key)?
            .as_bool()
            .ok_or_else(|| FieldError::WrongType {
                field: key.to_string(),
                expected: "a boolean",
            })
    }

    /// The field as a JSON array.
    pub fn array(&self, key: &str) -> Result<&Vec<Value>, FieldError> {
        self.require(key)?
            .as_array()
            .ok_or_else(|| FieldError::WrongType {
                field: key.to_string(),
                expected: "an array",
            })
    }

    /// The field as a nested object, rewrapped for further typed access.
    pub fn object(&self, key: &str) -> Result<Fields, FieldError> {
        self.require(key)?
            .as_object()
            .map(|map| Fields(map.clone()))
            .ok_or_else(|| FieldError::WrongType {
                field: key.to_string(),
                expected: "an object",
            })
    }

    /// The `id` field. Nearly every resource body carries one.
    pub fn id(&self) -> Result<&str, FieldError> {
        self.str("id")
    }

    /// Borrows the underlying map.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Unwraps into the underlying map.
    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    fn require(&self, key: &str) -> Result<&Value, FieldError> {
        self.0
            .get(key)
            .ok_or_else(|| FieldError::Missing(key.to_string()))
    }
}

impl From<Map<String, Value>> for Fields {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl IntoIterator for Fields {
    type Item = (String, Value);
    type IntoIter = serde_json::map::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Builds a [`Fields`] body from literal key/value pairs.
///
/// Values go through `serde_json::json!`, so anything that macro accepts
/// works here, including `null` for the unset sentinel:
///
/// ```
/// use stratus_envelope::fields;
///
/// let body = fields! {
///     "name" => "net-1",
///     "admin_state_up" => true,
///     "description" => null,
/// };
/// assert_eq!(body.len(), 3);
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::Fields::new()
    };
    ($($key:expr => $value:tt),+ $(,)?) => {{
        let mut fields = $crate::Fields::new();
        $(
            fields.insert($key, $crate::__serde_json::json!($value));
        )+
        fields
    }};
}
