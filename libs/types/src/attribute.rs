//! Generic attribute map produced by the external metadata-document parser.
//!
//! The map preserves document order and carries three value kinds: strings,
//! nested maps, and lists. Scalar JSON values that are not strings (numbers,
//! booleans) are carried as their textual form so lenient extraction never
//! drops a field over a representation detail; nulls are skipped.

use thiserror::Error;

/// Errors raised while adapting an external document into an [`AttributeMap`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// The document root was not an object.
    #[error("metadata document root must be an object")]
    NotAnObject,
}

/// A single attribute value: string, nested map, or list.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    String(String),
    Map(AttributeMap),
    List(Vec<AttributeValue>),
}

impl AttributeValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&AttributeMap> {
        match self {
            AttributeValue::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[AttributeValue]> {
        match self {
            AttributeValue::List(l) => Some(l),
            _ => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::String(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::String(s)
    }
}

impl From<AttributeMap> for AttributeValue {
    fn from(m: AttributeMap) -> Self {
        AttributeValue::Map(m)
    }
}

/// Ordered mapping from string keys to [`AttributeValue`]s.
///
/// Insertion order is preserved; `insert` on an existing key replaces the
/// value in place. Lookup is a linear scan, which is fine for metadata
/// documents (a handful of top-level keys, bounded upstream).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributeMap {
    entries: Vec<(String, AttributeValue)>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a key, keeping the original position on replace.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AttributeValue>) {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Fetch a top-level string attribute.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(AttributeValue::as_str)
    }

    /// Fetch a top-level nested map attribute.
    pub fn get_map(&self, key: &str) -> Option<&AttributeMap> {
        self.get(key).and_then(AttributeValue::as_map)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl TryFrom<&serde_json::Value> for AttributeMap {
    type Error = DocumentError;

    fn try_from(value: &serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::Object(object) => Ok(map_from_object(object)),
            _ => Err(DocumentError::NotAnObject),
        }
    }
}

fn map_from_object(object: &serde_json::Map<String, serde_json::Value>) -> AttributeMap {
    let mut map = AttributeMap::new();
    for (key, value) in object {
        if let Some(converted) = convert_value(value) {
            map.insert(key.clone(), converted);
        }
    }
    map
}

fn convert_value(value: &serde_json::Value) -> Option<AttributeValue> {
    match value {
        serde_json::Value::String(s) => Some(AttributeValue::String(s.clone())),
        serde_json::Value::Object(object) => Some(AttributeValue::Map(map_from_object(object))),
        serde_json::Value::Array(items) => Some(AttributeValue::List(
            items.iter().filter_map(convert_value).collect(),
        )),
        serde_json::Value::Bool(b) => Some(AttributeValue::String(b.to_string())),
        serde_json::Value::Number(n) => Some(AttributeValue::String(n.to_string())),
        serde_json::Value::Null => None,
    }
}
