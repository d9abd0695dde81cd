use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::event::is_reserved;

/// Key holding the payload as parsed JSON.
pub const DATA: &str = "data";

/// Key holding the payload as standard base64 text.
pub const DATA_BASE64: &str = "data_base64";

/// Intermediate attribute map between an [`Event`](crate::Event) and any wire
/// form.
///
/// Keys are kept sorted. When `data` holds a non-null value it wins over
/// `data_base64`: JSON serialization omits `data_base64`, and deserialization
/// drops it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventMap(Map<String, Value>);

impl EventMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns `true` when `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Inserts a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Removes and returns the value stored under `key`.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Iterates over entries in sorted key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Iterates over the entries that are not reserved context attributes.
    pub fn extensions(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter().filter(|(key, _)| !is_reserved(key))
    }

    /// Stores raw bytes under `data_base64` as standard base64 text.
    pub fn set_data(&mut self, bytes: &[u8]) {
        self.insert(DATA_BASE64, STANDARD.encode(bytes));
    }

    /// Returns `true` when `data` is present and not `null`.
    pub fn has_json_data(&self) -> bool {
        self.0.get(DATA).is_some_and(|value| !value.is_null())
    }

    /// Builds a map from a JSON value, which must be an object.
    ///
    /// Returns `None` for any other JSON type.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self::from(map)),
            _ => None,
        }
    }

    /// Converts into a JSON object, applying the `data` precedence rule.
    pub fn into_value(mut self) -> Value {
        if self.has_json_data() {
            self.0.remove(DATA_BASE64);
        }
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for EventMap {
    fn from(map: Map<String, Value>) -> Self {
        let mut map = Self(map);
        if map.has_json_data() {
            map.0.remove(DATA_BASE64);
        }
        map
    }
}

impl Serialize for EventMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let skip_base64 = self.has_json_data();
        let len = self.0.len() - usize::from(skip_base64 && self.0.contains_key(DATA_BASE64));
        let mut out = serializer.serialize_map(Some(len))?;
        for (key, value) in &self.0 {
            if skip_base64 && key == DATA_BASE64 {
                continue;
            }
            out.serialize_entry(key, value)?;
        }
        out.end()
    }
}

impl<'de> Deserialize<'de> for EventMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Map::<String, Value>::deserialize(deserializer).map(Self::from)
    }
}
