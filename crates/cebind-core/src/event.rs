use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, FixedOffset};
use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::errors::MapError;
use crate::map::EventMap;
use crate::mapping::{default_to_event, default_to_map, Mapping};

/// Context attribute names that can never be used as extension names.
pub const RESERVED_ATTRIBUTES: [&str; 10] = [
    "id",
    "source",
    "specversion",
    "type",
    "datacontenttype",
    "dataschema",
    "subject",
    "time",
    "data",
    "data_base64",
];

/// Returns `true` when `name` is one of [`RESERVED_ATTRIBUTES`].
pub fn is_reserved(name: &str) -> bool {
    RESERVED_ATTRIBUTES.contains(&name)
}

/// A single CloudEvent.
///
/// Required attributes are plain strings (empty means "missing" and is
/// reported by [`Event::validate`]); optional attributes use `Option`.
/// Serde support goes through the default [`Mapping`], so `serde_json`
/// produces the structured-mode JSON form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Event {
    /// Event identifier, unique per source.
    pub id: String,
    /// URI-reference identifying the producer context.
    pub source: String,
    /// CloudEvents specification version.
    pub spec_version: String,
    /// Event type, e.g. `com.example.object.deleted`.
    pub event_type: String,
    /// RFC 2046 media type of `data`.
    pub data_content_type: Option<String>,
    /// URI of the schema `data` adheres to.
    pub data_schema: Option<String>,
    /// Subject of the event within the source.
    pub subject: Option<String>,
    /// Occurrence time; the UTC offset is kept as received.
    pub time: Option<DateTime<FixedOffset>>,
    /// Extension attributes keyed by name.
    pub extensions: BTreeMap<String, Value>,
    /// Opaque payload.
    pub data: Option<Vec<u8>>,
}

impl Event {
    /// Creates an event carrying only the required attributes.
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        spec_version: impl Into<String>,
        event_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            spec_version: spec_version.into(),
            event_type: event_type.into(),
            ..Self::default()
        }
    }

    /// Sets `datacontenttype`.
    pub fn with_data_content_type(mut self, value: impl Into<String>) -> Self {
        self.data_content_type = Some(value.into());
        self
    }

    /// Sets `dataschema`.
    pub fn with_data_schema(mut self, value: impl Into<String>) -> Self {
        self.data_schema = Some(value.into());
        self
    }

    /// Sets `subject`.
    pub fn with_subject(mut self, value: impl Into<String>) -> Self {
        self.subject = Some(value.into());
        self
    }

    /// Sets `time`.
    pub fn with_time(mut self, time: DateTime<FixedOffset>) -> Self {
        self.time = Some(time);
        self
    }

    /// Adds or replaces one extension attribute.
    pub fn with_extension(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extensions.insert(name.into(), value.into());
        self
    }

    /// Sets the payload.
    pub fn with_data(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Looks up an extension attribute.
    pub fn extension(&self, name: &str) -> Option<&Value> {
        self.extensions.get(name)
    }

    /// Compares two events through the outbound half of `mapping`.
    ///
    /// Keys are walked in sorted order and the first differing attribute is
    /// reported, so the result is deterministic.
    pub fn compare(&self, other: &Event, mapping: &Mapping) -> Result<Comparison, MapError> {
        let left = mapping.to_map(self)?;
        let right = mapping.to_map(other)?;
        let keys: BTreeSet<&String> = left.keys().chain(right.keys()).collect();
        for key in keys {
            if left.get(key) != right.get(key) {
                return Ok(Comparison::Differs(key.clone()));
            }
        }
        Ok(Comparison::Equal)
    }
}

/// Outcome of [`Event::compare`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comparison {
    /// Every mapped attribute matches.
    Equal,
    /// Name of the first attribute that differs.
    Differs(String),
}

impl Serialize for Event {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        default_to_map(self)
            .map_err(S::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Event {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = EventMap::deserialize(deserializer)?;
        default_to_event(&map).map_err(D::Error::custom)
    }
}
