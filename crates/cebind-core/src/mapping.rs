//! Mapping functions between the typed [`Event`] and the [`EventMap`] pivot.
//!
//! Every encoder calls [`Mapping::to_map`] and every decoder calls
//! [`Mapping::to_event`]; the codecs themselves never look at individual
//! attributes beyond the wire rules. Callers that need renamed, extra, or
//! stricter attributes supply their own pair at codec construction.

use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde_json::Value;

use crate::errors::MapError;
use crate::event::{is_reserved, Event};
use crate::map::{EventMap, DATA, DATA_BASE64};

type ToMapFn = dyn Fn(&Event) -> Result<EventMap, MapError> + Send + Sync;
type ToEventFn = dyn Fn(&EventMap) -> Result<Event, MapError> + Send + Sync;

/// Pair of event→map and map→event functions.
///
/// Cloning is cheap; both halves are reference counted.
#[derive(Clone)]
pub struct Mapping {
    to_map: Arc<ToMapFn>,
    to_event: Arc<ToEventFn>,
}

impl Mapping {
    /// Builds a mapping from two caller-supplied functions.
    pub fn new<M, E>(to_map: M, to_event: E) -> Self
    where
        M: Fn(&Event) -> Result<EventMap, MapError> + Send + Sync + 'static,
        E: Fn(&EventMap) -> Result<Event, MapError> + Send + Sync + 'static,
    {
        Self {
            to_map: Arc::new(to_map),
            to_event: Arc::new(to_event),
        }
    }

    /// Replaces the outbound (event→map) half.
    pub fn with_to_map<M>(mut self, to_map: M) -> Self
    where
        M: Fn(&Event) -> Result<EventMap, MapError> + Send + Sync + 'static,
    {
        self.to_map = Arc::new(to_map);
        self
    }

    /// Replaces the inbound (map→event) half.
    pub fn with_to_event<E>(mut self, to_event: E) -> Self
    where
        E: Fn(&EventMap) -> Result<Event, MapError> + Send + Sync + 'static,
    {
        self.to_event = Arc::new(to_event);
        self
    }

    /// Projects an event into the intermediate map.
    pub fn to_map(&self, event: &Event) -> Result<EventMap, MapError> {
        (self.to_map)(event)
    }

    /// Builds an event from the intermediate map.
    pub fn to_event(&self, map: &EventMap) -> Result<Event, MapError> {
        (self.to_event)(map)
    }
}

impl Default for Mapping {
    fn default() -> Self {
        Self::new(default_to_map, default_to_event)
    }
}

impl fmt::Debug for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mapping").finish_non_exhaustive()
    }
}

/// Formats a timestamp as RFC3339 with the shortest exact fraction
/// (0, 3, 6 or 9 digits) and `Z` for UTC.
pub fn format_time(time: &DateTime<FixedOffset>) -> String {
    time.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parses an RFC3339 timestamp with up to nanosecond precision.
pub fn parse_time(raw: &str) -> Result<DateTime<FixedOffset>, MapError> {
    Ok(DateTime::parse_from_rfc3339(raw)?)
}

/// Canonical event→map projection.
///
/// Required attributes are always written, optional ones only when present.
/// A non-empty payload is always written as `data_base64`; it is also written
/// as `data` when the payload is JSON whose compact rendering reproduces the
/// exact bytes, so that either key decodes back to the same payload.
pub fn default_to_map(event: &Event) -> Result<EventMap, MapError> {
    let mut map = EventMap::new();

    for (name, value) in &event.extensions {
        if is_reserved(name) {
            return Err(MapError::ExtensionNameCollision { name: name.clone() });
        }
        map.insert(name.clone(), value.clone());
    }

    map.insert("id", event.id.clone());
    map.insert("source", event.source.clone());
    map.insert("specversion", event.spec_version.clone());
    map.insert("type", event.event_type.clone());

    if let Some(value) = &event.data_content_type {
        map.insert("datacontenttype", value.clone());
    }
    if let Some(value) = &event.data_schema {
        map.insert("dataschema", value.clone());
    }
    if let Some(value) = &event.subject {
        map.insert("subject", value.clone());
    }
    if let Some(time) = &event.time {
        map.insert("time", format_time(time));
    }

    if let Some(data) = event.data.as_deref().filter(|data| !data.is_empty()) {
        map.set_data(data);
        if let Some(json) = lossless_json(data, event.data_content_type.as_deref()) {
            map.insert(DATA, json);
        }
    }

    Ok(map)
}

/// Canonical map→event projection.
///
/// Does not validate beyond what is needed to build the event; see
/// [`Event::validate`].
pub fn default_to_event(map: &EventMap) -> Result<Event, MapError> {
    build_event(map, required)
}

/// Map→event projection that lets required attributes be missing or empty.
///
/// They come back as empty strings, so [`Event::validate`] reports them as
/// hard errors instead of the projection refusing the whole map. Everything
/// else follows [`default_to_event`].
pub fn lenient_to_event(map: &EventMap) -> Result<Event, MapError> {
    build_event(map, |map, attribute| {
        Ok(optional(map, attribute)?.unwrap_or_default())
    })
}

fn build_event(
    map: &EventMap,
    required: impl Fn(&EventMap, &'static str) -> Result<String, MapError>,
) -> Result<Event, MapError> {
    let id = required(map, "id")?;
    let source = required(map, "source")?;
    let spec_version = required(map, "specversion")?;
    let event_type = required(map, "type")?;

    let data_content_type = optional(map, "datacontenttype")?;
    let data_schema = optional(map, "dataschema")?;
    let subject = optional(map, "subject")?;
    let time = optional(map, "time")?
        .map(|raw| parse_time(&raw))
        .transpose()?;

    let extensions = map
        .extensions()
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();
    let data = payload(map, data_content_type.as_deref())?;

    Ok(Event {
        id,
        source,
        spec_version,
        event_type,
        data_content_type,
        data_schema,
        subject,
        time,
        extensions,
        data,
    })
}

fn required(map: &EventMap, attribute: &'static str) -> Result<String, MapError> {
    match map.get(attribute) {
        Some(Value::String(value)) if !value.is_empty() => Ok(value.clone()),
        _ => Err(MapError::MissingRequiredField { attribute }),
    }
}

fn optional(map: &EventMap, attribute: &'static str) -> Result<Option<String>, MapError> {
    match map.get(attribute) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) if value.is_empty() => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(MapError::InvalidAttribute {
            attribute,
            expected: "string",
        }),
    }
}

fn payload(map: &EventMap, content_type: Option<&str>) -> Result<Option<Vec<u8>>, MapError> {
    let bytes = match (map.get(DATA), map.get(DATA_BASE64)) {
        (Some(data), _) if !data.is_null() => match data {
            Value::String(text) if !is_json_media_type(content_type) => text.as_bytes().to_vec(),
            other => serde_json::to_vec(other)?,
        },
        (_, None) | (_, Some(Value::Null)) => return Ok(None),
        (_, Some(Value::String(encoded))) => STANDARD.decode(encoded)?,
        (_, Some(_)) => {
            return Err(MapError::InvalidAttribute {
                attribute: DATA_BASE64,
                expected: "base64 string",
            })
        }
    };
    Ok(Some(bytes).filter(|bytes| !bytes.is_empty()))
}

/// Parses `data` as JSON only when decoding it again yields the same bytes.
fn lossless_json(data: &[u8], content_type: Option<&str>) -> Option<Value> {
    let value: Value = serde_json::from_slice(data).ok()?;
    if value.is_null() || (value.is_string() && !is_json_media_type(content_type)) {
        return None;
    }
    let rendered = serde_json::to_vec(&value).ok()?;
    (rendered == data).then_some(value)
}

/// An absent content type means JSON.
fn is_json_media_type(content_type: Option<&str>) -> bool {
    let Some(content_type) = content_type else {
        return true;
    };
    let media = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    media == "application/json" || media == "text/json" || media.ends_with("+json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map_from(value: Value) -> EventMap {
        EventMap::from_value(value).unwrap()
    }

    #[test]
    fn lenient_projection_leaves_required_checks_to_validate() {
        let event = lenient_to_event(&map_from(json!({"id": "", "type": "t", "ext": 1}))).unwrap();
        assert_eq!(event.id, "");
        assert_eq!(event.source, "");
        assert_eq!(event.event_type, "t");
        assert_eq!(event.extension("ext"), Some(&json!(1)));
        assert_eq!(
            event.validate().unwrap_err().to_string(),
            "Required field Id is empty"
        );

        let err = lenient_to_event(&map_from(json!({"id": "a", "time": "yesterday"}))).unwrap_err();
        assert!(matches!(err, MapError::Timestamp(_)));
    }

    #[test]
    fn required_attributes_are_checked_in_order() {
        let cases = [
            (json!({}), "id"),
            (json!({"id": ""}), "id"),
            (json!({"id": "a"}), "source"),
            (json!({"id": "a", "source": "b"}), "specversion"),
            (json!({"id": "a", "source": "b", "specversion": "c"}), "type"),
            (json!({"id": 1, "source": "b", "specversion": "c", "type": "d"}), "id"),
        ];
        for (input, expected) in cases {
            match default_to_event(&map_from(input)) {
                Err(MapError::MissingRequiredField { attribute }) => assert_eq!(attribute, expected),
                other => panic!("expected missing {expected}, got {other:?}"),
            }
        }
    }

    #[test]
    fn minimum_event() {
        let event =
            default_to_event(&map_from(json!({"id": "a", "source": "b", "specversion": "c", "type": "d"})))
                .unwrap();
        assert_eq!(event, Event::new("a", "b", "c", "d"));
    }

    #[test]
    fn optional_attribute_must_be_string() {
        let err = default_to_event(&map_from(
            json!({"id": "a", "source": "b", "specversion": "c", "type": "d", "subject": 5}),
        ))
        .unwrap_err();
        assert!(matches!(err, MapError::InvalidAttribute { attribute: "subject", .. }));
    }

    #[test]
    fn time_keeps_nanoseconds_and_offset() {
        let raw = "2020-02-02T06:06:06.366090001+10:00";
        let event = default_to_event(&map_from(
            json!({"id": "a", "source": "b", "specversion": "c", "type": "d", "time": raw}),
        ))
        .unwrap();
        let time = event.time.unwrap();
        assert_eq!(time.timestamp_subsec_nanos(), 366_090_001);
        assert_eq!(format_time(&time), raw);
    }

    #[test]
    fn millisecond_and_microsecond_times_parse() {
        for raw in [
            "2020-02-02T06:06:06.366+14:00",
            "2020-02-02T06:06:06.366090+12:00",
            "2020-02-02T06:06:06+08:00",
        ] {
            assert!(parse_time(raw).is_ok(), "{raw}");
        }
    }

    #[test]
    fn invalid_time_is_rejected() {
        let err = default_to_event(&map_from(json!({
            "id": "a", "source": "b", "specversion": "c", "type": "d",
            "time": "2020-02-02T06:06:60+25:00"
        })))
        .unwrap_err();
        assert!(matches!(err, MapError::Timestamp(_)));
    }

    #[test]
    fn utc_time_uses_z_suffix() {
        let time = parse_time("2020-02-02T06:06:06+00:00").unwrap();
        assert_eq!(format_time(&time), "2020-02-02T06:06:06Z");
    }

    #[test]
    fn json_data_takes_precedence_over_base64() {
        let event = default_to_event(&map_from(json!({
            "id": "a", "source": "b", "specversion": "c", "type": "d",
            "data": {"x": [1, 2, "3"]}, "data_base64": "eA=="
        })))
        .unwrap();
        assert_eq!(event.data.unwrap(), br#"{"x":[1,2,"3"]}"#.to_vec());
    }

    #[test]
    fn scalar_json_data() {
        let event = default_to_event(&map_from(json!({
            "id": "a", "source": "b", "specversion": "c", "type": "d", "data": 123
        })))
        .unwrap();
        assert_eq!(event.data.unwrap(), b"123".to_vec());
    }

    #[test]
    fn string_data_with_text_content_type_is_raw() {
        let event = default_to_event(&map_from(json!({
            "id": "a", "source": "b", "specversion": "c", "type": "d",
            "datacontenttype": "text/plain", "data": "hello"
        })))
        .unwrap();
        assert_eq!(event.data.unwrap(), b"hello".to_vec());
    }

    #[test]
    fn base64_data() {
        let event = default_to_event(&map_from(json!({
            "id": "a", "source": "b", "specversion": "c", "type": "d",
            "data_base64": "aGVsbG8gd29ybGQ="
        })))
        .unwrap();
        assert_eq!(event.data.unwrap(), b"hello world".to_vec());
    }

    #[test]
    fn bad_base64_is_rejected() {
        let err = default_to_event(&map_from(json!({
            "id": "a", "source": "b", "specversion": "c", "type": "d",
            "data_base64": "%%%"
        })))
        .unwrap_err();
        assert!(matches!(err, MapError::Base64(_)));
    }

    #[test]
    fn empty_base64_means_no_data() {
        let event = default_to_event(&map_from(json!({
            "id": "a", "source": "b", "specversion": "c", "type": "d", "data_base64": ""
        })))
        .unwrap();
        assert!(event.data.is_none());
    }

    #[test]
    fn extensions_keep_json_types() {
        let event = default_to_event(&map_from(json!({
            "id": "a", "source": "b", "specversion": "c", "type": "d",
            "x": 3, "y": null, "z": 0.1, "a": [{}], "any other string": true,
            "extensions": "Even this"
        })))
        .unwrap();
        assert_eq!(event.extension("x"), Some(&json!(3)));
        assert_eq!(event.extension("y"), Some(&Value::Null));
        assert_eq!(event.extension("z"), Some(&json!(0.1)));
        assert_eq!(event.extension("a"), Some(&json!([{}])));
        assert_eq!(event.extension("any other string"), Some(&json!(true)));
        assert_eq!(event.extension("extensions"), Some(&json!("Even this")));
    }

    #[test]
    fn non_canonical_json_payload_only_travels_as_base64() {
        let event = Event::new("a", "b", "c", "d").with_data(br#"{ "a": 2 }"#.to_vec());
        let map = default_to_map(&event).unwrap();
        assert!(!map.contains_key(DATA));
        assert_eq!(default_to_event(&map).unwrap(), event);
    }

    #[test]
    fn quoted_text_payload_is_not_unwrapped() {
        let event = Event::new("a", "b", "c", "d")
            .with_data_content_type("text/plain")
            .with_data(br#""quoted""#.to_vec());
        let map = default_to_map(&event).unwrap();
        assert!(!map.contains_key(DATA));
        assert_eq!(default_to_event(&map).unwrap(), event);
    }

    #[test]
    fn reserved_extension_is_rejected() {
        let event = Event::new("a", "b", "c", "d").with_extension("time", "now");
        let err = default_to_map(&event).unwrap_err();
        assert!(matches!(err, MapError::ExtensionNameCollision { ref name } if name == "time"));
    }

    #[test]
    fn custom_mapping_can_rename_attributes() {
        let mapping = Mapping::default()
            .with_to_map(|event| {
                let mut map = default_to_map(event)?;
                if let Some(subject) = map.remove("subject") {
                    map.insert("topic", subject);
                }
                Ok(map)
            })
            .with_to_event(|map| {
                let mut map = map.clone();
                if let Some(topic) = map.remove("topic") {
                    map.insert("subject", topic);
                }
                default_to_event(&map)
            });

        let event = Event::new("a", "b", "c", "d").with_subject("orders");
        let map = mapping.to_map(&event).unwrap();
        assert_eq!(map.get("topic"), Some(&json!("orders")));
        assert!(!map.contains_key("subject"));
        assert_eq!(mapping.to_event(&map).unwrap(), event);
    }
}
