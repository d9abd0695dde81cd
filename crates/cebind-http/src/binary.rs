//! Binary content mode: attributes in `ce-` headers, payload as the body.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use cebind_core::{is_reserved, Event, EventMap, MapError, DATA, DATA_BASE64};
use serde_json::Value;

use crate::codec::Codec;
use crate::envelope::Envelope;
use crate::errors::CodecError;

const HEADER_PREFIX: &str = "ce-";

/// Attributes written as `ce-` headers, in write order.
const HEADER_ATTRIBUTES: [&str; 7] = [
    "id",
    "source",
    "specversion",
    "type",
    "dataschema",
    "subject",
    "time",
];

impl Codec {
    /// Decodes one binary-mode event.
    ///
    /// `ce-datacontenttype`, `ce-data` and `ce-data_base64` headers are
    /// protocol violations. Extension values are read as JSON only when the
    /// header text is the compact rendering of what it parses to, and as plain
    /// strings otherwise, so `1.10` stays the string `"1.10"`.
    ///
    /// Header names are case-insensitive, so attribute and extension names
    /// come back lower-cased: an extension written as `MyExt` decodes as
    /// `myext`.
    pub fn decode_binary(&self, envelope: &dyn Envelope) -> Result<Event, CodecError> {
        if let Some(value) = envelope.header("ce-datacontenttype").filter(|v| !v.is_empty()) {
            return Err(CodecError::ProtocolViolation(format!(
                "ce-datacontenttype must be empty in binary mode, got '{value}'"
            )));
        }

        let mut attributes = Vec::new();
        envelope.visit_headers(&mut |name, value| {
            let name = name.to_ascii_lowercase();
            if let Some(key) = name.strip_prefix(HEADER_PREFIX) {
                attributes.push((key.to_string(), value.to_string()));
            }
        });

        let mut map = EventMap::new();
        for (key, value) in attributes {
            if key == DATA || key == DATA_BASE64 {
                return Err(CodecError::ProtocolViolation(format!(
                    "binary header forbidden: ce-{key}"
                )));
            }
            let value = if is_reserved(&key) {
                Value::String(value)
            } else {
                extension_value(value)
            };
            map.insert(key, value);
        }

        map.remove("datacontenttype");
        if let Some(content_type) = envelope.header("Content-Type") {
            map.insert("datacontenttype", content_type);
        }
        map.set_data(envelope.body());

        Ok(self.mapping().to_event(&map)?)
    }

    /// Encodes one event in binary mode.
    ///
    /// Headers and body are computed first, so a mapping failure leaves the
    /// envelope untouched.
    pub fn encode_binary(&self, envelope: &mut dyn Envelope, event: &Event) -> Result<(), CodecError> {
        let map = self.mapping().to_map(event)?;

        let mut headers = Vec::new();
        for attribute in HEADER_ATTRIBUTES {
            if let Some(value) = string_attribute(&map, attribute)? {
                headers.push((format!("{HEADER_PREFIX}{attribute}"), value.to_string()));
            }
        }
        if let Some(content_type) = string_attribute(&map, "datacontenttype")? {
            headers.push(("Content-Type".to_string(), content_type.to_string()));
        }
        for (name, value) in map.extensions() {
            let encoded = serde_json::to_string(value).unwrap_or_else(|_| value.to_string());
            headers.push((format!("{HEADER_PREFIX}{name}"), encoded));
        }

        let body = payload(&map)?;

        for (name, value) in &headers {
            envelope.set_header(name, value);
        }
        if !body.is_empty() {
            envelope.append_body(&body);
        }
        Ok(())
    }
}

fn extension_value(raw: String) -> Value {
    match serde_json::from_str::<Value>(&raw) {
        Ok(parsed) if serde_json::to_string(&parsed).is_ok_and(|text| text == raw) => parsed,
        _ => Value::String(raw),
    }
}

fn string_attribute<'a>(
    map: &'a EventMap,
    attribute: &'static str,
) -> Result<Option<&'a str>, CodecError> {
    match map.get(attribute) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value)),
        Some(_) => Err(CodecError::MapProjection(MapError::InvalidAttribute {
            attribute,
            expected: "string",
        })),
    }
}

/// Raw payload bytes: `data_base64` decoded, or `data` rendered as JSON when a
/// custom mapping only supplies that.
fn payload(map: &EventMap) -> Result<Vec<u8>, CodecError> {
    match map.get(DATA_BASE64) {
        Some(Value::String(encoded)) => STANDARD
            .decode(encoded)
            .map_err(|e| CodecError::MapProjection(MapError::Base64(e))),
        Some(Value::Null) | None if map.has_json_data() => match map.get(DATA) {
            Some(Value::String(text)) => Ok(text.as_bytes().to_vec()),
            Some(other) => Ok(serde_json::to_vec(other)?),
            None => Ok(Vec::new()),
        },
        Some(Value::Null) | None => Ok(Vec::new()),
        Some(_) => Err(CodecError::MapProjection(MapError::InvalidAttribute {
            attribute: DATA_BASE64,
            expected: "base64 string",
        })),
    }
}
