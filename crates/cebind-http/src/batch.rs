//! Batch content mode: a JSON array of events.

use cebind_core::{Event, EventMap, Mode};
use serde_json::Value;

use crate::codec::{require_content_type, Codec, JSON_SUBTYPE};
use crate::envelope::Envelope;
use crate::errors::CodecError;

impl Codec {
    /// Decodes a batch. The content type must start with
    /// `application/cloudevents-batch+json`; an empty array yields no events.
    pub fn decode_batch(&self, envelope: &dyn Envelope) -> Result<Vec<Event>, CodecError> {
        require_content_type(envelope, Mode::Batch)?;
        let elements: Vec<Value> = serde_json::from_slice(envelope.body())?;
        elements
            .into_iter()
            .enumerate()
            .map(|(index, element)| {
                let map = EventMap::from_value(element).ok_or_else(|| {
                    CodecError::at_index(
                        index,
                        CodecError::ProtocolViolation("batch element is not a JSON object".to_string()),
                    )
                })?;
                self.mapping()
                    .to_event(&map)
                    .map_err(|e| CodecError::at_index(index, e))
            })
            .collect()
    }

    /// Encodes `events` as a batch. An empty slice is rejected and nothing is
    /// written.
    pub fn encode_batch(&self, envelope: &mut dyn Envelope, events: &[Event]) -> Result<(), CodecError> {
        if events.is_empty() {
            return Err(CodecError::NoEvents);
        }
        let maps = events
            .iter()
            .enumerate()
            .map(|(index, event)| {
                self.mapping()
                    .to_map(event)
                    .map_err(|e| CodecError::at_index(index, e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let body = serde_json::to_vec(&maps)?;
        envelope.append_body(&body);
        envelope.set_header("Content-Type", &Mode::Batch.content_type_plus(JSON_SUBTYPE));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::HttpRequest;

    fn batch(body: &str) -> HttpRequest {
        let mut request = HttpRequest::new("POST", "/");
        request.set_header("Content-Type", "application/cloudevents-batch+json");
        request.append_body(body.as_bytes());
        request
    }

    #[test]
    fn empty_batch_is_rejected_and_nothing_written() {
        let mut out = HttpRequest::new("POST", "/");
        let err = Codec::default().encode_batch(&mut out, &[]).unwrap_err();
        assert!(matches!(err, CodecError::NoEvents));
        assert!(out.body.is_empty());
        assert!(out.header("Content-Type").is_none());
    }

    #[test]
    fn encode_writes_array() {
        let events = [Event::new("1", "s", "1.0", "t"), Event::new("2", "s", "1.0", "t")];
        let mut out = HttpRequest::new("POST", "/");
        Codec::default().encode_batch(&mut out, &events).unwrap();
        assert_eq!(out.content_type(), "application/cloudevents-batch+json");
        assert_eq!(
            String::from_utf8(out.body).unwrap(),
            r#"[{"id":"1","source":"s","specversion":"1.0","type":"t"},{"id":"2","source":"s","specversion":"1.0","type":"t"}]"#
        );
    }

    #[test]
    fn encode_failure_carries_index() {
        let events = [
            Event::new("1", "s", "1.0", "t"),
            Event::new("2", "s", "1.0", "t").with_extension("id", "dup"),
        ];
        let mut out = HttpRequest::new("POST", "/");
        let err = Codec::default().encode_batch(&mut out, &events).unwrap_err();
        match err {
            CodecError::AtIndex { index, source } => {
                assert_eq!(index, 1);
                assert!(matches!(*source, CodecError::ExtensionNameCollision { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(out.body.is_empty());
    }

    #[test]
    fn decode_failure_carries_index() {
        let err = Codec::default()
            .decode_batch(&batch(
                r#"[{"id":"1","source":"s","specversion":"1.0","type":"t"},{"id":"2","source":"s","type":"t"}]"#,
            ))
            .unwrap_err();
        assert_eq!(err.to_string(), "event 1: missing required field: specversion");
    }

    #[test]
    fn non_object_element_carries_index() {
        let err = Codec::default()
            .decode_batch(&batch(r#"[{"id":"1","source":"s","specversion":"1.0","type":"t"},5]"#))
            .unwrap_err();
        match err {
            CodecError::AtIndex { index, source } => {
                assert_eq!(index, 1);
                assert!(matches!(*source, CodecError::ProtocolViolation(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_array_body_is_a_marshal_error() {
        let err = Codec::default().decode_batch(&batch(r#"{"id":"1"}"#)).unwrap_err();
        assert!(matches!(err, CodecError::Marshal(_)));
    }

    #[test]
    fn decode_empty_array() {
        let events = Codec::default().decode_batch(&batch("[]")).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn decode_requires_batch_media_type() {
        let mut request = batch("[]");
        request.set_header("Content-Type", "application/cloudevents+json");
        let err = Codec::default().decode_batch(&request).unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedContentType { mode: Mode::Batch, .. }));
    }
}
