use std::time::Duration;

use cebind_core::{parse_time, Event, Mapping, MapError, Mode};
use cebind_http::{
    echo_handler, Client, ClientConfig, Codec, CodecError, Envelope, HttpRequest, HttpResponse,
    LoopbackTransport, Transport, TransportError,
};
use serde_json::json;

fn full_event(id: &str) -> Event {
    Event::new(id, "urn:test:source", "1.0", "dev.test.created")
        .with_data_content_type("application/json")
        .with_data_schema("http://localhost/schema")
        .with_subject("subject")
        .with_time(parse_time("2020-02-02T06:06:06.366090001+10:00").unwrap())
        .with_extension("traceparent", "00-abc-def-01")
        .with_extension("priority", 7)
        .with_data(br#"{"order":[1,2,3]}"#.to_vec())
}

#[test]
fn test_round_trip_every_mode() {
    let codec = Codec::default();
    let events = vec![full_event("1"), full_event("2")];

    for mode in [Mode::Binary, Mode::Structured, Mode::Batch] {
        let mut request = HttpRequest::new("POST", "/");
        codec.write_events(&mut request, &events, mode).unwrap();

        let (decoded, resolved) = codec.read_events(&request).unwrap();
        assert_eq!(resolved, mode);
        let expected = if mode == Mode::Batch { &events[..] } else { &events[..1] };
        assert_eq!(decoded, expected, "{mode}");
        assert_eq!(
            decoded[0].time.unwrap().timestamp_subsec_nanos(),
            366_090_001,
            "{mode}"
        );
    }
}

#[test]
fn test_opaque_payload_survives_every_mode() {
    let codec = Codec::default();
    let event = Event::new("1", "s", "1.0", "t")
        .with_data_content_type("application/octet-stream")
        .with_data(vec![0u8, 255, 10, 13, 34]);

    for mode in [Mode::Binary, Mode::Structured, Mode::Batch] {
        let mut response = HttpResponse::new(200);
        codec.write_events(&mut response, &[event.clone()], mode).unwrap();
        let (decoded, _) = codec.read_events(&response).unwrap();
        assert_eq!(decoded, vec![event.clone()], "{mode}");
    }
}

#[test]
fn test_binary_decode_rejects_ce_datacontenttype() {
    let codec = Codec::default();
    let mut request = HttpRequest::new("POST", "/");
    codec
        .write_events(&mut request, &[full_event("1")], Mode::Binary)
        .unwrap();
    request.set_header("ce-datacontenttype", "application/json");

    let err = codec.read_events(&request).unwrap_err();
    assert!(matches!(err, CodecError::ProtocolViolation(_)));
}

#[test]
fn test_empty_batch_writes_nothing() {
    let codec = Codec::default();
    let mut request = HttpRequest::new("POST", "/");
    let err = codec.write_events(&mut request, &[], Mode::Batch).unwrap_err();
    assert!(matches!(err, CodecError::NoEvents));
    assert_eq!(request, HttpRequest::new("POST", "/"));
}

#[test]
fn test_unknown_content_type_is_binary() {
    let codec = Codec::default();
    let mut request = HttpRequest::new("POST", "/");
    request.set_header("ce-id", "1");
    request.set_header("ce-source", "s");
    request.set_header("ce-specversion", "1.0");
    request.set_header("ce-type", "t");
    request.set_header("Content-Type", "text/plain");
    request.append_body(b"plain body");

    let (events, mode) = codec.read_events(&request).unwrap();
    assert_eq!(mode, Mode::Binary);
    assert_eq!(events[0].data.as_deref(), Some(&b"plain body"[..]));
}

#[test]
fn test_wire_text_round_trip() {
    let codec = Codec::default();
    let mut request = HttpRequest::new("POST", "/events");
    codec
        .write_events(&mut request, &[full_event("1")], Mode::Structured)
        .unwrap();

    let parsed = HttpRequest::parse_wire(&request.to_wire()).unwrap();
    let (events, mode) = codec.read_events(&parsed).unwrap();
    assert_eq!(mode, Mode::Structured);
    assert_eq!(events, vec![full_event("1")]);
}

#[test]
fn test_custom_mapping_is_used_by_codecs() {
    let mapping = Mapping::default().with_to_event(|map| {
        let event = cebind_core::default_to_event(map)?;
        if event.event_type.starts_with("dev.test.") {
            Ok(event)
        } else {
            Err(MapError::Custom(format!("type {} not accepted", event.event_type)))
        }
    });
    let codec = Codec::new(mapping);

    let mut request = HttpRequest::new("POST", "/");
    codec
        .write_events(&mut request, &[Event::new("1", "s", "1.0", "other")], Mode::Structured)
        .unwrap();
    let err = codec.read_events(&request).unwrap_err();
    assert_eq!(err.to_string(), "mapping failed: type other not accepted");
}

#[test]
fn test_client_echo_every_mode() {
    let codec = Codec::default();
    let client = Client::new(LoopbackTransport::new(echo_handler(&codec)), ClientConfig::default());
    let events = vec![full_event("1"), full_event("2"), full_event("3")];

    let (echoed, mode) = client.send(&events, Mode::Batch).unwrap();
    assert_eq!(mode, Mode::Batch);
    assert_eq!(echoed, events);

    let (echoed, mode) = client.send(&events, Mode::Binary).unwrap();
    assert_eq!(mode, Mode::Binary);
    assert_eq!(echoed, events[..1]);

    let (echoed, _) = client.send(&events[1..], Mode::Structured).unwrap();
    assert_eq!(echoed, events[1..2]);
}

#[test]
fn test_client_surfaces_server_decode_errors_as_status() {
    let codec = Codec::default();
    let transport = LoopbackTransport::new(|request: &HttpRequest| {
        // strip the required id before echoing
        let mut broken = request.clone();
        broken.headers.remove("ce-id");
        echo_handler(&Codec::default())(&broken)
    });
    let client = Client::new(transport, ClientConfig::default()).with_codec(codec);

    let err = client.send(&[full_event("1")], Mode::Binary).unwrap_err();
    match err {
        CodecError::Transport(TransportError::Status { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "missing required field: id");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

struct Unreachable;

impl Transport for Unreachable {
    fn round_trip(&self, _: &HttpRequest, _: Duration) -> Result<HttpResponse, TransportError> {
        Err(TransportError::Connection("connection refused".into()))
    }
}

#[test]
fn test_transport_failure_is_distinct_from_codec_errors() {
    let client = Client::new(Unreachable, ClientConfig::default());
    let err = client.send(&[full_event("1")], Mode::Structured).unwrap_err();
    assert!(matches!(err, CodecError::Transport(TransportError::Connection(_))));

    // encoding errors are raised before the transport is touched
    let bad = Event::new("1", "s", "1.0", "t").with_extension("data", json!(1));
    let err = client.send(&[bad], Mode::Structured).unwrap_err();
    assert!(matches!(err, CodecError::ExtensionNameCollision { .. }));
}

#[test]
fn test_timeout_is_reported() {
    let transport = LoopbackTransport::new(|_: &HttpRequest| {
        std::thread::sleep(Duration::from_millis(25));
        HttpResponse::new(204)
    });
    let config = ClientConfig {
        timeout: Duration::from_millis(5),
        ..ClientConfig::default()
    };
    let client = Client::new(transport, config);

    let err = client.send(&[full_event("1")], Mode::Batch).unwrap_err();
    assert!(matches!(err, CodecError::Transport(TransportError::Timeout(_))));
}

#[test]
fn test_codec_is_shareable_across_threads() {
    let codec = Codec::default();
    std::thread::scope(|scope| {
        for i in 0..4 {
            let codec = &codec;
            scope.spawn(move || {
                let event = full_event(&i.to_string());
                let mut request = HttpRequest::new("POST", "/");
                codec.write_events(&mut request, &[event.clone()], Mode::Binary).unwrap();
                let (events, _) = codec.read_events(&request).unwrap();
                assert_eq!(events, vec![event]);
            });
        }
    });
}
