//! Decode command implementation.

use cebind_http::{Codec, CodecError, Envelope, HttpRequest, HttpResponse};
use tracing::info;

use crate::input::read_input;
use crate::output::{format_json, format_table_row, print_table_header};

/// Parses message text as a response when it starts with a status line, and
/// as a request otherwise.
fn parse_message(bytes: &[u8]) -> Result<Box<dyn Envelope>, CodecError> {
    if bytes.starts_with(b"HTTP/") {
        Ok(Box::new(HttpResponse::parse_wire(bytes)?))
    } else {
        Ok(Box::new(HttpRequest::parse_wire(bytes)?))
    }
}

pub fn run(input: Option<String>, json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = read_input(input.as_deref())?;
    let message = parse_message(&bytes)?;

    let codec = Codec::default();
    let (events, mode) = codec
        .read_events(message.as_ref())
        .map_err(|e| format!("Decoding failed: {}", e))?;
    info!(count = events.len(), %mode, "decoded events");

    if json_output {
        println!("{}", format_json(&events));
    } else {
        print_table_header();
        for event in &events {
            println!("{}", format_table_row(event));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_line_selects_response() {
        let message = parse_message(b"HTTP/1.1 204 No Content\r\n\r\n").unwrap();
        assert!(message.body().is_empty());

        let message = parse_message(b"POST / HTTP/1.1\r\nContent-Type: text/plain\r\n\r\nx").unwrap();
        assert_eq!(message.content_type(), "text/plain");
    }
}
