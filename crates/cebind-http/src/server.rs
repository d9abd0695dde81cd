use cebind_core::Event;

use crate::codec::Codec;
use crate::envelope::{Envelope, HttpRequest, HttpResponse};
use crate::errors::CodecError;

/// Builds a request handler that answers with whatever events it received.
///
/// The reply uses the request's mode. An empty batch gets `204 No Content`;
/// a request that fails to decode gets `400` with the error text as body.
pub fn echo_handler(codec: &Codec) -> impl Fn(&HttpRequest) -> HttpResponse + Clone {
    respond_with(codec, Ok)
}

/// Builds a handler that decodes the request, passes the events to `handle`
/// and encodes what it returns in the request's mode.
///
/// Handler failures become `500` responses.
pub fn respond_with<H>(codec: &Codec, handle: H) -> impl Fn(&HttpRequest) -> HttpResponse + Clone
where
    H: Fn(Vec<Event>) -> Result<Vec<Event>, CodecError> + Clone,
{
    let codec = codec.clone();
    move |request: &HttpRequest| {
        let (events, mode) = match codec.read_events(request) {
            Ok(decoded) => decoded,
            Err(err) => return error_response(400, &err),
        };
        let events = match handle(events) {
            Ok(events) => events,
            Err(err) => return error_response(500, &err),
        };
        if events.is_empty() {
            return HttpResponse::new(204);
        }
        let mut response = HttpResponse::new(200);
        match codec.write_events(&mut response, &events, mode) {
            Ok(()) => response,
            Err(err) => error_response(500, &err),
        }
    }
}

fn error_response(status: u16, err: &CodecError) -> HttpResponse {
    let mut response = HttpResponse::new(status);
    response.set_header("Content-Type", "text/plain; charset=utf-8");
    response.append_body(err.to_string().as_bytes());
    response
}
