use std::time::{Duration, Instant};

use cebind_core::{Event, Mode};

use crate::codec::Codec;
use crate::envelope::{Envelope, HttpRequest, HttpResponse};
use crate::errors::{CodecError, TransportError};

/// Overall round-trip bound used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Performs one request/response exchange.
pub trait Transport {
    /// Sends `request` and waits for the response, for at most `timeout`.
    fn round_trip(&self, request: &HttpRequest, timeout: Duration) -> Result<HttpResponse, TransportError>;
}

/// Where and how a [`Client`] sends events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Request method.
    pub method: String,
    /// Request target.
    pub uri: String,
    /// Overall round-trip timeout.
    pub timeout: Duration,
    /// Subtype advertised in `Accept` for structured and batch requests.
    pub subtype: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            method: "POST".to_string(),
            uri: "/".to_string(),
            timeout: DEFAULT_TIMEOUT,
            subtype: crate::codec::JSON_SUBTYPE.to_string(),
        }
    }
}

/// Sends events and decodes the events returned in the response.
///
/// No retries are attempted. Request and response are owned by `send` and
/// dropped on every exit path.
#[derive(Debug, Clone)]
pub struct Client<T> {
    transport: T,
    codec: Codec,
    config: ClientConfig,
}

impl<T: Transport> Client<T> {
    /// Creates a client using the default [`Codec`].
    pub fn new(transport: T, config: ClientConfig) -> Self {
        Self {
            transport,
            codec: Codec::default(),
            config,
        }
    }

    /// Replaces the codec.
    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Encodes `events` in `mode`, performs the round trip and decodes the
    /// response. A `204 No Content` response yields no events; any other
    /// non-2xx status is a [`TransportError::Status`].
    pub fn send(&self, events: &[Event], mode: Mode) -> Result<(Vec<Event>, Mode), CodecError> {
        let mut request = HttpRequest::new(&self.config.method, &self.config.uri);
        if mode != Mode::Binary {
            request.set_header("Accept", &mode.content_type_plus(&self.config.subtype));
        }
        self.codec.write_events(&mut request, events, mode)?;

        let response = self.transport.round_trip(&request, self.config.timeout)?;
        if !response.is_success() {
            return Err(TransportError::Status {
                status: response.status,
                message: String::from_utf8_lossy(&response.body).trim().to_string(),
            }
            .into());
        }
        if response.status == 204 {
            return Ok((Vec::new(), Mode::resolve(response.content_type())));
        }
        self.codec.read_events(&response)
    }
}

/// In-process transport that hands each request to a handler.
///
/// The timeout is enforced after the fact: a handler that takes longer than
/// the bound produces [`TransportError::Timeout`] and its response is dropped.
pub struct LoopbackTransport<F> {
    handler: F,
}

impl<F> LoopbackTransport<F>
where
    F: Fn(&HttpRequest) -> HttpResponse,
{
    /// Wraps `handler`.
    pub fn new(handler: F) -> Self {
        Self { handler }
    }
}

impl<F> Transport for LoopbackTransport<F>
where
    F: Fn(&HttpRequest) -> HttpResponse,
{
    fn round_trip(&self, request: &HttpRequest, timeout: Duration) -> Result<HttpResponse, TransportError> {
        let started = Instant::now();
        let response = (self.handler)(request);
        if started.elapsed() > timeout {
            return Err(TransportError::Timeout(timeout));
        }
        Ok(response)
    }
}

impl<F> std::fmt::Debug for LoopbackTransport<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoopbackTransport").finish_non_exhaustive()
    }
}
