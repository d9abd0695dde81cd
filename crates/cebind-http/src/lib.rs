//! CloudEvents HTTP protocol binding over a plain request/response envelope.
//!
//! This crate provides:
//! - The [`Envelope`] capability trait and plain-data [`HttpRequest`] /
//!   [`HttpResponse`] adapters
//! - Binary, structured and batch codecs behind one stateless [`Codec`]
//! - HTTP/1.1-style message text for requests and responses
//! - A [`Client`] over a pluggable [`Transport`], plus an echo handler
//!
//! The codec performs no I/O and no logging; the host owns the envelope.
//!
//! ## Quick Start
//!
//! ```rust
//! use cebind_core::{Event, Mode};
//! use cebind_http::{Codec, Envelope, HttpRequest};
//!
//! let codec = Codec::default();
//! let event = Event::new("1", "urn:example", "1.0", "com.example.created")
//!     .with_data_content_type("text/plain")
//!     .with_data(b"hello".to_vec());
//!
//! let mut request = HttpRequest::new("POST", "/events");
//! codec.write_events(&mut request, &[event.clone()], Mode::Binary)?;
//! assert_eq!(request.header("ce-id"), Some("1"));
//! assert_eq!(request.body, b"hello");
//!
//! let (events, mode) = codec.read_events(&request)?;
//! assert_eq!(mode, Mode::Binary);
//! assert_eq!(events, vec![event]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
#![deny(missing_docs)]

/// Binary content mode.
pub mod binary;
/// Batch content mode.
pub mod batch;
/// Client round trip and transports.
pub mod client;
/// Mode dispatch.
pub mod codec;
/// Envelope trait and plain-data adapters.
pub mod envelope;
/// Error types for codecs and transports.
pub mod errors;
/// Server-side handlers.
pub mod server;
/// Structured content mode.
pub mod structured;
/// Message text rendering and parsing.
pub mod wire;

pub use client::{Client, ClientConfig, LoopbackTransport, Transport, DEFAULT_TIMEOUT};
pub use codec::{Codec, JSON_SUBTYPE};
pub use envelope::{Envelope, Headers, HttpRequest, HttpResponse};
pub use errors::{CodecError, TransportError};
pub use server::{echo_handler, respond_with};
