use std::time::Duration;

use cebind_core::{MapError, Mode, ValidationError};
use thiserror::Error;

/// Failures of the transport underneath a [`Client`](crate::Client).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The round trip did not complete within the configured timeout.
    #[error("round trip exceeded timeout of {0:?}")]
    Timeout(Duration),
    /// The peer could not be reached.
    #[error("connection failed: {0}")]
    Connection(String),
    /// The peer answered with a non-success status.
    #[error("peer responded with status {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        message: String,
    },
}

/// Errors returned by the codecs and the client. The first error encountered
/// is returned and nothing after it is attempted.
#[derive(Error, Debug)]
pub enum CodecError {
    /// A required attribute is missing or empty.
    #[error("missing required field: {field}")]
    MissingRequiredField {
        /// Attribute or field name.
        field: &'static str,
    },
    /// An extension uses a reserved context attribute name.
    #[error("extension {name}: not allowed")]
    ExtensionNameCollision {
        /// Offending extension name.
        name: String,
    },
    /// The message breaks a binding rule: a forbidden header, or a batch
    /// element that is not an object.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),
    /// `Content-Type` does not carry the media type the mode requires.
    #[error("unsupported content type '{content_type}' for {mode} mode")]
    UnsupportedContentType {
        /// Content type found on the envelope.
        content_type: String,
        /// Mode that was being decoded.
        mode: Mode,
    },
    /// A mapping function rejected the event or map.
    #[error("mapping failed: {0}")]
    MapProjection(#[source] MapError),
    /// JSON serialization or parsing failed.
    #[error("JSON error: {0}")]
    Marshal(#[from] serde_json::Error),
    /// The transport failed; distinct from codec failures.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    /// Nothing to encode.
    #[error("could not put 0 events")]
    NoEvents,
    /// Wire text could not be parsed as an HTTP message.
    #[error("malformed HTTP message: {0}")]
    MalformedMessage(String),
    /// Failure of one element of a batch.
    #[error("event {index}: {source}")]
    AtIndex {
        /// Position of the failing event.
        index: usize,
        /// Underlying failure.
        source: Box<CodecError>,
    },
}

impl CodecError {
    pub(crate) fn at_index(index: usize, source: impl Into<CodecError>) -> Self {
        CodecError::AtIndex {
            index,
            source: Box::new(source.into()),
        }
    }
}

impl From<MapError> for CodecError {
    fn from(err: MapError) -> Self {
        match err {
            MapError::MissingRequiredField { attribute } => {
                CodecError::MissingRequiredField { field: attribute }
            }
            MapError::ExtensionNameCollision { name } => CodecError::ExtensionNameCollision { name },
            other => CodecError::MapProjection(other),
        }
    }
}

impl From<ValidationError> for CodecError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::MissingRequiredField { field } => {
                CodecError::MissingRequiredField { field }
            }
            ValidationError::ExtensionNameCollision { name } => {
                CodecError::ExtensionNameCollision { name }
            }
        }
    }
}
