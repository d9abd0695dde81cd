use thiserror::Error;

/// Errors produced while projecting between an [`Event`](crate::Event) and an
/// [`EventMap`](crate::EventMap).
#[derive(Error, Debug)]
pub enum MapError {
    /// A required context attribute is absent, not a string, or empty.
    #[error("could not read {attribute} as nonempty string")]
    MissingRequiredField {
        /// Attribute name as it appears on the wire.
        attribute: &'static str,
    },
    /// An extension uses a reserved context attribute name.
    #[error("extension {name}: not allowed")]
    ExtensionNameCollision {
        /// Offending extension name.
        name: String,
    },
    /// An attribute is present with an unexpected JSON type.
    #[error("could not read {attribute} as {expected}")]
    InvalidAttribute {
        /// Attribute name as it appears on the wire.
        attribute: &'static str,
        /// Human readable description of the expected type.
        expected: &'static str,
    },
    /// `time` is not an RFC3339 timestamp.
    #[error("could not read time as RFC3339: {0}")]
    Timestamp(#[from] chrono::ParseError),
    /// `data_base64` is not valid standard base64.
    #[error("could not decode data_base64: {0}")]
    Base64(#[from] base64::DecodeError),
    /// `data` could not be rendered as JSON bytes.
    #[error("could not render data as JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Rejection raised by a caller-supplied mapping function.
    #[error("{0}")]
    Custom(String),
}
