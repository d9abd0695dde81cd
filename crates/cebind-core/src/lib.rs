//! Event model and pivot representation for CloudEvents HTTP bindings.
//!
//! This crate provides:
//! - The typed [`Event`] and its reserved context attribute names
//! - The intermediate [`EventMap`] shared by every wire mode
//! - Pluggable [`Mapping`] functions between the two
//! - Content-type driven [`Mode`] resolution
//! - The [`Event::validate`] heuristics (hard errors vs. warnings)
//!
//! Wire codecs live in `cebind-http`; nothing in this crate touches headers
//! or bodies.
//!
//! ## Quick Start
//!
//! ```rust
//! use cebind_core::{Event, Mapping};
//!
//! let event = Event::new("42", "urn:example", "1.0", "com.example.created")
//!     .with_data_content_type("application/json")
//!     .with_data(br#"{"a":1}"#.to_vec());
//!
//! let mapping = Mapping::default();
//! let map = mapping.to_map(&event)?;
//! assert_eq!(serde_json::to_string(&map)?, r#"{"data":{"a":1},"datacontenttype":"application/json","id":"42","source":"urn:example","specversion":"1.0","type":"com.example.created"}"#);
//!
//! let back = mapping.to_event(&map)?;
//! assert_eq!(back, event);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
#![deny(missing_docs)]

/// Error types for mapping functions.
pub mod errors;
/// Typed event model and reserved attribute names.
pub mod event;
/// Intermediate key/value representation.
pub mod map;
/// Event ⇄ map mapping functions.
pub mod mapping;
/// Content mode resolution.
pub mod mode;
/// Validation heuristics.
pub mod validation;

pub use errors::MapError;
pub use event::{is_reserved, Comparison, Event, RESERVED_ATTRIBUTES};
pub use map::{EventMap, DATA, DATA_BASE64};
pub use mapping::{
    default_to_event, default_to_map, format_time, lenient_to_event, parse_time, Mapping,
};
pub use mode::{Mode, ParseModeError, BATCH_PREFIX, STRUCTURED_PREFIX};
pub use validation::{ValidationError, ValidationWarning};
