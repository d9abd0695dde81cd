use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Media type prefix of structured-mode messages.
pub const STRUCTURED_PREFIX: &str = "application/cloudevents";

/// Media type prefix of batch-mode messages. It textually extends
/// [`STRUCTURED_PREFIX`], so it must be checked first.
pub const BATCH_PREFIX: &str = "application/cloudevents-batch";

/// Content mode of an HTTP message carrying events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Attributes in `ce-` headers, payload as the raw body.
    #[default]
    Binary,
    /// One event as a JSON document in the body.
    Structured,
    /// An array of events as a JSON document in the body.
    Batch,
}

impl Mode {
    /// Classifies a `Content-Type` value. Never fails: anything that is not a
    /// CloudEvents media type, including the empty string, is binary.
    pub fn resolve(content_type: &str) -> Self {
        let content_type = content_type.trim_start().to_ascii_lowercase();
        if content_type.starts_with(BATCH_PREFIX) {
            Mode::Batch
        } else if content_type.starts_with(STRUCTURED_PREFIX) {
            Mode::Structured
        } else {
            Mode::Binary
        }
    }

    /// Like [`Mode::resolve`], also returning the subtype after the first `+`
    /// (for example `json` in `application/cloudevents+json; charset=utf-8`).
    pub fn determine(content_type: &str) -> (Self, Option<&str>) {
        let subtype = content_type
            .split_once('+')
            .map(|(_, rest)| rest.split(';').next().unwrap_or_default().trim())
            .filter(|subtype| !subtype.is_empty());
        (Self::resolve(content_type), subtype)
    }

    /// Fixed media type prefix for the mode (empty for binary).
    pub fn content_type(self) -> &'static str {
        match self {
            Mode::Binary => "",
            Mode::Structured => STRUCTURED_PREFIX,
            Mode::Batch => BATCH_PREFIX,
        }
    }

    /// Full media type `<prefix>+<subtype>`; binary returns only `subtype`.
    pub fn content_type_plus(self, subtype: &str) -> String {
        match self.content_type() {
            "" => subtype.to_string(),
            prefix => format!("{prefix}+{subtype}"),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Binary => "binary",
            Mode::Structured => "structured",
            Mode::Batch => "batch",
        };
        f.write_str(name)
    }
}

/// Returned when a mode name is not recognised.
#[derive(Debug, Error)]
#[error("unknown mode '{0}' (expected binary, structured or batch)")]
pub struct ParseModeError(String);

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "binary" => Ok(Mode::Binary),
            "structured" | "structure" => Ok(Mode::Structured),
            "batch" => Ok(Mode::Batch),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}
