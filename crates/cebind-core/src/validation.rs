use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset};
use regex::Regex;
use serde_json::Value;
use thiserror::Error;
use url::{ParseError, Url};

use crate::event::{is_reserved, Event};

/// Unix seconds of `0001-01-01T00:00:00Z`, the zero timestamp.
const ZERO_TIME_UNIX_SECONDS: i64 = -62_135_596_800;

/// Hard validation failures. The first one found is returned and no warnings
/// are computed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required attribute is empty.
    #[error("Required field {field} is empty")]
    MissingRequiredField {
        /// Field name (`Id`, `Source`, `SpecVersion` or `Type`).
        field: &'static str,
    },
    /// An extension uses a reserved context attribute name.
    #[error("Extension {name}: not allowed")]
    ExtensionNameCollision {
        /// Offending extension name.
        name: String,
    },
}

/// Non-fatal findings. Newlines matter because binary mode turns attribute
/// values into header values; JSON modes carry them safely.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    /// `source` does not parse as a URI-reference.
    #[error("Source is not a URI: {0}")]
    SourceNotUri(String),
    /// `time` is absent or the zero timestamp.
    #[error("Time is zero")]
    TimeIsZero,
    /// A string attribute contains `\n`.
    #[error("{0} contains newline character")]
    NewlineInField(&'static str),
    /// An extension name contains `\n`.
    #[error("Extension {0}: name contains newline character")]
    NewlineInExtensionName(String),
    /// An extension value contains `\n` in any of its strings.
    #[error("Extension {0}: value contains newline character")]
    NewlineInExtensionValue(String),
}

impl Event {
    /// Checks the event against the CloudEvents attribute rules.
    ///
    /// Returns the accumulated warnings, or the first hard error. Whether
    /// `data` matches `datacontenttype` is not checked.
    pub fn validate(&self) -> Result<Vec<ValidationWarning>, ValidationError> {
        let required = [
            ("Id", &self.id),
            ("Source", &self.source),
            ("SpecVersion", &self.spec_version),
            ("Type", &self.event_type),
        ];
        for (field, value) in required {
            if value.is_empty() {
                return Err(ValidationError::MissingRequiredField { field });
            }
        }

        let mut warnings = Vec::new();
        for (name, value) in &self.extensions {
            if is_reserved(name) {
                return Err(ValidationError::ExtensionNameCollision { name: name.clone() });
            }
            if name.contains('\n') {
                warnings.push(ValidationWarning::NewlineInExtensionName(name.clone()));
            }
            if value_contains_newline(value) {
                warnings.push(ValidationWarning::NewlineInExtensionValue(name.clone()));
            }
        }

        if let Err(reason) = check_uri_reference(&self.source) {
            warnings.push(ValidationWarning::SourceNotUri(reason));
        }
        if self.time.as_ref().map_or(true, is_zero_time) {
            warnings.push(ValidationWarning::TimeIsZero);
        }

        let optional = [
            ("Id", Some(self.id.as_str())),
            ("SpecVersion", Some(self.spec_version.as_str())),
            ("Type", Some(self.event_type.as_str())),
            ("DataContentType", self.data_content_type.as_deref()),
            ("DataSchema", self.data_schema.as_deref()),
            ("Subject", self.subject.as_deref()),
        ];
        for (field, value) in optional {
            if value.is_some_and(|value| value.contains('\n')) {
                warnings.push(ValidationWarning::NewlineInField(field));
            }
        }

        Ok(warnings)
    }
}

fn is_zero_time(time: &DateTime<FixedOffset>) -> bool {
    time.timestamp() == ZERO_TIME_UNIX_SECONDS && time.timestamp_subsec_nanos() == 0
}

fn value_contains_newline(value: &Value) -> bool {
    match value {
        Value::String(text) => text.contains('\n'),
        Value::Array(items) => items.iter().any(value_contains_newline),
        Value::Object(map) => map
            .iter()
            .any(|(key, value)| key.contains('\n') || value_contains_newline(value)),
        Value::Null | Value::Bool(_) | Value::Number(_) => false,
    }
}

fn escape_regex() -> &'static Regex {
    static ESCAPE: OnceLock<Regex> = OnceLock::new();
    ESCAPE.get_or_init(|| Regex::new(r"%(?:[0-9A-Fa-f]{2})?").expect("invalid regex"))
}

fn base_url() -> &'static Url {
    static BASE: OnceLock<Url> = OnceLock::new();
    BASE.get_or_init(|| Url::parse("http://localhost/").expect("invalid base URL"))
}

/// Syntactic URI-reference check. Absolute references go through
/// `Url::parse`; relative ones are resolved against a fixed base so their
/// authority and path are still checked. WHATWG parsing tolerates control
/// characters, broken percent escapes and a colon in the first segment of a
/// relative reference, so those are rejected first. The empty string is
/// accepted.
fn check_uri_reference(s: &str) -> Result<(), String> {
    if s.is_empty() {
        return Ok(());
    }
    if s.chars().any(|c| c.is_ascii_control()) {
        return Err("invalid control character in URL".to_string());
    }
    if let Some(broken) = escape_regex().find_iter(s).find(|m| m.len() == 1) {
        let escape: String = s[broken.start()..].chars().take(3).collect();
        return Err(format!("invalid URL escape {escape:?}"));
    }

    match Url::parse(s) {
        Ok(_) => Ok(()),
        Err(ParseError::RelativeUrlWithoutBase) => {
            if s.starts_with(':') {
                return Err("missing protocol scheme".to_string());
            }
            let first_segment = s.split(['/', '?', '#']).next().unwrap_or_default();
            if first_segment.contains(':') {
                return Err("first path segment in URL cannot contain colon".to_string());
            }
            Url::options()
                .base_url(Some(base_url()))
                .parse(s)
                .map(drop)
                .map_err(|e| e.to_string())
        }
        Err(e) => Err(e.to_string()),
    }
}
