use cebind_core::{Event, Mapping, Mode};

use crate::envelope::Envelope;
use crate::errors::CodecError;

/// Subtype used when building structured and batch content types.
pub const JSON_SUBTYPE: &str = "json";

/// Stateless codec for all three content modes.
///
/// Holds only the [`Mapping`] used to move between events and the
/// intermediate map, so one instance can serve any number of envelopes
/// concurrently.
#[derive(Debug, Clone, Default)]
pub struct Codec {
    mapping: Mapping,
}

impl Codec {
    /// Creates a codec using `mapping` for every encode and decode.
    pub fn new(mapping: Mapping) -> Self {
        Self { mapping }
    }

    /// Mapping functions in use.
    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    /// Decodes every event in `envelope`, resolving the mode from its
    /// `Content-Type`. Binary and structured messages yield one event.
    pub fn read_events(&self, envelope: &dyn Envelope) -> Result<(Vec<Event>, Mode), CodecError> {
        let mode = Mode::resolve(envelope.content_type());
        let events = match mode {
            Mode::Binary => vec![self.decode_binary(envelope)?],
            Mode::Structured => vec![self.decode_structured(envelope)?],
            Mode::Batch => self.decode_batch(envelope)?,
        };
        Ok((events, mode))
    }

    /// Encodes `events` into `envelope` using `mode`.
    ///
    /// Binary and structured modes carry a single event, so only the first
    /// one is written. An empty slice is rejected before anything is written.
    pub fn write_events(
        &self,
        envelope: &mut dyn Envelope,
        events: &[Event],
        mode: Mode,
    ) -> Result<(), CodecError> {
        let first = events.first().ok_or(CodecError::NoEvents)?;
        match mode {
            Mode::Binary => self.encode_binary(envelope, first),
            Mode::Structured => self.encode_structured(envelope, first),
            Mode::Batch => self.encode_batch(envelope, events),
        }
    }
}

/// Fails unless `Content-Type` starts with `<mode prefix>+json`.
pub(crate) fn require_content_type(envelope: &dyn Envelope, mode: Mode) -> Result<(), CodecError> {
    let content_type = envelope.content_type();
    let expected = mode.content_type_plus(JSON_SUBTYPE);
    let matches = content_type
        .trim_start()
        .get(..expected.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(&expected));
    if matches {
        Ok(())
    } else {
        Err(CodecError::UnsupportedContentType {
            content_type: content_type.to_string(),
            mode,
        })
    }
}
