//! Structured content mode: one event as a JSON document.

use cebind_core::{Event, EventMap, Mode};

use crate::codec::{require_content_type, Codec, JSON_SUBTYPE};
use crate::envelope::Envelope;
use crate::errors::CodecError;

impl Codec {
    /// Decodes one structured-mode event. The content type must start with
    /// `application/cloudevents+json`.
    pub fn decode_structured(&self, envelope: &dyn Envelope) -> Result<Event, CodecError> {
        require_content_type(envelope, Mode::Structured)?;
        let map: EventMap = serde_json::from_slice(envelope.body())?;
        Ok(self.mapping().to_event(&map)?)
    }

    /// Encodes one event as a structured-mode JSON body.
    pub fn encode_structured(
        &self,
        envelope: &mut dyn Envelope,
        event: &Event,
    ) -> Result<(), CodecError> {
        let map = self.mapping().to_map(event)?;
        let body = serde_json::to_vec(&map)?;
        envelope.append_body(&body);
        envelope.set_header("Content-Type", &Mode::Structured.content_type_plus(JSON_SUBTYPE));
        Ok(())
    }
}
