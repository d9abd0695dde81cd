//! Encode command implementation.

use std::io::{self, Write};

use cebind_core::Mode;
use cebind_http::{Codec, HttpRequest};
use tracing::{debug, info};

use crate::input::load_events;

pub fn run(mode: Mode, input: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let events = load_events(input.as_deref())?;
    if mode != Mode::Batch && events.len() > 1 {
        info!(dropped = events.len() - 1, %mode, "only the first event is encoded");
    }

    let codec = Codec::default();
    let mut request = HttpRequest::new("POST", "/");
    codec
        .write_events(&mut request, &events, mode)
        .map_err(|e| format!("Encoding failed: {}", e))?;
    debug!(headers = request.headers.len(), bytes = request.body.len(), "encoded request");

    let mut stdout = io::stdout().lock();
    stdout.write_all(&request.to_wire())?;
    stdout.flush()?;
    Ok(())
}
