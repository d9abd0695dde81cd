//! Echo command implementation.

use cebind_core::Mode;
use cebind_http::{echo_handler, Client, ClientConfig, Codec, LoopbackTransport};
use tracing::{debug, info};

use crate::input::load_events;
use crate::output::format_json;

pub fn run(mode: Mode, input: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let events = load_events(input.as_deref())?;

    let codec = Codec::default();
    let transport = LoopbackTransport::new(echo_handler(&codec));
    let config = ClientConfig {
        uri: "/echo".to_string(),
        ..ClientConfig::default()
    };
    debug!(?config, "sending through loopback");
    let client = Client::new(transport, config).with_codec(codec);

    let (echoed, reply_mode) = client
        .send(&events, mode)
        .map_err(|e| format!("Round trip failed: {}", e))?;
    info!(sent = events.len(), received = echoed.len(), mode = %reply_mode, "round trip complete");

    println!("{}", format_json(&echoed));
    Ok(())
}
