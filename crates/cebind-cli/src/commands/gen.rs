//! Generate command implementation.

use std::path::Path;

use cebind_core::Event;
use chrono::{Duration, Utc};
use tracing::info;

use crate::output::format_json;

/// Build one valid sample event.
fn build_sample(index: u32, base: chrono::DateTime<Utc>) -> Event {
    Event::new(
        format!("sample-{}", index),
        "urn:cebind:sample",
        "1.0",
        "dev.cebind.sample",
    )
    .with_data_content_type("text/plain")
    .with_subject(format!("item/{}", index))
    .with_time((base + Duration::milliseconds(i64::from(index))).fixed_offset())
    .with_extension("sequence", index)
    .with_data(format!("sample payload {}", index).into_bytes())
}

pub fn run(count: u32, output: Option<String>, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    if count == 0 {
        return Err("--count must be at least 1".into());
    }

    let base = Utc::now();
    let events: Vec<Event> = (0..count).map(|i| build_sample(i, base)).collect();
    let json = format_json(&events);

    match output {
        Some(path) => {
            if Path::new(&path).exists() && !force {
                return Err(format!("File {} already exists. Use --force to overwrite", path).into());
            }
            std::fs::write(&path, json + "\n")
                .map_err(|e| format!("Failed to write file {}: {}", path, e))?;
            info!(count, path = %path, "generated sample events");
        }
        None => println!("{}", json),
    }
    Ok(())
}
