//! Validate command implementation.

use cebind_core::{lenient_to_event, EventMap};
use tracing::{error, warn};

use crate::input::load_maps;

fn display_id(map: &EventMap) -> &str {
    map.get("id").and_then(|id| id.as_str()).unwrap_or("")
}

pub fn run(input: Option<String>, strict: bool) -> Result<(), Box<dyn std::error::Error>> {
    let maps = load_maps(input.as_deref())?;

    let mut warnings = 0;
    let mut errors = 0;
    for (index, map) in maps.iter().enumerate() {
        let id = display_id(map);
        let checked = lenient_to_event(map)
            .map_err(|e| e.to_string())
            .and_then(|event| event.validate().map_err(|e| e.to_string()));
        match checked {
            Ok(found) => {
                for warning in &found {
                    warn!(index, id, "{}", warning);
                }
                let status = if found.is_empty() { "OK" } else { "WARN" };
                println!("{:<6} {:<5} {}", index, status, id);
                warnings += found.len();
            }
            Err(e) => {
                error!(index, id, "{}", e);
                println!("{:<6} {:<5} {}", index, "ERROR", id);
                errors += 1;
            }
        }
    }

    println!(
        "{} events, {} warnings, {} errors",
        maps.len(),
        warnings,
        errors
    );

    if errors > 0 {
        return Err(format!("{} events failed validation", errors).into());
    }
    if strict && warnings > 0 {
        return Err(format!("{} warnings (strict mode)", warnings).into());
    }
    Ok(())
}
