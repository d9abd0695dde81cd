//! Output formatting utilities.

use cebind_core::{format_time, Event};

/// Formats events as a pretty JSON array.
pub fn format_json(events: &[Event]) -> String {
    serde_json::to_string_pretty(events).unwrap_or_else(|_| "[]".to_string())
}

/// Formats an event as a simple table row.
pub fn format_table_row(event: &Event) -> String {
    let time = event
        .time
        .as_ref()
        .map(format_time)
        .unwrap_or_else(|| "-".to_string());
    let size = event.data.as_ref().map_or(0, Vec::len);

    format!(
        "{:<24} {:<28} {:<32} {:<30} {}",
        truncate(&event.id, 24),
        truncate(&event.event_type, 28),
        truncate(&event.source, 32),
        truncate(&time, 30),
        size
    )
}

/// Prints table header.
#[allow(clippy::print_literal)]
pub fn print_table_header() {
    println!(
        "{:<24} {:<28} {:<32} {:<30} {}",
        "ID", "TYPE", "SOURCE", "TIME", "BYTES"
    );
    println!("{}", "-".repeat(120));
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
