//! Reading command input from a file or stdin.

use std::io::{self, Read};

use cebind_core::{Event, EventMap};
use serde_json::Value;
use thiserror::Error;

/// Errors raised while loading command input.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Failed to read file {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("Failed to read stdin: {0}")]
    Stdin(#[from] io::Error),
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid event at index {index}: {source}")]
    Event {
        index: usize,
        source: serde_json::Error,
    },
    #[error("Expected a JSON object or array of objects")]
    NotEvents,
    #[error("Element at index {index} is not a JSON object")]
    NotObject { index: usize },
    #[error("No events in input")]
    Empty,
}

/// Reads the whole input, from `path` or stdin.
pub fn read_input(path: Option<&str>) -> Result<Vec<u8>, InputError> {
    match path {
        Some(path) => std::fs::read(path).map_err(|source| InputError::Read {
            path: path.to_string(),
            source,
        }),
        None => {
            let mut buffer = Vec::new();
            io::stdin().read_to_end(&mut buffer)?;
            Ok(buffer)
        }
    }
}

fn parse_values(bytes: &[u8]) -> Result<Vec<Value>, InputError> {
    let values = match serde_json::from_slice::<Value>(bytes)? {
        Value::Array(values) => values,
        value @ Value::Object(_) => vec![value],
        _ => return Err(InputError::NotEvents),
    };
    if values.is_empty() {
        return Err(InputError::Empty);
    }
    Ok(values)
}

/// Parses one event object or an array of them.
pub fn parse_events(bytes: &[u8]) -> Result<Vec<Event>, InputError> {
    parse_values(bytes)?
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            serde_json::from_value(value).map_err(|source| InputError::Event { index, source })
        })
        .collect()
}

/// Parses the same shapes as [`parse_events`] but stops at the attribute map,
/// leaving each element to be projected on its own.
pub fn parse_maps(bytes: &[u8]) -> Result<Vec<EventMap>, InputError> {
    parse_values(bytes)?
        .into_iter()
        .enumerate()
        .map(|(index, value)| EventMap::from_value(value).ok_or(InputError::NotObject { index }))
        .collect()
}

/// Loads events from `path` or stdin.
pub fn load_events(path: Option<&str>) -> Result<Vec<Event>, InputError> {
    parse_events(&read_input(path)?)
}

/// Loads attribute maps from `path` or stdin.
pub fn load_maps(path: Option<&str>) -> Result<Vec<EventMap>, InputError> {
    parse_maps(&read_input(path)?)
}
