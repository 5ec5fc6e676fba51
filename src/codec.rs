//! Composite key codec.
//!
//! A backend key is the location segments, the key name, and (when present)
//! the dynamic component joined with `|`:
//!
//! ```text
//! cos|47e456be-b00a-465e-a1db-4b53e64fa|somekey
//! domain|47e456be-b00a-465e-a1db-4b53e64fa|testK|testD
//! ```
//!
//! The format is fixed for interoperability with existing stored data, so
//! there is no escaping scheme: a segment, name, or component containing
//! the delimiter would produce an ambiguous key and is rejected instead.
//! Encoding is pure and deterministic; no I/O happens here.

use crate::error::EphemeralError;
use crate::models::{EphemeralKey, EphemeralLocation};

pub const DELIMITER: &str = "|";

/// Encodes `(key, location)` into the backend key string.
///
/// A key without a dynamic component encodes to `len(location) + 1` parts;
/// with one, `len(location) + 2`.
pub fn encode(key: &EphemeralKey, location: &EphemeralLocation) -> Result<String, EphemeralError> {
    let segments = location.segments();
    if segments.is_empty() {
        return Err(EphemeralError::InvalidLocation(
            "location has no segments".into(),
        ));
    }
    for segment in segments {
        if segment.is_empty() {
            return Err(EphemeralError::InvalidLocation(
                "location segment is empty".into(),
            ));
        }
        if segment.contains(DELIMITER) {
            return Err(EphemeralError::InvalidKey(format!(
                "location segment `{segment}` contains reserved delimiter `{DELIMITER}`"
            )));
        }
    }
    if key.name().is_empty() {
        return Err(EphemeralError::InvalidKey("key name is empty".into()));
    }
    if key.name().contains(DELIMITER) {
        return Err(EphemeralError::InvalidKey(format!(
            "key name `{}` contains reserved delimiter `{DELIMITER}`",
            key.name()
        )));
    }
    if let Some(component) = key.dynamic_component() {
        if component.contains(DELIMITER) {
            return Err(EphemeralError::InvalidKey(format!(
                "dynamic component `{component}` contains reserved delimiter `{DELIMITER}`"
            )));
        }
    }

    let mut parts: Vec<&str> = segments.iter().map(String::as_str).collect();
    parts.push(key.name());
    if let Some(component) = key.dynamic_component() {
        parts.push(component);
    }
    Ok(parts.join(DELIMITER))
}

/// Splits an encoded key back into its delimited parts.
pub fn parts(encoded: &str) -> Vec<&str> {
    encoded.split(DELIMITER).collect()
}
