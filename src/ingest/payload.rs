/// Sensor payload parsing.
///
/// Wire format published by the river sensor:
///
/// ```text
/// Nivel: 23.45 cm | T: 28.5 | U: 40.2
/// ```
///
/// Fields are identified by position only. The label before each `:` is
/// never checked, so a payload with swapped labels but the right numeric
/// order still parses. Unit suffixes are optional.

use crate::model::{PayloadError, Reading};

/// Number of `|`-separated segments in a well-formed payload.
pub const SEGMENT_COUNT: usize = 3;

/// Unit suffixes stripped from the end of a value. `°C` must come before
/// `C` so the degree sign is not left behind.
const UNIT_SUFFIXES: &[&str] = &["cm", "°C", "C", "%"];

/// Parses raw payload bytes, rejecting anything that is not UTF-8.
pub fn parse_payload_bytes(bytes: &[u8]) -> Result<Reading, PayloadError> {
    let text = std::str::from_utf8(bytes).map_err(|_| PayloadError::InvalidUtf8)?;
    parse_payload(text)
}

/// Parses a text payload into a `Reading`.
///
/// All-or-nothing: if any segment fails, no reading is produced. A negative
/// water level is clamped to zero; temperature and humidity are accepted
/// as-is.
pub fn parse_payload(payload: &str) -> Result<Reading, PayloadError> {
    let segments: Vec<&str> = payload.split('|').collect();
    if segments.len() != SEGMENT_COUNT {
        return Err(PayloadError::SegmentCount {
            found: segments.len(),
        });
    }

    let water_level_cm = parse_segment(segments[0], 1)?;
    let temperature_c = parse_segment(segments[1], 2)?;
    let humidity_pct = parse_segment(segments[2], 3)?;

    Ok(Reading::new(water_level_cm, temperature_c, humidity_pct))
}

/// Extracts the number from one `<label>: <number><unit>` segment.
fn parse_segment(segment: &str, position: usize) -> Result<f64, PayloadError> {
    let (_label, raw) = segment
        .split_once(':')
        .ok_or(PayloadError::MissingSeparator { segment: position })?;

    let value = strip_unit(raw.trim());

    let number: f64 = value.parse().map_err(|_| PayloadError::InvalidNumber {
        segment: position,
        value: value.to_string(),
    })?;

    if !number.is_finite() {
        return Err(PayloadError::NonFiniteValue { segment: position });
    }

    Ok(number)
}

fn strip_unit(value: &str) -> &str {
    UNIT_SUFFIXES
        .iter()
        .find_map(|unit| value.strip_suffix(unit))
        .map(str::trim_end)
        .unwrap_or(value)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
