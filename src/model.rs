/// Core data types for the flood monitoring dashboard.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no logic beyond formatting, no I/O, and no transport types.

use chrono::{DateTime, Utc};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Reading types
// ---------------------------------------------------------------------------

/// One ingested observation from the river sensor.
///
/// Built only when all three fields of a single payload parsed; a partial
/// parse never produces a `Reading`. The default value (all zeros) is what
/// the dashboard shows before the first message arrives.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Reading {
    /// Water level in centimetres, never negative.
    pub water_level_cm: f64,
    pub temperature_c: f64,
    pub humidity_pct: f64,
}

impl Reading {
    /// Builds a reading, clamping a negative water level (including `-0.0`) to `+0.0`.
    pub fn new(water_level_cm: f64, temperature_c: f64, humidity_pct: f64) -> Self {
        let water_level_cm = if water_level_cm <= 0.0 { 0.0 } else { water_level_cm };
        Reading {
            water_level_cm,
            temperature_c,
            humidity_pct,
        }
    }
}

/// A reading sampled by the dashboard at one render tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub reading: Reading,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Reasons a sensor payload is rejected.
///
/// Segment numbers are 1-based, matching the position in the wire format
/// (1 = water level, 2 = temperature, 3 = humidity).
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadError {
    /// The payload bytes are not valid UTF-8.
    InvalidUtf8,
    /// The payload did not split into exactly three `|` segments.
    SegmentCount { found: usize },
    /// A segment has no `:` between label and value.
    MissingSeparator { segment: usize },
    /// The value part of a segment is not a number.
    InvalidNumber { segment: usize, value: String },
    /// The value parsed but is NaN or infinite.
    NonFiniteValue { segment: usize },
}

impl std::fmt::Display for PayloadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayloadError::InvalidUtf8 => write!(f, "Payload is not valid UTF-8"),
            PayloadError::SegmentCount { found } => {
                write!(f, "Expected 3 segments, found {}", found)
            }
            PayloadError::MissingSeparator { segment } => {
                write!(f, "Segment {} has no ':' separator", segment)
            }
            PayloadError::InvalidNumber { segment, value } => {
                write!(f, "Segment {} value '{}' is not a number", segment, value)
            }
            PayloadError::NonFiniteValue { segment } => {
                write!(f, "Segment {} value is not finite", segment)
            }
        }
    }
}

impl std::error::Error for PayloadError {}
