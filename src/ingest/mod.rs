/// Sensor data ingestion.
///
/// Submodules:
/// - `payload` — parses the pipe-delimited sensor payload into a `Reading`.
/// - `mqtt`    — background listener that feeds broker messages through the parser.
///
/// This module also owns the single shared record that hands the latest
/// reading from the listener thread to the dashboard. The record is always
/// replaced as a whole value under one lock, so a reader can never observe
/// a new water level paired with a stale temperature.

pub mod mqtt;
pub mod payload;

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use crate::logging::{self, Component};
use crate::model::{PayloadError, Reading};

/// Everything the listener has published so far.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LatestReading {
    /// Last successfully parsed reading, or zeros before the first one.
    pub reading: Reading,
    /// When `reading` was stored. `None` until a message has been accepted.
    pub received_at: Option<DateTime<Utc>>,
    /// Payloads accepted since start.
    pub accepted: u64,
    /// Payloads rejected by the parser since start.
    pub rejected: u64,
}

/// Single-writer / single-reader handoff between the listener and the dashboard.
#[derive(Debug, Default)]
pub struct SharedReading {
    latest: Mutex<LatestReading>,
}

impl SharedReading {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the held reading (last write wins).
    pub fn store(&self, reading: Reading, at: DateTime<Utc>) {
        let mut latest = self.lock();
        latest.reading = reading;
        latest.received_at = Some(at);
        latest.accepted += 1;
    }

    /// Counts a rejected payload without touching the held reading.
    pub fn record_rejection(&self) {
        self.lock().rejected += 1;
    }

    /// Copy of the whole record taken under the lock.
    pub fn snapshot(&self) -> LatestReading {
        *self.lock()
    }

    /// Latest good reading. Never fails.
    pub fn current_reading(&self) -> Reading {
        self.lock().reading
    }

    // The record is plain data and every write replaces it completely, so a
    // panic in another holder cannot leave it half-written.
    fn lock(&self) -> MutexGuard<'_, LatestReading> {
        self.latest
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Parses a raw payload and, on success, publishes it to `shared`.
///
/// On failure the previously held reading is kept (last-known-good) and
/// the rejection is counted. Logging is left to the caller.
pub fn apply_payload(
    shared: &SharedReading,
    bytes: &[u8],
    now: DateTime<Utc>,
) -> Result<Reading, PayloadError> {
    match payload::parse_payload_bytes(bytes) {
        Ok(reading) => {
            shared.store(reading, now);
            Ok(reading)
        }
        Err(e) => {
            shared.record_rejection();
            Err(e)
        }
    }
}

/// `apply_payload` plus the diagnostics both ingest paths emit.
pub fn ingest_and_log(shared: &SharedReading, source: &str, bytes: &[u8]) {
    match apply_payload(shared, bytes, Utc::now()) {
        Ok(reading) => logging::debug(
            Component::Parser,
            Some(source),
            &format!(
                "accepted: level={:.2} cm, temp={:.2} C, humidity={:.2} %",
                reading.water_level_cm, reading.temperature_c, reading.humidity_pct
            ),
        ),
        Err(e) => logging::log_payload_rejection(source, bytes, &e),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
