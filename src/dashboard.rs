/// State & alert aggregation for the dashboard.
///
/// The dashboard does not run its own loop. The binary calls `tick` on
/// a fixed period; each tick samples whatever the listener last stored,
/// appends it to a bounded history and classifies the alert tier. New
/// data arriving between ticks simply overwrites the shared record.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::alert::stalenesses::{age_secs_at, is_stale_at};
use crate::alert::thresholds::{AlertThresholds, AlertTier, FloodAlert, check_reading};
use crate::analysis::{HistoryStats, summarize};
use crate::ingest::SharedReading;
use crate::model::{HistoryEntry, Reading};

/// Default number of samples kept for charts.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Everything the presentation layer needs for one render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickView {
    pub timestamp: DateTime<Utc>,
    pub reading: Reading,
    pub tier: AlertTier,
    pub alert: Option<FloodAlert>,
    /// No payload accepted within the configured window.
    pub stale: bool,
    /// Seconds since the last accepted payload, if any arrived.
    pub data_age_secs: Option<i64>,
    pub accepted: u64,
    pub rejected: u64,
    pub history_len: usize,
    pub stats: Option<HistoryStats>,
}

pub struct Dashboard {
    shared: Arc<SharedReading>,
    history: VecDeque<HistoryEntry>,
    capacity: usize,
    thresholds: AlertThresholds,
    stale_after_secs: u64,
}

impl Dashboard {
    /// A capacity of zero is treated as one; the config layer rejects it earlier.
    pub fn new(
        shared: Arc<SharedReading>,
        capacity: usize,
        thresholds: AlertThresholds,
        stale_after_secs: u64,
    ) -> Self {
        let capacity = capacity.max(1);
        Self {
            shared,
            history: VecDeque::with_capacity(capacity),
            capacity,
            thresholds,
            stale_after_secs,
        }
    }

    /// Dashboard with the standard thresholds and a 50-sample history.
    pub fn with_defaults(shared: Arc<SharedReading>) -> Self {
        Self::new(
            shared,
            DEFAULT_HISTORY_CAPACITY,
            AlertThresholds::default(),
            60,
        )
    }

    /// Runs one tick using the real current time.
    pub fn tick(&mut self) -> TickView {
        self.tick_at(Utc::now())
    }

    /// Samples the shared reading, appends it to history (evicting the oldest
    /// entry past capacity) and classifies it.
    pub fn tick_at(&mut self, now: DateTime<Utc>) -> TickView {
        let latest = self.shared.snapshot();

        self.history.push_back(HistoryEntry {
            timestamp: now,
            reading: latest.reading,
        });
        while self.history.len() > self.capacity {
            self.history.pop_front();
        }

        let stats = summarize(self.history.make_contiguous());

        TickView {
            timestamp: now,
            reading: latest.reading,
            tier: self.thresholds.classify(latest.reading.water_level_cm),
            alert: check_reading(&latest.reading, &self.thresholds),
            stale: is_stale_at(latest.received_at, self.stale_after_secs, now),
            data_age_secs: age_secs_at(latest.received_at, now),
            accepted: latest.accepted,
            rejected: latest.rejected,
            history_len: self.history.len(),
            stats,
        }
    }

    /// Latest good reading held by the listener. Never fails.
    pub fn current_reading(&self) -> Reading {
        self.shared.current_reading()
    }

    /// Sampled history, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &HistoryEntry> + '_ {
        self.history.iter()
    }

    /// Sampled history as an owned, oldest-first vector.
    pub fn history_vec(&self) -> Vec<HistoryEntry> {
        self.history.iter().copied().collect()
    }

    pub fn alert_tier(&self, reading: &Reading) -> AlertTier {
        self.thresholds.classify(reading.water_level_cm)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn thresholds(&self) -> &AlertThresholds {
        &self.thresholds
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
