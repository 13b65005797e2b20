//! Flood monitoring dashboard.
//!
//! A background listener subscribes to one MQTT topic and parses the river
//! sensor's `Nivel: <cm> | T: <C> | U: <%>` payloads into a shared reading.
//! The dashboard samples that reading on a fixed tick, keeps a bounded
//! history for charts, and classifies the water level into an alert tier.

pub mod alert;
pub mod analysis;
pub mod config;
pub mod dashboard;
pub mod dev_mode;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod render;
pub mod verify;

pub use alert::thresholds::{AlertThresholds, AlertTier, alert_tier};
pub use dashboard::{Dashboard, TickView};
pub use ingest::SharedReading;
pub use model::{HistoryEntry, PayloadError, Reading};
