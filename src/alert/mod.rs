/// Alerting for the flood dashboard.
///
/// Submodules:
/// - `thresholds`  — water level tiers (NORMAL / WARNING / CRITICAL).
/// - `stalenesses` — flags a sensor that has gone quiet.

pub mod stalenesses;
pub mod thresholds;

pub use thresholds::{AlertThresholds, AlertTier, alert_tier};
