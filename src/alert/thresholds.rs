//! Flood level threshold checking.
//!
//! The tier is a pure function of the water level. Each tick is classified
//! on its own; there is no hysteresis, so a level hovering around a boundary
//! will flap between tiers from one tick to the next.

use serde::{Deserialize, Serialize};

use crate::model::Reading;

/// Alert tiers, in ascending order of severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertTier {
    Normal,
    Warning,
    Critical,
}

impl AlertTier {
    /// Operator-facing description of the tier.
    pub fn message(&self) -> &'static str {
        match self {
            AlertTier::Normal => "Water level under control",
            AlertTier::Warning => "Elevated water level",
            AlertTier::Critical => "FLOOD RISK! Water level exceeded the critical mark",
        }
    }
}

impl std::fmt::Display for AlertTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertTier::Normal => write!(f, "NORMAL"),
            AlertTier::Warning => write!(f, "WARNING"),
            AlertTier::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Water level boundaries, in centimetres. Each boundary is the inclusive
/// lower bound of its tier:
///
///   level <  warning_cm               → Normal
///   warning_cm <= level < critical_cm → Warning
///   level >= critical_cm              → Critical
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertThresholds {
    pub warning_cm: f64,
    pub critical_cm: f64,
}

impl AlertThresholds {
    pub const DEFAULT: AlertThresholds = AlertThresholds {
        warning_cm: 150.0,
        critical_cm: 250.0,
    };

    /// Total over every `f64`: negatives and NaN fall through to `Normal`.
    pub fn classify(&self, water_level_cm: f64) -> AlertTier {
        if water_level_cm >= self.critical_cm {
            AlertTier::Critical
        } else if water_level_cm >= self.warning_cm {
            AlertTier::Warning
        } else {
            AlertTier::Normal
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.warning_cm.is_finite() || !self.critical_cm.is_finite() {
            return Err("thresholds must be finite numbers".to_string());
        }
        if self.warning_cm >= self.critical_cm {
            return Err(format!(
                "warning_cm ({}) must be below critical_cm ({})",
                self.warning_cm, self.critical_cm
            ));
        }
        Ok(())
    }
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Tier for a water level under the standard 150 / 250 cm boundaries.
pub fn tier_for_level(water_level_cm: f64) -> AlertTier {
    AlertThresholds::DEFAULT.classify(water_level_cm)
}

/// Tier for a reading under the standard boundaries.
pub fn alert_tier(reading: &Reading) -> AlertTier {
    tier_for_level(reading.water_level_cm)
}

/// An alert raised when a reading reaches the warning boundary or above.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FloodAlert {
    pub tier: AlertTier,
    pub message: String,
}

/// Returns an alert if the reading is at or above the warning boundary.
///
/// Returns `None` for `Normal`.
pub fn check_reading(reading: &Reading, thresholds: &AlertThresholds) -> Option<FloodAlert> {
    let tier = thresholds.classify(reading.water_level_cm);
    let boundary = match tier {
        AlertTier::Normal => return None,
        AlertTier::Warning => thresholds.warning_cm,
        AlertTier::Critical => thresholds.critical_cm,
    };
    Some(FloodAlert {
        tier,
        message: format!(
            "{}: {:.2} cm (threshold {:.0} cm)",
            tier.message(),
            reading.water_level_cm,
            boundary
        ),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
