/// Console rendering of a dashboard tick.
///
/// Thin presentation glue: formats a `TickView` and the sampled history as
/// text for a terminal, or as JSON for piping into other tools.

use crate::alert::thresholds::AlertTier;
use crate::analysis::sparkline;
use crate::dashboard::TickView;
use crate::model::HistoryEntry;

/// Widest chart drawn, in samples.
pub const CHART_WIDTH: usize = 50;

const RULE: &str = "═══════════════════════════════════════════════════════════";

pub fn render_dashboard(view: &TickView, history: &[HistoryEntry]) -> String {
    let mut out = String::new();

    out.push_str(RULE);
    out.push('\n');
    out.push_str("🌊 Flood Monitoring Dashboard\n");
    out.push_str(&format!("   {}\n", view.timestamp.format("%Y-%m-%d %H:%M:%S UTC")));
    out.push_str(RULE);
    out.push('\n');

    out.push_str(&format!("  Water level (cm):   {:>8.2}\n", view.reading.water_level_cm));
    out.push_str(&format!("  Temperature (°C):   {:>8.2}\n", view.reading.temperature_c));
    out.push_str(&format!("  Humidity (%):       {:>8.2}\n", view.reading.humidity_pct));
    out.push('\n');

    let banner = match (&view.alert, view.tier) {
        (Some(alert), AlertTier::Critical) => format!("🚨 {}", alert.message),
        (Some(alert), _) => format!("⚠️  {}", alert.message),
        (None, tier) => format!("✓ {}", tier.message()),
    };
    out.push_str(&format!("  [{}] {}\n", view.tier, banner));

    if view.stale {
        let age = match view.data_age_secs {
            Some(secs) => format!("last payload {}s ago", secs),
            None => "no payload received yet".to_string(),
        };
        out.push_str(&format!("  ⚠ Sensor silent: {}, showing last known values\n", age));
    }

    let levels: Vec<f64> = history.iter().map(|e| e.reading.water_level_cm).collect();
    if !levels.is_empty() {
        out.push('\n');
        out.push_str(&format!("  Level  {}\n", sparkline(&levels, CHART_WIDTH)));
    }
    if let Some(stats) = &view.stats {
        out.push_str(&format!(
            "  min {:.2} / avg {:.2} / max {:.2} cm over {} samples, {}\n",
            stats.min_cm, stats.mean_cm, stats.max_cm, stats.samples, stats.trend
        ));
    }

    out.push_str(&format!(
        "  Payloads: {} accepted, {} rejected\n",
        view.accepted, view.rejected
    ));
    out.push_str(RULE);
    out.push('\n');
    out
}

/// One JSON object per tick.
pub fn render_json(view: &TickView) -> Result<String, serde_json::Error> {
    serde_json::to_string(view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::Dashboard;
    use crate::ingest::{SharedReading, apply_payload};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::sync::Arc;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap()
    }

    fn render_after(payloads: &[&str], tick_offset_secs: i64) -> String {
        let shared = Arc::new(SharedReading::new());
        let mut dash = Dashboard::with_defaults(Arc::clone(&shared));
        for p in payloads {
            let _ = apply_payload(&shared, p.as_bytes(), fixed_now());
        }
        let view = dash.tick_at(fixed_now() + Duration::seconds(tick_offset_secs));
        render_dashboard(&view, &dash.history_vec())
    }

    #[test]
    fn test_metrics_use_two_decimals() {
        let text = render_after(&["Nivel: 23.45 cm | T: 28.5 | U: 40.2"], 5);
        assert!(text.contains("23.45"), "{}", text);
        assert!(text.contains("28.50"), "{}", text);
        assert!(text.contains("40.20"), "{}", text);
        assert!(text.contains("[NORMAL]"), "{}", text);
    }

    #[test]
    fn test_critical_banner() {
        let text = render_after(&["Nivel: 260 cm | T: 30 | U: 50"], 5);
        assert!(text.contains("[CRITICAL]"), "{}", text);
        assert!(text.contains("🚨"), "{}", text);
    }

    #[test]
    fn test_warning_banner() {
        let text = render_after(&["Nivel: 200 cm | T: 30 | U: 50"], 5);
        assert!(text.contains("[WARNING]"), "{}", text);
    }

    #[test]
    fn test_silent_sensor_is_called_out() {
        let text = render_after(&[], 5);
        assert!(text.contains("no payload received yet"), "{}", text);

        let text = render_after(&["Nivel: 20 cm | T: 30 | U: 50"], 120);
        assert!(text.contains("last payload 120s ago"), "{}", text);
    }

    #[test]
    fn test_json_carries_tier_and_reading() {
        let shared = Arc::new(SharedReading::new());
        let mut dash = Dashboard::with_defaults(Arc::clone(&shared));
        apply_payload(&shared, b"Nivel: 260 cm | T: 30 | U: 50", fixed_now()).expect("valid");
        let view = dash.tick_at(fixed_now());

        let json = render_json(&view).expect("serializes");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
        assert_eq!(value["tier"], "CRITICAL");
        assert_eq!(value["reading"]["water_level_cm"], 260.0);
    }
}
