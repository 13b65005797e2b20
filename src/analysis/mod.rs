/// Summaries over the sampled water level history.
///
/// Feeds the chart and trend line on the dashboard. Everything here is a
/// pure function of the history slice; nothing is stored.

use serde::Serialize;

use crate::model::HistoryEntry;

/// Level change between first and last sample below which the river is
/// considered steady.
pub const TREND_TOLERANCE_CM: f64 = 1.0;

/// Bar glyphs for sparklines, lowest to highest.
const SPARK_BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trend {
    Rising,
    Falling,
    Steady,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trend::Rising => write!(f, "rising"),
            Trend::Falling => write!(f, "falling"),
            Trend::Steady => write!(f, "steady"),
        }
    }
}

/// Water level statistics over the history window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistoryStats {
    pub samples: usize,
    pub min_cm: f64,
    pub max_cm: f64,
    pub mean_cm: f64,
    pub latest_cm: f64,
    pub trend: Trend,
}

/// Returns `None` for an empty history.
pub fn summarize(entries: &[HistoryEntry]) -> Option<HistoryStats> {
    let first = entries.first()?.reading.water_level_cm;
    let latest = entries.last()?.reading.water_level_cm;

    let levels = entries.iter().map(|e| e.reading.water_level_cm);
    let min_cm = levels.clone().fold(f64::INFINITY, f64::min);
    let max_cm = levels.clone().fold(f64::NEG_INFINITY, f64::max);
    let mean_cm = levels.sum::<f64>() / entries.len() as f64;

    Some(HistoryStats {
        samples: entries.len(),
        min_cm,
        max_cm,
        mean_cm,
        latest_cm: latest,
        trend: trend_between(first, latest),
    })
}

fn trend_between(first: f64, last: f64) -> Trend {
    let delta = last - first;
    if delta > TREND_TOLERANCE_CM {
        Trend::Rising
    } else if delta < -TREND_TOLERANCE_CM {
        Trend::Falling
    } else {
        Trend::Steady
    }
}

/// Renders the most recent `width` values as a one-line bar chart.
///
/// Values are scaled between the window's min and max; a flat window
/// renders as the lowest bar.
pub fn sparkline(values: &[f64], width: usize) -> String {
    let start = values.len().saturating_sub(width);
    let window = &values[start..];
    if window.is_empty() {
        return String::new();
    }

    let min = window.iter().copied().fold(f64::INFINITY, f64::min);
    let max = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    let top = (SPARK_BARS.len() - 1) as f64;

    window
        .iter()
        .map(|&v| {
            let idx = if range > 0.0 {
                ((v - min) / range * top).round() as usize
            } else {
                0
            };
            SPARK_BARS[idx.min(SPARK_BARS.len() - 1)]
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Reading;
    use chrono::{Duration, TimeZone, Utc};

    fn entries(levels: &[f64]) -> Vec<HistoryEntry> {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap();
        levels
            .iter()
            .enumerate()
            .map(|(i, &level)| HistoryEntry {
                timestamp: start + Duration::seconds(i as i64 * 5),
                reading: Reading::new(level, 20.0, 50.0),
            })
            .collect()
    }

    #[test]
    fn test_empty_history_has_no_stats() {
        assert!(summarize(&[]).is_none());
    }

    #[test]
    fn test_stats_over_rising_river() {
        let stats = summarize(&entries(&[100.0, 150.0, 200.0])).expect("non-empty");
        assert_eq!(stats.samples, 3);
        assert_eq!(stats.min_cm, 100.0);
        assert_eq!(stats.max_cm, 200.0);
        assert_eq!(stats.mean_cm, 150.0);
        assert_eq!(stats.latest_cm, 200.0);
        assert_eq!(stats.trend, Trend::Rising);
    }

    #[test]
    fn test_falling_and_steady_trends() {
        let falling = summarize(&entries(&[200.0, 180.0])).expect("non-empty");
        assert_eq!(falling.trend, Trend::Falling);

        let steady = summarize(&entries(&[120.0, 135.0, 120.5])).expect("non-empty");
        assert_eq!(steady.trend, Trend::Steady, "within tolerance of the first sample");
    }

    #[test]
    fn test_single_sample_is_steady() {
        let stats = summarize(&entries(&[42.0])).expect("non-empty");
        assert_eq!(stats.trend, Trend::Steady);
        assert_eq!(stats.min_cm, stats.max_cm);
    }

    #[test]
    fn test_sparkline_scales_between_min_and_max() {
        assert_eq!(sparkline(&[0.0, 50.0, 100.0], 10), "▁▅█");
    }

    #[test]
    fn test_sparkline_keeps_only_most_recent_values() {
        let line = sparkline(&[1.0, 2.0, 3.0, 4.0, 5.0], 2);
        assert_eq!(line.chars().count(), 2);
        assert_eq!(line, "▁█");
    }

    #[test]
    fn test_flat_sparkline_uses_lowest_bar() {
        assert_eq!(sparkline(&[7.0, 7.0, 7.0], 10), "▁▁▁");
        assert_eq!(sparkline(&[], 10), "");
    }
}
