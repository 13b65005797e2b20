/// Sensor silence detection.
///
/// The dashboard keeps showing the last-known-good reading when payloads
/// stop arriving or stop parsing. Without a staleness flag a dead sensor
/// looks exactly like a calm river, so the dashboard compares the time of
/// the last accepted payload against a configured maximum age.
///
/// # Clock injection
/// `is_stale_at` takes `now` as a parameter rather than calling
/// `Utc::now()` internally, which keeps the tests deterministic.

use chrono::{DateTime, Utc};

/// Returns `true` if the last accepted payload is older than `max_age_secs`
/// relative to `now`, or if no payload has ever been accepted.
///
/// Staleness is strictly greater than the threshold:
///   age >  max_age_secs  →  stale
///   age == max_age_secs  →  not stale
///
/// A timestamp later than `now` counts as fresh.
pub fn is_stale_at(
    last_update: Option<DateTime<Utc>>,
    max_age_secs: u64,
    now: DateTime<Utc>,
) -> bool {
    let Some(updated) = last_update else {
        return true;
    };
    let age_secs = (now - updated).num_seconds();
    age_secs > 0 && (age_secs as u64) > max_age_secs
}

/// Convenience wrapper that uses the real current time.
/// Use `is_stale_at` in tests to keep them deterministic.
pub fn is_stale(last_update: Option<DateTime<Utc>>, max_age_secs: u64) -> bool {
    is_stale_at(last_update, max_age_secs, Utc::now())
}

/// Age in whole seconds, or `None` if nothing was ever received.
pub fn age_secs_at(last_update: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<i64> {
    last_update.map(|updated| (now - updated).num_seconds().max(0))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    /// A fixed "now" used across all tests: 2024-05-01 13:00:00 UTC.
    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap()
    }

    fn secs_ago(secs: i64) -> Option<DateTime<Utc>> {
        Some(fixed_now() - Duration::seconds(secs))
    }

    #[test]
    fn test_never_received_is_stale() {
        assert!(is_stale_at(None, 60, fixed_now()));
    }

    #[test]
    fn test_recent_update_is_not_stale() {
        assert!(!is_stale_at(secs_ago(5), 60, fixed_now()));
    }

    #[test]
    fn test_update_exactly_at_threshold_is_not_stale() {
        assert!(
            !is_stale_at(secs_ago(60), 60, fixed_now()),
            "staleness is strictly greater than, not >="
        );
    }

    #[test]
    fn test_update_one_second_past_threshold_is_stale() {
        assert!(is_stale_at(secs_ago(61), 60, fixed_now()));
    }

    #[test]
    fn test_future_update_is_not_stale() {
        assert!(!is_stale_at(secs_ago(-30), 10, fixed_now()));
    }

    #[test]
    fn test_same_update_stale_under_tight_threshold_not_under_loose() {
        let updated = secs_ago(30);
        assert!(is_stale_at(updated, 20, fixed_now()));
        assert!(!is_stale_at(updated, 60, fixed_now()));
    }

    #[test]
    fn test_age_secs() {
        assert_eq!(age_secs_at(None, fixed_now()), None);
        assert_eq!(age_secs_at(secs_ago(42), fixed_now()), Some(42));
        assert_eq!(age_secs_at(secs_ago(-5), fixed_now()), Some(0));
    }
}
