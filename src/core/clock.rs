//! Clock Port and Calendar Helpers
//!
//! All time-derived effects in the engine are pure functions of
//! `(storedTimestamp, now)`. The clock is injectable so tests can drive
//! time deterministically; the engine never reads system time itself.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Datelike, Utc};

/// Milliseconds since the Unix epoch.
pub type Timestamp = i64;

/// One second in milliseconds.
pub const SECOND_MS: i64 = 1_000;

/// One minute in milliseconds.
pub const MINUTE_MS: i64 = 60 * SECOND_MS;

/// One day in milliseconds.
pub const DAY_MS: i64 = 24 * 60 * MINUTE_MS;

/// Reward window for the weekly track.
pub const WEEK_MS: i64 = 7 * DAY_MS;

/// Reward window for the monthly track (fixed 30-day window).
pub const MONTH_MS: i64 = 30 * DAY_MS;

/// Clock port. Injectable for deterministic tests and replays.
pub trait Clock: Send + Sync {
    /// Current time in milliseconds since the Unix epoch.
    fn now(&self) -> Timestamp;
}

/// Wall-clock implementation used by the binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now().timestamp_millis()
    }
}

/// Manually driven clock for tests and scripted demos.
#[derive(Debug)]
pub struct FixedClock {
    now: AtomicI64,
}

impl FixedClock {
    /// Create a clock frozen at the given timestamp.
    pub fn new(now: Timestamp) -> Self {
        Self { now: AtomicI64::new(now) }
    }

    /// Jump to an absolute timestamp.
    pub fn set(&self, now: Timestamp) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Advance the clock by `delta_ms` and return the new time.
    pub fn advance(&self, delta_ms: i64) -> Timestamp {
        self.now.fetch_add(delta_ms, Ordering::SeqCst) + delta_ms
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}

/// Calendar day key (`YYYY-MM-DD`, UTC) for daily rewards and mission resets.
pub fn day_key(ts: Timestamp) -> String {
    to_utc(ts).format("%Y-%m-%d").to_string()
}

/// ISO week key (`YYYY-Www`, UTC) for weekly mission resets.
pub fn week_key(ts: Timestamp) -> String {
    let iso = to_utc(ts).iso_week();
    format!("{:04}-W{:02}", iso.year(), iso.week())
}

fn to_utc(ts: Timestamp) -> DateTime<Utc> {
    // Out-of-range timestamps clamp to the epoch rather than panic; corrupt
    // persisted data must never crash the engine.
    DateTime::<Utc>::from_timestamp_millis(ts).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_key_format() {
        // 2024-06-15T12:00:00Z
        let ts = 1_718_452_800_000;
        assert_eq!(day_key(ts), "2024-06-15");
    }

    #[test]
    fn test_day_key_rolls_at_midnight() {
        let ts = 1_718_452_800_000;
        let key_a = day_key(ts);
        let key_b = day_key(ts + DAY_MS);
        assert_ne!(key_a, key_b);
        assert_eq!(key_b, "2024-06-16");
    }

    #[test]
    fn test_week_key_stable_within_week() {
        // 2024-06-10 is a Monday.
        let monday = 1_718_020_800_000;
        assert_eq!(week_key(monday), week_key(monday + 6 * DAY_MS));
        assert_ne!(week_key(monday), week_key(monday + 7 * DAY_MS));
    }

    #[test]
    fn test_fixed_clock_advances() {
        let clock = FixedClock::new(1_000);
        assert_eq!(clock.now(), 1_000);
        assert_eq!(clock.advance(500), 1_500);
        clock.set(10_000);
        assert_eq!(clock.now(), 10_000);
    }

    #[test]
    fn test_corrupt_timestamp_does_not_panic() {
        let _ = day_key(i64::MAX);
        let _ = week_key(i64::MIN);
    }
}
