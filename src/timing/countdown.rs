//! Countdown and progress figures derived from dates and an injected "now"
//!
//! Calendar dates are taken to begin at midnight UTC.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

const MS_PER_SECOND: i64 = 1000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// Midnight UTC at the start of `date`
pub fn start_of_day_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Time left until maturity, truncated to whole seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRemaining {
    pub days: i64,
    /// 0-23
    pub hours: i64,
    /// 0-59
    pub minutes: i64,
    /// 0-59
    pub seconds: i64,
    /// Undecomposed remaining milliseconds
    pub total_millis: i64,
    pub is_expired: bool,
}

impl TimeRemaining {
    pub fn expired() -> Self {
        Self {
            days: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
            total_millis: 0,
            is_expired: true,
        }
    }

    fn from_millis(total: i64) -> Self {
        Self {
            days: total / MS_PER_DAY,
            hours: (total / MS_PER_HOUR) % 24,
            minutes: (total / MS_PER_MINUTE) % 60,
            seconds: (total / MS_PER_SECOND) % 60,
            total_millis: total,
            is_expired: false,
        }
    }
}

impl fmt::Display for TimeRemaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_expired {
            return f.write_str("Matured");
        }
        write!(
            f,
            "{}d {:02}h {:02}m {:02}s",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

/// Countdown to an exact instant
pub fn time_remaining_until(target: DateTime<Utc>, now: DateTime<Utc>) -> TimeRemaining {
    let total = target.timestamp_millis() - now.timestamp_millis();
    if total <= 0 {
        TimeRemaining::expired()
    } else {
        TimeRemaining::from_millis(total)
    }
}

/// Countdown to the start of the maturity date
pub fn time_remaining(maturity_date: NaiveDate, now: DateTime<Utc>) -> TimeRemaining {
    time_remaining_until(start_of_day_utc(maturity_date), now)
}

/// Elapsed share of the term in percent, clamped to [0, 100]
pub fn progress(start_date: NaiveDate, maturity_date: NaiveDate, now: DateTime<Utc>) -> f64 {
    let start = start_of_day_utc(start_date).timestamp_millis();
    let end = start_of_day_utc(maturity_date).timestamp_millis();
    let now = now.timestamp_millis();

    if now < start {
        return 0.0;
    }
    if now >= end {
        return 100.0;
    }

    let elapsed = (now - start) as f64;
    let total = (end - start) as f64;
    (elapsed / total * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_countdown_decomposition() {
        let now = at(2025, 12, 29, 20, 15, 30) + Duration::milliseconds(250);
        let remaining = time_remaining(date(2026, 1, 1), now);

        assert!(!remaining.is_expired);
        assert_eq!(remaining.days, 2);
        assert_eq!(remaining.hours, 3);
        assert_eq!(remaining.minutes, 44);
        assert_eq!(remaining.seconds, 29);
        assert_eq!(remaining.to_string(), "2d 03h 44m 29s");

        let rebuilt = ((remaining.days * 24 + remaining.hours) * 60 + remaining.minutes) * 60 * 1000
            + remaining.seconds * 1000;
        let remainder = remaining.total_millis - rebuilt;
        assert_eq!(remainder, 750);
    }

    #[test]
    fn test_countdown_identity_holds_over_many_instants() {
        let maturity = date(2030, 6, 15);
        let mut now = at(2024, 1, 1, 0, 0, 0);
        while now < start_of_day_utc(maturity) {
            let r = time_remaining(maturity, now);
            let rebuilt = ((r.days * 24 + r.hours) * 60 + r.minutes) * 60 * 1000 + r.seconds * 1000;
            let remainder = r.total_millis - rebuilt;
            assert!((0..1000).contains(&remainder), "remainder {} at {}", remainder, now);
            assert!(r.hours < 24 && r.minutes < 60 && r.seconds < 60);
            now += Duration::milliseconds(7_919_377_123);
        }
    }

    #[test]
    fn test_countdown_expired_at_and_after_maturity() {
        let maturity = date(2026, 1, 1);
        assert_eq!(time_remaining(maturity, at(2026, 1, 1, 0, 0, 0)), TimeRemaining::expired());
        assert_eq!(time_remaining(maturity, at(2027, 3, 1, 8, 0, 0)), TimeRemaining::expired());
        assert_eq!(TimeRemaining::expired().to_string(), "Matured");

        let last_ms = start_of_day_utc(maturity) - Duration::milliseconds(1);
        let r = time_remaining(maturity, last_ms);
        assert!(!r.is_expired);
        assert_eq!((r.days, r.hours, r.minutes, r.seconds), (0, 0, 0, 0));
        assert_eq!(r.total_millis, 1);
    }

    #[test]
    fn test_progress_bounds() {
        let start = date(2024, 1, 1);
        let maturity = date(2026, 1, 1);
        assert_eq!(progress(start, maturity, at(2023, 6, 1, 0, 0, 0)), 0.0);
        assert_eq!(progress(start, maturity, at(2024, 1, 1, 0, 0, 0)), 0.0);
        assert_eq!(progress(start, maturity, at(2026, 1, 1, 0, 0, 0)), 100.0);
        assert_eq!(progress(start, maturity, at(2030, 1, 1, 0, 0, 0)), 100.0);

        // 2024 has 366 days, the term 731
        assert_relative_eq!(
            progress(start, maturity, at(2025, 1, 1, 0, 0, 0)),
            366.0 / 731.0 * 100.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_progress_is_monotonic() {
        let start = date(2024, 3, 10);
        let maturity = date(2024, 9, 10);
        let mut now = at(2024, 3, 1, 0, 0, 0);
        let mut last = 0.0;
        while now < at(2024, 9, 20, 0, 0, 0) {
            let p = progress(start, maturity, now);
            assert!(p >= last, "progress went from {} to {} at {}", last, p, now);
            assert!((0.0..=100.0).contains(&p));
            last = p;
            now += Duration::hours(13);
        }
        assert_eq!(last, 100.0);
    }

    #[test]
    fn test_zero_length_term() {
        let day = date(2024, 5, 5);
        assert_eq!(progress(day, day, at(2024, 5, 4, 0, 0, 0)), 0.0);
        assert_eq!(progress(day, day, at(2024, 5, 5, 0, 0, 0)), 100.0);
    }
}
