//! # Calendar Periods
//!
//! Converts local calendar boundaries into UTC instants.
//!
//! Timestamps are stored in UTC, but "today", "this month" and an inclusive
//! `date_from..=date_to` filter are meaningful in the clinic's local time.
//! Every helper takes the time zone explicitly, so nothing here reads the
//! clock.
//!
//! ```text
//!   local (UTC+7)   2024-03-01 00:00 ─────────── 2024-03-02 00:00
//!                          │                            │
//!   stored (UTC)    2024-02-29 17:00 ─────────── 2024-03-01 17:00
//!                          start (inclusive)            end (exclusive)
//! ```

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// UTC instant of local midnight at the start of `date`.
///
/// When midnight falls in a DST gap, the first valid local instant after it
/// is used.
pub fn start_of_day<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    first_valid_instant(date.and_time(NaiveTime::MIN), tz)
}

/// UTC instant of local midnight on the first day of `date`'s month.
pub fn start_of_month<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let first = date.with_day(1).unwrap_or(date);
    start_of_day(first, tz)
}

fn first_valid_instant<Tz: TimeZone>(local: NaiveDateTime, tz: &Tz) -> DateTime<Utc> {
    let mut candidate = local;
    // Real-world gaps are at most a couple of hours.
    for _ in 0..48 {
        if let Some(instant) = tz.from_local_datetime(&candidate).earliest() {
            return instant.with_timezone(&Utc);
        }
        candidate += Duration::minutes(15);
    }
    Utc.from_utc_datetime(&local)
}

// =============================================================================
// Day Range
// =============================================================================

/// Half-open UTC range `[start, end)` covering whole local days.
///
/// A missing bound means unbounded on that side. An inverted date pair
/// yields `start >= end`, which matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DayRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DayRange {
    /// Builds the range for an inclusive `from..=to` local date filter.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};
    /// use klinik_core::period::DayRange;
    ///
    /// let wib = FixedOffset::east_opt(7 * 3600).unwrap();
    /// let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    ///
    /// let range = DayRange::from_dates(Some(day), Some(day), &wib);
    /// assert_eq!(range.start, Some(Utc.with_ymd_and_hms(2024, 2, 29, 17, 0, 0).unwrap()));
    /// assert_eq!(range.end, Some(Utc.with_ymd_and_hms(2024, 3, 1, 17, 0, 0).unwrap()));
    /// ```
    pub fn from_dates<Tz: TimeZone>(
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        tz: &Tz,
    ) -> Self {
        DayRange {
            start: from.map(|d| start_of_day(d, tz)),
            end: to.and_then(|d| d.succ_opt()).map(|d| start_of_day(d, tz)),
        }
    }
}

// =============================================================================
// Dashboard Periods
// =============================================================================

/// The two windows the dashboard reports on, both ending at `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Periods {
    pub today_start: DateTime<Utc>,
    pub month_start: DateTime<Utc>,
    pub now: DateTime<Utc>,
}

impl Periods {
    /// Computes today and this month from a local "now".
    pub fn at<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        let tz = now.timezone();
        let today = now.date_naive();

        Periods {
            today_start: start_of_day(today, &tz),
            month_start: start_of_month(today, &tz),
            now: now.with_timezone(&Utc),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    /// Same predicate the repositories push into SQL.
    fn covers(range: &DayRange, instant: DateTime<Utc>) -> bool {
        range.start.map_or(true, |s| instant >= s) && range.end.map_or(true, |e| instant < e)
    }

    #[test]
    fn test_start_of_day_in_utc() {
        assert_eq!(start_of_day(date(2024, 3, 15), &Utc), utc(2024, 3, 15, 0, 0));
    }

    #[test]
    fn test_start_of_day_east_of_utc() {
        let wib = FixedOffset::east_opt(7 * 3600).unwrap();
        assert_eq!(start_of_day(date(2024, 3, 15), &wib), utc(2024, 3, 14, 17, 0));
    }

    #[test]
    fn test_start_of_month() {
        let wib = FixedOffset::east_opt(7 * 3600).unwrap();
        assert_eq!(start_of_month(date(2024, 3, 15), &wib), utc(2024, 2, 29, 17, 0));
        assert_eq!(start_of_month(date(2024, 3, 1), &Utc), utc(2024, 3, 1, 0, 0));
    }

    #[test]
    fn test_day_range_is_inclusive_of_whole_days() {
        let range = DayRange::from_dates(Some(date(2024, 1, 2)), Some(date(2024, 1, 3)), &Utc);

        assert!(!covers(&range, utc(2024, 1, 1, 23, 59)));
        assert!(covers(&range, utc(2024, 1, 2, 0, 0)));
        assert!(covers(&range, utc(2024, 1, 3, 23, 59)));
        assert!(!covers(&range, utc(2024, 1, 4, 0, 0)));
    }

    #[test]
    fn test_day_range_open_ends() {
        let range = DayRange::from_dates(None, None, &Utc);
        assert_eq!(range, DayRange::default());
        assert!(covers(&range, utc(1999, 1, 1, 0, 0)));

        let from_only = DayRange::from_dates(Some(date(2024, 1, 2)), None, &Utc);
        assert!(from_only.end.is_none());
        assert!(covers(&from_only, utc(2030, 1, 1, 0, 0)));
    }

    #[test]
    fn test_inverted_day_range_covers_nothing() {
        let range = DayRange::from_dates(Some(date(2024, 1, 3)), Some(date(2024, 1, 2)), &Utc);

        assert_eq!(range.start, Some(utc(2024, 1, 3, 0, 0)));
        assert_eq!(range.end, Some(utc(2024, 1, 3, 0, 0)));
        assert!(!covers(&range, utc(2024, 1, 2, 12, 0)));
        assert!(!covers(&range, utc(2024, 1, 3, 0, 0)));
        assert!(!covers(&range, utc(2024, 1, 3, 12, 0)));
    }

    #[test]
    fn test_periods_at() {
        let wib = FixedOffset::east_opt(7 * 3600).unwrap();
        // 2024-03-15 02:30 local is still 2024-03-14 in UTC
        let now = wib.with_ymd_and_hms(2024, 3, 15, 2, 30, 0).unwrap();

        let periods = Periods::at(&now);
        assert_eq!(periods.today_start, utc(2024, 3, 14, 17, 0));
        assert_eq!(periods.month_start, utc(2024, 2, 29, 17, 0));
        assert_eq!(periods.now, utc(2024, 3, 14, 19, 30));
    }
}
