//! Half-open date ranges and fetch windows.

use std::fmt;

use chrono::{DateTime, Duration, Local, Months, NaiveDate, TimeZone};

use crate::error::{CalSheetError, CalSheetResult};

/// A half-open time range `[from, to)` in local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: DateTime<Local>,
    pub to: DateTime<Local>,
}

impl DateRange {
    pub fn new(from: DateTime<Local>, to: DateTime<Local>) -> Self {
        DateRange { from, to }
    }

    /// Range from `from` until `months` months after `now`.
    pub fn until_months_after(
        from: DateTime<Local>,
        now: DateTime<Local>,
        months: u32,
    ) -> CalSheetResult<Self> {
        let to = now.checked_add_months(Months::new(months)).ok_or_else(|| {
            CalSheetError::Config(format!("{months} months after {now} is out of range"))
        })?;
        Ok(DateRange { from, to })
    }

    pub fn is_empty(&self) -> bool {
        self.from >= self.to
    }

    /// Number of whole days covered, rounding a partial day up.
    pub fn span_days(&self) -> i64 {
        if self.is_empty() {
            return 0;
        }
        let seconds = (self.to - self.from).num_seconds();
        (seconds + 86_399) / 86_400
    }

    /// Split the range into consecutive windows of `days` days.
    /// The last window is clipped to `to`.
    pub fn windows(&self, days: i64) -> Vec<DateRange> {
        let step = Duration::days(days.max(1));
        let mut windows = Vec::new();
        let mut cursor = self.from;

        while cursor < self.to {
            let end = (cursor + step).min(self.to);
            windows.push(DateRange { from: cursor, to: end });
            cursor = end;
        }

        windows
    }

    /// The first `days` days of the range, clipped to `to`.
    pub fn head(&self, days: i64) -> DateRange {
        DateRange {
            from: self.from,
            to: (self.from + Duration::days(days)).min(self.to),
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} .. {}",
            self.from.format("%Y-%m-%d %H:%M"),
            self.to.format("%Y-%m-%d %H:%M")
        )
    }
}

/// Midnight at the start of `date` in local time.
pub fn local_midnight(date: NaiveDate) -> CalSheetResult<DateTime<Local>> {
    let naive = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| CalSheetError::Config(format!("Invalid date {date}")))?;

    // Some zones skip midnight on DST days; take the first valid instant.
    Local
        .from_local_datetime(&naive)
        .earliest()
        .or_else(|| {
            Local
                .from_local_datetime(&(naive + Duration::hours(1)))
                .earliest()
        })
        .ok_or_else(|| CalSheetError::Config(format!("No local midnight on {date}")))
}

/// Midnight at the start of the day containing `now`.
pub fn start_of_day(now: DateTime<Local>) -> CalSheetResult<DateTime<Local>> {
    local_midnight(now.date_naive())
}

/// Parse YYYY-MM-DD as local midnight.
pub fn parse_date_start(s: &str) -> CalSheetResult<DateTime<Local>> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
        CalSheetError::Config(format!("Invalid date format '{}'. Expected YYYY-MM-DD", s))
    })?;
    local_midnight(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> DateTime<Local> {
        local_midnight(NaiveDate::from_ymd_opt(y, m, d).unwrap()).unwrap()
    }

    #[test]
    fn test_windows_cover_range_without_gaps() {
        let start = Local.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let range = DateRange::new(start, start + Duration::days(100));

        let windows = range.windows(30);

        assert_eq!(windows.len(), 4);
        assert_eq!(windows[0].from, start);
        assert_eq!(windows[0].to, start + Duration::days(30));
        assert_eq!(windows[1].from, start + Duration::days(30));
        assert_eq!(windows[2].to, start + Duration::days(90));
        assert_eq!(windows[3].from, start + Duration::days(90));
        assert_eq!(windows[3].to, start + Duration::days(100));

        for pair in windows.windows(2) {
            assert_eq!(pair[0].to, pair[1].from, "windows must be contiguous");
        }
    }

    #[test]
    fn test_windows_of_empty_range() {
        let start = day(2025, 1, 1);
        assert!(DateRange::new(start, start).windows(30).is_empty());
        assert!(DateRange::new(start, start - Duration::days(1)).windows(30).is_empty());
    }

    #[test]
    fn test_exact_multiple_has_no_trailing_window() {
        let start = day(2025, 1, 1);
        let range = DateRange::new(start, start + Duration::days(60));
        assert_eq!(range.windows(30).len(), 2);
    }

    #[test]
    fn test_span_days_rounds_up() {
        let start = Local.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap();
        let range = DateRange::new(start, start + Duration::days(3) + Duration::hours(1));
        assert_eq!(range.span_days(), 4);
        assert_eq!(DateRange::new(start, start).span_days(), 0);
    }

    #[test]
    fn test_head_is_clipped() {
        let start = day(2025, 1, 1);
        let range = DateRange::new(start, start + Duration::days(3));
        assert_eq!(range.head(7).to, range.to);
        assert_eq!(range.head(1).to, start + Duration::days(1));
    }

    #[test]
    fn test_until_months_after() {
        let now = Local.with_ymd_and_hms(2025, 6, 15, 9, 30, 0).unwrap();
        let range = DateRange::until_months_after(day(2025, 6, 15), now, 12).unwrap();
        assert_eq!(range.to, Local.with_ymd_and_hms(2026, 6, 15, 9, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_date_start() {
        assert_eq!(parse_date_start("2012-01-01").unwrap(), day(2012, 1, 1));
        assert!(parse_date_start("01/01/2012").is_err());
    }

    #[test]
    fn test_start_of_day() {
        let now = Local.with_ymd_and_hms(2025, 6, 15, 18, 45, 0).unwrap();
        assert_eq!(start_of_day(now).unwrap(), day(2025, 6, 15));
    }
}
