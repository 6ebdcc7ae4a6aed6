use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Reporting timeframe selected on the analytics dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeframe {
    Week,
    Month,
    Quarter,
    Year,
}

fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0)
        .expect("midnight is always valid")
        .and_utc()
}

fn day_end(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_milli_opt(23, 59, 59, 999)
        .expect("end of day is always valid")
        .and_utc()
}

fn month_start(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).expect("first of month is always valid")
}

/// Last calendar day of the month containing `date`
fn month_end(year: i32, month: u32) -> NaiveDate {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    month_start(next_year, next_month) - Duration::days(1)
}

/// Computes the UTC `[start, end]` pair for a timeframe relative to `now`.
///
/// - week: the Sunday on or before `now` through the following Saturday
/// - month: first through last calendar day of the current UTC month
/// - quarter: the current 3-month block (Jan-Mar, Apr-Jun, ...)
/// - year: Jan 1 through Dec 31
///
/// Ends are inclusive at millisecond precision (23:59:59.999Z).
pub fn period_bounds(timeframe: Timeframe, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let today = now.date_naive();

    match timeframe {
        Timeframe::Week => {
            let sunday = today - Duration::days(now.weekday().num_days_from_sunday() as i64);
            (day_start(sunday), day_end(sunday + Duration::days(6)))
        }
        Timeframe::Month => {
            let start = month_start(today.year(), today.month());
            (day_start(start), day_end(month_end(today.year(), today.month())))
        }
        Timeframe::Quarter => {
            let quarter_month = (today.month0() / 3) * 3 + 1;
            let start = month_start(today.year(), quarter_month);
            let end = month_end(today.year(), quarter_month + 2);
            (day_start(start), day_end(end))
        }
        Timeframe::Year => (
            day_start(month_start(today.year(), 1)),
            day_end(month_end(today.year(), 12)),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn test_week_starting_on_a_sunday() {
        // 2025-06-08 is itself a Sunday, so the week starts that day
        let (start, end) = period_bounds(Timeframe::Week, at("2025-06-08T16:39:28Z"));

        assert_eq!(start, at("2025-06-08T00:00:00Z"));
        assert_eq!(end, at("2025-06-14T23:59:59.999Z"));
    }

    #[test]
    fn test_week_mid_week() {
        // Wednesday falls back to the previous Sunday
        let (start, end) = period_bounds(Timeframe::Week, at("2025-06-11T08:00:00Z"));

        assert_eq!(start, at("2025-06-08T00:00:00Z"));
        assert_eq!(end, at("2025-06-14T23:59:59.999Z"));
    }

    #[test]
    fn test_month_bounds() {
        let (start, end) = period_bounds(Timeframe::Month, at("2025-02-14T12:00:00Z"));

        assert_eq!(start, at("2025-02-01T00:00:00Z"));
        assert_eq!(end, at("2025-02-28T23:59:59.999Z"));
    }

    #[test]
    fn test_month_bounds_leap_year() {
        let (start, end) = period_bounds(Timeframe::Month, at("2024-02-14T12:00:00Z"));

        assert_eq!(start, at("2024-02-01T00:00:00Z"));
        assert_eq!(end, at("2024-02-29T23:59:59.999Z"));
    }

    #[test]
    fn test_quarter_bounds() {
        let (start, end) = period_bounds(Timeframe::Quarter, at("2025-06-08T16:39:28Z"));

        assert_eq!(start, at("2025-04-01T00:00:00Z"));
        assert_eq!(end, at("2025-06-30T23:59:59.999Z"));
    }

    #[test]
    fn test_fourth_quarter_reaches_year_end() {
        let (start, end) = period_bounds(Timeframe::Quarter, at("2025-11-03T00:00:00Z"));

        assert_eq!(start, at("2025-10-01T00:00:00Z"));
        assert_eq!(end, at("2025-12-31T23:59:59.999Z"));
    }

    #[test]
    fn test_year_bounds() {
        let (start, end) = period_bounds(Timeframe::Year, at("2025-06-08T16:39:28Z"));

        assert_eq!(start, at("2025-01-01T00:00:00Z"));
        assert_eq!(end, at("2025-12-31T23:59:59.999Z"));
    }

    #[test]
    fn test_now_always_inside_bounds() {
        let nows = [
            at("2025-01-01T00:00:00Z"),
            at("2025-06-08T16:39:28Z"),
            at("2025-12-31T23:59:59Z"),
            at("2024-02-29T12:00:00Z"),
        ];

        for now in nows {
            for timeframe in [
                Timeframe::Week,
                Timeframe::Month,
                Timeframe::Quarter,
                Timeframe::Year,
            ] {
                let (start, end) = period_bounds(timeframe, now);
                assert!(start <= now && now <= end, "{:?} at {}", timeframe, now);
            }
        }
    }

    #[test]
    fn test_week_spans_seven_days() {
        let (start, end) = period_bounds(Timeframe::Week, Utc.with_ymd_and_hms(2025, 3, 5, 9, 30, 0).unwrap());
        let span = end - start;

        assert_eq!(span.num_days(), 6);
        assert_eq!(span.num_milliseconds() % (24 * 3600 * 1000), 24 * 3600 * 1000 - 1);
    }
}
