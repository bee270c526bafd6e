use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::domain::{ViewMode, ViewWindow};
use crate::error::TimelineError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Computes the visible window for `anchor`.
///
/// Week windows start on `first_day_of_week` and span seven days. Month
/// windows run from the first to the last day of the anchor's month.
pub fn compute_window(anchor: NaiveDate, mode: ViewMode, first_day_of_week: Weekday) -> ViewWindow {
    match mode {
        ViewMode::Week => {
            let start = start_of_week(anchor, first_day_of_week);
            ViewWindow {
                start,
                end: start + Duration::days(6),
            }
        }
        ViewMode::Month => {
            let start = first_day_of_month(anchor);
            let end = NaiveDate::from_ymd_opt(
                anchor.year(),
                anchor.month(),
                days_in_month(anchor.year(), anchor.month()),
            )
            .expect("last day of month must be valid");
            ViewWindow { start, end }
        }
    }
}

pub fn parse_date(input: &str) -> Result<NaiveDate, TimelineError> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).map_err(|_| TimelineError::InvalidDate {
        input: input.to_string(),
    })
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn start_of_week(day: NaiveDate, first_day_of_week: Weekday) -> NaiveDate {
    let weekday = day.weekday().num_days_from_monday() as i64;
    let first = first_day_of_week.num_days_from_monday() as i64;
    let offset = (weekday - first + 7) % 7;
    day - Duration::days(offset)
}

pub fn first_day_of_month(day: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(day.year(), day.month(), 1).expect("first day of month must be valid")
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1).expect("next year date should be valid")
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1).expect("next month date should be valid")
    };
    (first_of_next - Duration::days(1)).day()
}

/// Moves `day` by `delta` calendar months, falling back to the last day of the
/// target month when the day-of-month does not exist there.
pub fn shift_month(day: NaiveDate, delta: i32) -> NaiveDate {
    let mut year = day.year();
    let mut month = day.month() as i32 + delta;
    while month > 12 {
        year += 1;
        month -= 12;
    }
    while month < 1 {
        year -= 1;
        month += 12;
    }
    let month_u32 = month as u32;
    let max_day = days_in_month(year, month_u32);
    let target_day = day.day().min(max_day);
    NaiveDate::from_ymd_opt(year, month_u32, target_day).expect("shifted month date must be valid")
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, NaiveDate, Weekday};

    use super::{compute_window, parse_date, shift_month, start_of_week};
    use crate::domain::ViewMode;
    use crate::error::TimelineError;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_window_starts_on_sunday_by_default() {
        let window = compute_window(day(2024, 1, 10), ViewMode::Week, Weekday::Sun);
        assert_eq!(window.start, day(2024, 1, 7));
        assert_eq!(window.end, day(2024, 1, 13));
    }

    #[test]
    fn week_window_honours_configured_first_day() {
        let window = compute_window(day(2024, 1, 10), ViewMode::Week, Weekday::Mon);
        assert_eq!(window.start, day(2024, 1, 8));
        assert_eq!(window.end, day(2024, 1, 14));
    }

    #[test]
    fn anchor_on_first_day_of_week_is_its_own_start() {
        assert_eq!(start_of_week(day(2024, 1, 7), Weekday::Sun), day(2024, 1, 7));
        assert_eq!(start_of_week(day(2024, 1, 13), Weekday::Sun), day(2024, 1, 7));
    }

    #[test]
    fn week_start_is_always_configured_weekday() {
        let mut anchor = day(2023, 12, 20);
        for _ in 0..30 {
            for first in [Weekday::Sun, Weekday::Mon, Weekday::Sat] {
                let window = compute_window(anchor, ViewMode::Week, first);
                assert_eq!(window.start.weekday(), first);
                assert!(window.contains(anchor));
            }
            anchor = anchor.succ_opt().unwrap();
        }
    }

    #[test]
    fn month_window_covers_leap_february() {
        let window = compute_window(day(2024, 2, 15), ViewMode::Month, Weekday::Sun);
        assert_eq!(window.start, day(2024, 2, 1));
        assert_eq!(window.end, day(2024, 2, 29));
    }

    #[test]
    fn month_window_handles_december() {
        let window = compute_window(day(2023, 12, 31), ViewMode::Month, Weekday::Sun);
        assert_eq!(window.start, day(2023, 12, 1));
        assert_eq!(window.end, day(2023, 12, 31));
    }

    #[test]
    fn shift_month_clamps_to_last_valid_day() {
        assert_eq!(shift_month(day(2024, 1, 31), 1), day(2024, 2, 29));
        assert_eq!(shift_month(day(2023, 1, 31), 1), day(2023, 2, 28));
        assert_eq!(shift_month(day(2024, 3, 31), -1), day(2024, 2, 29));
        assert_eq!(shift_month(day(2024, 12, 15), 1), day(2025, 1, 15));
        assert_eq!(shift_month(day(2024, 1, 15), -1), day(2023, 12, 15));
    }

    #[test]
    fn parse_date_fails_fast_on_garbage() {
        assert_eq!(parse_date("2024-01-10"), Ok(day(2024, 1, 10)));
        assert_eq!(
            parse_date("2024-02-30"),
            Err(TimelineError::InvalidDate {
                input: "2024-02-30".to_string()
            })
        );
        assert!(parse_date("next tuesday").is_err());
    }
}
