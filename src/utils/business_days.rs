use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::BTreeSet;

/// Number of dates returned by [`national_holidays`] for any year.
pub const HOLIDAYS_PER_YEAR: usize = 11;

/// n-th (1-based) occurrence of `weekday` in the given month.
pub fn nth_weekday_of_month(year: i32, month: u32, weekday: Weekday, n: u8) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, month, weekday, n)
}

/// Last occurrence of `weekday` in the given month.
pub fn last_weekday_of_month(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };

    let mut day = first_of_next.pred_opt()?;
    while day.weekday() != weekday {
        day = day.pred_opt()?;
    }
    Some(day)
}

/// National (US federal) holidays for `year`.
///
/// Fixed-date holidays are returned on their calendar date, without
/// observed-day shifting, so every date lies inside `year`.
pub fn national_holidays(year: i32) -> BTreeSet<NaiveDate> {
    let fixed = [(1, 1), (6, 19), (7, 4), (11, 11), (12, 25)]
        .into_iter()
        .filter_map(|(month, day)| NaiveDate::from_ymd_opt(year, month, day));

    let floating = [
        // Martin Luther King Jr. Day
        nth_weekday_of_month(year, 1, Weekday::Mon, 3),
        // Presidents' Day
        nth_weekday_of_month(year, 2, Weekday::Mon, 3),
        // Memorial Day
        last_weekday_of_month(year, 5, Weekday::Mon),
        // Labor Day
        nth_weekday_of_month(year, 9, Weekday::Mon, 1),
        // Columbus Day
        nth_weekday_of_month(year, 10, Weekday::Mon, 2),
        // Thanksgiving
        nth_weekday_of_month(year, 11, Weekday::Thu, 4),
    ]
    .into_iter()
    .flatten();

    fixed.chain(floating).collect()
}

/// Holidays for every distinct year touched by [start, end].
pub fn holidays_between(start: NaiveDate, end: NaiveDate) -> BTreeSet<NaiveDate> {
    if start > end {
        return BTreeSet::new();
    }
    (start.year()..=end.year())
        .flat_map(national_holidays)
        .collect()
}

#[inline]
fn is_weekend(date: &NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Counts days in the inclusive range [start, end] that are neither a
/// weekend day nor contained in `holidays`. Returns 0 when start > end.
pub fn business_days_between(
    start: NaiveDate,
    end: NaiveDate,
    holidays: &BTreeSet<NaiveDate>,
) -> u32 {
    if start > end {
        return 0;
    }

    start
        .iter_days()
        .take_while(|day| *day <= end)
        .filter(|day| !is_weekend(day) && !holidays.contains(day))
        .count() as u32
}

/// Business days in [start, end] using the national holidays of each year
/// the range covers.
pub fn business_days(start: NaiveDate, end: NaiveDate) -> u32 {
    business_days_between(start, end, &holidays_between(start, end))
}
