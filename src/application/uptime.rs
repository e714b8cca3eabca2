//! # Uptime
//!
//! Calendar-aware difference between two instants, borrowing from the next larger unit
//! whenever a component goes negative.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Timelike};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UptimeDiff {
    pub years: i32,
    pub months: i32,
    pub days: i32,
    pub hours: i32,
    pub minutes: i32,
    pub seconds: i32,
}

/// Difference between `a` and `b`, in either order.
///
/// Components are compared pointwise, then normalised from seconds upward. A negative
/// day count borrows the length of the month `a` falls in.
pub fn uptime_diff<Tz: TimeZone>(a: DateTime<Tz>, b: DateTime<Tz>) -> UptimeDiff {
    let (a, b) = if a > b {
        (b.naive_local(), a.naive_local())
    } else {
        (a.naive_local(), b.naive_local())
    };

    let mut years = b.year() - a.year();
    let mut months = b.month() as i32 - a.month() as i32;
    let mut days = b.day() as i32 - a.day() as i32;
    let mut hours = b.hour() as i32 - a.hour() as i32;
    let mut minutes = b.minute() as i32 - a.minute() as i32;
    let mut seconds = b.second() as i32 - a.second() as i32;

    if seconds < 0 {
        seconds += 60;
        minutes -= 1;
    }
    if minutes < 0 {
        minutes += 60;
        hours -= 1;
    }
    if hours < 0 {
        hours += 24;
        days -= 1;
    }
    if days < 0 {
        days += days_in_month(a.year(), a.month());
        months -= 1;
    }
    if months < 0 {
        months += 12;
        years -= 1;
    }

    UptimeDiff {
        years,
        months,
        days,
        hours,
        minutes,
        seconds,
    }
}

fn days_in_month(year: i32, month: u32) -> i32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day() as i32)
        .unwrap_or(30)
}
