//! Calendar helpers for schedule materialization.
//!
//! Thin adapters over chrono: weekday naming, ceil-based week-of-month,
//! and inclusive date iteration.

use crate::types::Weekday;
use chrono::{Datelike, NaiveDate};

/// Weekday of a date, as the domain enum
pub fn weekday_of(date: NaiveDate) -> Weekday {
    Weekday::from(date.weekday())
}

/// Week-of-month as `ceil(day_of_month / 7)`, in 1..=5
///
/// Day 1-7 is week 1, day 8-14 week 2, and so on; days 29-31 land in
/// week 5, which monthly patterns never define.
pub fn week_of_month(date: NaiveDate) -> u8 {
    ((date.day() + 6) / 7) as u8
}

/// Every calendar date from `start` to `end`, inclusive, ascending
///
/// Empty when `start > end`; callers that must reject inverted ranges do so
/// before iterating.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}
