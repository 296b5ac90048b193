//! Posting-date normalization and the trailing-day acceptance window.
//!
//! Listing cards carry free-form text such as `"3d ago"`, `"14 Mar"` or
//! `"Just now"`. [`resolve_posted_date`] turns that text into a calendar
//! date relative to a fixed instant, and [`in_window`] decides whether the
//! date is recent enough to keep.
//!
//! When the text holds several date-like fragments only the first one in
//! scan order is used.

use std::sync::LazyLock;

use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime, TimeDelta};
use regex::Regex;

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Relative (`<n><unit> ago`) or absolute (`<day> <Mon>`) fragment; whichever
/// starts first wins.
static POSTED_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?P<value>\d+)\s*(?P<unit>[hdwm])\s*ago|(?P<day>\d+)\s*(?P<month>jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)",
    )
    .expect("valid posted-date regex")
});

/// Outcome of resolving a raw "posted" text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedDate {
    On(NaiveDate),
    Unresolvable,
}

impl ResolvedDate {
    pub fn date(self) -> Option<NaiveDate> {
        match self {
            ResolvedDate::On(date) => Some(date),
            ResolvedDate::Unresolvable => None,
        }
    }

    pub fn is_resolved(self) -> bool {
        matches!(self, ResolvedDate::On(_))
    }
}

impl From<Option<NaiveDate>> for ResolvedDate {
    fn from(date: Option<NaiveDate>) -> Self {
        date.map_or(ResolvedDate::Unresolvable, ResolvedDate::On)
    }
}

/// Resolves raw posted text into a calendar date relative to `now`.
pub fn resolve_posted_date(raw: &str, now: NaiveDateTime) -> ResolvedDate {
    let text = raw.trim();
    if text.is_empty() {
        return ResolvedDate::Unresolvable;
    }

    let lowered = text.to_lowercase();
    if lowered.contains("just now") || lowered == "today" {
        return ResolvedDate::On(now.date());
    }

    let Some(caps) = POSTED_PATTERN.captures(text) else {
        return ResolvedDate::Unresolvable;
    };

    if let (Some(value), Some(unit)) = (caps.name("value"), caps.name("unit")) {
        return resolve_relative(value.as_str(), unit.as_str(), now).into();
    }

    match (caps.name("day"), caps.name("month")) {
        (Some(day), Some(month)) => resolve_absolute(day.as_str(), month.as_str(), now).into(),
        _ => ResolvedDate::Unresolvable,
    }
}

fn resolve_relative(value: &str, unit: &str, now: NaiveDateTime) -> Option<NaiveDate> {
    let value: u32 = value.parse().ok()?;
    match unit.to_ascii_lowercase().as_str() {
        "h" => {
            let delta = TimeDelta::try_hours(i64::from(value))?;
            now.checked_sub_signed(delta).map(|dt| dt.date())
        }
        "d" => now.date().checked_sub_days(Days::new(u64::from(value))),
        "w" => now
            .date()
            .checked_sub_days(Days::new(u64::from(value) * 7)),
        "m" => now.date().checked_sub_months(Months::new(value)),
        _ => None,
    }
}

fn resolve_absolute(day: &str, month: &str, now: NaiveDateTime) -> Option<NaiveDate> {
    let day: u32 = day.parse().ok()?;
    let month = month.to_ascii_lowercase();
    let month_index = MONTHS.iter().position(|m| *m == month)?;
    let month = u32::try_from(month_index).ok()? + 1;

    let today = now.date();
    // "14 Mar" seen in January, or "29 Feb" seen in a non-leap year,
    // refers to last year.
    match NaiveDate::from_ymd_opt(today.year(), month, day) {
        Some(date) if date <= today => Some(date),
        _ => NaiveDate::from_ymd_opt(today.year() - 1, month, day),
    }
}

/// Returns true if `date` falls in `[today - days_back, today]`.
///
/// Unresolvable dates are never in the window.
pub fn in_window(date: ResolvedDate, days_back: u32, today: NaiveDate) -> bool {
    let Some(date) = date.date() else {
        return false;
    };
    let cutoff = today
        .checked_sub_days(Days::new(u64::from(days_back)))
        .unwrap_or(NaiveDate::MIN);
    date >= cutoff && date <= today
}
