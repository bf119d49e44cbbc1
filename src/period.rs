// src/period.rs
use chrono::{Datelike, Duration, Local, NaiveDate};

/// A resolved reporting window: a single day for the daily and week-start
/// checks, an inclusive date range for the weekly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportingPeriod {
    Day(NaiveDate),
    Range { from: NaiveDate, to: NaiveDate },
}

impl ReportingPeriod {
    pub fn start(&self) -> NaiveDate {
        match self {
            ReportingPeriod::Day(date) => *date,
            ReportingPeriod::Range { from, .. } => *from,
        }
    }

    pub fn end(&self) -> NaiveDate {
        match self {
            ReportingPeriod::Day(date) => *date,
            ReportingPeriod::Range { to, .. } => *to,
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Daily check window. Defaults to yesterday.
pub fn daily(reference: Option<NaiveDate>) -> ReportingPeriod {
    ReportingPeriod::Day(reference.unwrap_or_else(|| today() - Duration::days(1)))
}

/// Monday-morning check window: the last workday of the previous week.
pub fn week_start(reference: Option<NaiveDate>) -> ReportingPeriod {
    ReportingPeriod::Day(prior_friday(reference.unwrap_or_else(today)))
}

/// Weekly check window. Defaults to the first five days (Mon-Fri) of the
/// previous calendar week; an explicit `from` without `to` keeps the
/// five-day span.
pub fn weekly(from: Option<NaiveDate>, to: Option<NaiveDate>) -> ReportingPeriod {
    let from = from.unwrap_or_else(|| previous_week_monday(today()));
    let to = to.unwrap_or(from + Duration::days(4));
    ReportingPeriod::Range { from, to }
}

/// The Friday preceding the upcoming Monday, so a Monday-morning check
/// looks back at the prior work-week's last day. Weekday numbering here is
/// Sunday = 0 .. Saturday = 6.
pub fn prior_friday(date: NaiveDate) -> NaiveDate {
    let days_before = (date.weekday().num_days_from_sunday() + 1) % 7 + 1;
    date - Duration::days(i64::from(days_before))
}

/// Monday of the week before the week containing `today`.
pub fn previous_week_monday(today: NaiveDate) -> NaiveDate {
    let this_monday = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
    this_monday - Duration::days(7)
}
