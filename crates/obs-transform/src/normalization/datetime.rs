//! Attendance date parsing.
//!
//! Accepts ISO 8601 dates and date-times (with `T` or a space, optional
//! seconds, fractional seconds and offset) and slash dates. Slash dates are
//! ambiguous, so [`DateOrder`] decides whether `03/04/2024` is 3 April or
//! 4 March. Anything else is unparseable and yields `None`.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Field order of slash-separated dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOrder {
    /// `DD/MM/YYYY`
    #[default]
    DayFirst,
    /// `MM/DD/YYYY`
    MonthFirst,
}

impl DateOrder {
    fn date_format(self) -> &'static str {
        match self {
            DateOrder::DayFirst => "%d/%m/%Y",
            DateOrder::MonthFirst => "%m/%d/%Y",
        }
    }
}

const ISO_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const ISO_DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Parses a date or date-time. Date-only values get midnight.
pub fn parse_datetime(value: &str, order: DateOrder) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    try_parse(trimmed, order).filter(|dt| (1000..=9999).contains(&dt.year()))
}

/// Parses a value down to its calendar day.
pub fn parse_date(value: &str, order: DateOrder) -> Option<NaiveDate> {
    parse_datetime(value, order).map(|dt| dt.date())
}

fn try_parse(value: &str, order: DateOrder) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }

    for format in ISO_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }
    for format in ISO_DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(value, format) {
            return Some(d.and_time(NaiveTime::MIN));
        }
    }

    let date_format = order.date_format();
    for suffix in [" %H:%M:%S", " %H:%M"] {
        let format = format!("{date_format}{suffix}");
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, &format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(value, date_format)
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}
