use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::raw::{ParseFailure, RawValue};

/// Date-time layouts without an offset; read as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Calendar-date layouts. Dotted dates are day-first, slashed dates with a
/// trailing year are month-first.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d.%m.%Y",
    "%m/%d/%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
];

/// Normalize a stored date field to a UTC calendar day.
///
/// Numeric values are epoch milliseconds. Use [`canonical`] for the wire form.
pub fn normalize_date(raw: &RawValue) -> Result<NaiveDate, ParseFailure> {
    match raw {
        RawValue::Missing => Err(ParseFailure::Missing),
        RawValue::Numeric(ms) => {
            if !ms.is_finite() {
                return Err(ParseFailure::Invalid);
            }
            DateTime::from_timestamp_millis(*ms as i64)
                .map(|dt| dt.date_naive())
                .ok_or(ParseFailure::Invalid)
        }
        RawValue::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Err(ParseFailure::Missing);
            }
            parse_date_text(s).ok_or(ParseFailure::Invalid)
        }
    }
}

fn parse_date_text(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        })
}

/// Render a canonical date as `YYYY-MM-DD`.
pub fn canonical(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
