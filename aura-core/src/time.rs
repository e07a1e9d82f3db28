//! Time utilities: calendar-day normalization and display.
//!
//! Every scheduling computation works on whole days. Timestamps entering the
//! core are collapsed to their date component before any comparison.

use anyhow::Result;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;

/// Strip the time of day from a naive local timestamp.
pub fn normalize_naive(ts: NaiveDateTime) -> NaiveDate {
    ts.date()
}

/// Parse a user supplied date.
///
/// Accepts `2024-01-31`, `2024-01-31 18:30`, `2024-01-31 18:30:00` or an
/// RFC3339 timestamp. Any time of day is discarded.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();

    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(normalize_naive(ndt));
        }
    }

    Err(anyhow::anyhow!(
        "invalid date '{s}': expected YYYY-MM-DD or an RFC3339 timestamp"
    ))
}

/// Today's calendar date in an IANA timezone like "America/Chicago".
pub fn today_in(tz: &str, now_utc: DateTime<Utc>) -> Result<NaiveDate> {
    let tz: Tz = tz
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))?;
    Ok(now_utc.with_timezone(&tz).date_naive())
}

/// Display format used in listings and logs: `D-M-YYYY`, no zero padding.
pub fn format_date(d: NaiveDate) -> String {
    format!("{}-{}-{}", d.day(), d.month(), d.year())
}

/// Whole days from `a` to `b` (negative when `b` is earlier).
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days()
}
