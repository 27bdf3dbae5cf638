//! Reporting interval expressions: `all`, `today`, `month`, `12h`, `7d`,
//! `20240101-20240131`

use crate::error::{RegfishError, Result};
use crate::model::TIMESTAMP_FORMAT;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeDelta, TimeZone};
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

/// Start of the `all` interval, sorts before every real timestamp
pub const ALL_START: &str = "0000/00/00 00:00:00";

lazy_static! {
    static ref RELATIVE: Regex = Regex::new(r"^(\d+)([hd])$").unwrap();
    static ref DATE_RANGE: Regex = Regex::new(r"^(\d{8})-(\d{8})$").unwrap();
}

/// Half-open `[start, end)` range of formatted timestamps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval {
    pub start: String,
    pub end: String,
}

impl Interval {
    /// Formatted timestamps compare chronologically as plain strings
    pub fn contains(&self, timestamp: &str) -> bool {
        self.start.as_str() <= timestamp && timestamp < self.end.as_str()
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}

/// A parsed interval expression, in local time and in UTC
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalSpec {
    pub expression: String,
    pub local: Interval,
    pub utc: Interval,
}

/// Parse an interval expression relative to `now`.
///
/// Day boundaries are taken in the time zone of `now`.
pub fn parse_interval<Tz: TimeZone>(expression: &str, now: &DateTime<Tz>) -> Result<IntervalSpec> {
    let expr = expression.trim().to_lowercase();
    let invalid = || RegfishError::Interval(expression.to_string());
    let tz = now.timezone();

    if expr == "all" {
        return Ok(IntervalSpec {
            expression: expression.to_string(),
            local: Interval {
                start: ALL_START.to_string(),
                end: format_local(now),
            },
            utc: Interval {
                start: ALL_START.to_string(),
                end: format_utc(now),
            },
        });
    }

    let (start, end) = if expr == "today" {
        let midnight = now.date_naive().and_hms_opt(0, 0, 0).ok_or_else(invalid)?;
        (local_time(&tz, midnight).ok_or_else(invalid)?, now.clone())
    } else if expr == "month" {
        let first = now
            .date_naive()
            .with_day(1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .ok_or_else(invalid)?;
        (local_time(&tz, first).ok_or_else(invalid)?, now.clone())
    } else if let Some(caps) = RELATIVE.captures(&expr) {
        let n: i64 = caps[1].parse().map_err(|_| invalid())?;
        let delta = match &caps[2] {
            "h" => TimeDelta::try_hours(n),
            _ => TimeDelta::try_days(n),
        }
        .ok_or_else(invalid)?;
        let start = now.clone().checked_sub_signed(delta).ok_or_else(invalid)?;
        (start, now.clone())
    } else if let Some(caps) = DATE_RANGE.captures(&expr) {
        let first = parse_day(&caps[1]).ok_or_else(invalid)?;
        let last = parse_day(&caps[2]).ok_or_else(invalid)?;
        if last < first {
            return Err(invalid());
        }
        let after_last = last.succ_opt().ok_or_else(invalid)?;
        let start = first.and_hms_opt(0, 0, 0).ok_or_else(invalid)?;
        let end = after_last.and_hms_opt(0, 0, 0).ok_or_else(invalid)?;
        (
            local_time(&tz, start).ok_or_else(invalid)?,
            local_time(&tz, end).ok_or_else(invalid)?,
        )
    } else {
        return Err(invalid());
    };

    Ok(IntervalSpec {
        expression: expression.to_string(),
        local: Interval {
            start: format_local(&start),
            end: format_local(&end),
        },
        utc: Interval {
            start: format_utc(&start),
            end: format_utc(&end),
        },
    })
}

fn parse_day(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y%m%d").ok()
}

/// Earliest instant of a local wall-clock time, `None` inside a DST gap
fn local_time<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&naive).earliest()
}

fn format_local<Tz: TimeZone>(dt: &DateTime<Tz>) -> String {
    dt.naive_local().format(TIMESTAMP_FORMAT).to_string()
}

fn format_utc<Tz: TimeZone>(dt: &DateTime<Tz>) -> String {
    dt.naive_utc().format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn now() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 10, 15, 20, 0)
            .unwrap()
    }

    #[test]
    fn test_all() {
        let range = parse_interval("all", &now()).unwrap();
        assert_eq!(range.local.start, ALL_START);
        assert_eq!(range.local.end, "2024/03/10 15:20:00");
        assert_eq!(range.utc.end, "2024/03/10 12:20:00");
        assert!(range.utc.contains("2019/01/01 00:00:00"));
    }

    #[test]
    fn test_today_and_month() {
        let range = parse_interval("today", &now()).unwrap();
        assert_eq!(range.local.start, "2024/03/10 00:00:00");
        assert_eq!(range.utc.start, "2024/03/09 21:00:00");

        let range = parse_interval("Month", &now()).unwrap();
        assert_eq!(range.local.start, "2024/03/01 00:00:00");
        assert_eq!(range.utc.start, "2024/02/29 21:00:00");
    }

    #[test]
    fn test_relative() {
        let range = parse_interval("5h", &now()).unwrap();
        assert_eq!(range.local.start, "2024/03/10 10:20:00");
        assert_eq!(range.utc.start, "2024/03/10 07:20:00");

        let range = parse_interval("2d", &now()).unwrap();
        assert_eq!(range.local.start, "2024/03/08 15:20:00");
    }

    #[test]
    fn test_date_range_is_end_inclusive() {
        let range = parse_interval("20240301-20240309", &now()).unwrap();
        assert_eq!(range.local.start, "2024/03/01 00:00:00");
        assert_eq!(range.local.end, "2024/03/10 00:00:00");
        assert_eq!(range.utc.start, "2024/02/29 21:00:00");
        assert_eq!(range.utc.end, "2024/03/09 21:00:00");

        assert!(range.utc.contains("2024/03/09 20:59:59"));
        assert!(!range.utc.contains("2024/03/09 21:00:00"));
    }

    #[test]
    fn test_invalid() {
        for expr in ["yesterday", "h", "20240301", "20240310-20240301", "20241301-20241302"] {
            assert!(
                matches!(parse_interval(expr, &now()), Err(RegfishError::Interval(_))),
                "{}",
                expr
            );
        }
    }
}
