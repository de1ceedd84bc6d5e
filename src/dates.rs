use anyhow::{anyhow, Result};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// Format used when writing timestamps back to tables.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const SECONDS_PER_DAY: f64 = 86_400.0;
/// Julian date of 1970-01-01T00:00:00Z.
const UNIX_EPOCH_JULIAN: f64 = 2_440_587.5;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parse the timestamp shapes found in the tables. Naive values are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let s = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.with_timezone(&Utc));
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    Err(anyhow!("unrecognised timestamp: {:?}", raw))
}

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub fn from_epoch_seconds(secs: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| anyhow!("epoch seconds out of range: {}", secs))
}

pub fn julian_date(ts: &DateTime<Utc>) -> f64 {
    day_number(ts) + UNIX_EPOCH_JULIAN
}

/// Fractional days since the unix epoch. This is the x coordinate of every chart.
pub fn day_number(ts: &DateTime<Utc>) -> f64 {
    let millis = ts.timestamp() as f64 * 1000.0 + f64::from(ts.timestamp_subsec_millis());
    millis / (SECONDS_PER_DAY * 1000.0)
}

pub fn from_day_number(days: f64) -> Option<DateTime<Utc>> {
    let millis = (days * SECONDS_PER_DAY * 1000.0).round();
    if !millis.is_finite() {
        return None;
    }
    Utc.timestamp_millis_opt(millis as i64).single()
}

/// 1 January and 1 July boundaries inside `[start, end]`, as day numbers.
pub fn half_year_ticks(start: f64, end: f64) -> Vec<f64> {
    month_ticks(start, end, &[1, 7])
}

/// 1 January boundaries inside `[start, end]`, as day numbers.
pub fn year_ticks(start: f64, end: f64) -> Vec<f64> {
    month_ticks(start, end, &[1])
}

fn month_ticks(start: f64, end: f64, months: &[u32]) -> Vec<f64> {
    let (Some(first), Some(last)) = (from_day_number(start), from_day_number(end)) else {
        return vec![];
    };

    let mut ticks = Vec::new();
    for year in first.year()..=last.year() {
        for &month in months {
            let Some(date) = NaiveDate::from_ymd_opt(year, month, 1) else {
                continue;
            };
            let x = day_number(&date.and_time(NaiveTime::MIN).and_utc());
            if x >= start && x <= end {
                ticks.push(x);
            }
        }
    }
    ticks
}
