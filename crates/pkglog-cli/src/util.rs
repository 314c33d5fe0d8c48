//! Parsing helpers for time-related options.

use anyhow::Context;
use chrono::{Days, Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Days reported when neither `--days` nor package names are given.
pub const DEFAULT_DAYS: u64 = 30;

const MILLIS_PER_MINUTE: f64 = 60_000.0;
const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Computes the time before which log transactions are ignored.
///
/// `days` is either a whole number of days before `today` (negative means no
/// cutoff) or a date/time. A time without a date refers to `today`. With no
/// `days`, the cutoff defaults to [`DEFAULT_DAYS`] unless specific packages
/// were asked for.
pub fn compute_start_time(
    days: Option<&str>,
    alldays: bool,
    has_packages: bool,
    today: NaiveDate,
) -> anyhow::Result<Option<NaiveDateTime>> {
    if alldays {
        return Ok(None);
    }

    let days = match days.map(str::trim) {
        Some(value) => match value.parse::<i64>() {
            Ok(n) => n,
            Err(_) => return parse_date_time(value, today).map(Some),
        },
        None if has_packages => return Ok(None),
        None => return days_before(today, DEFAULT_DAYS).map(Some),
    };

    match u64::try_from(days) {
        Ok(days) => days_before(today, days).map(Some),
        Err(_) => Ok(None),
    }
}

fn days_before(today: NaiveDate, days: u64) -> anyhow::Result<NaiveDateTime> {
    let day = today
        .checked_sub_days(Days::new(days))
        .with_context(|| format!("days value {days} is out of range"))?;
    Ok(day.and_time(NaiveTime::MIN))
}

/// Parses `YYYY-MM-DD`, `YYYY-MM-DD?HH:MM[:SS]` or `HH:MM[:SS]` (today).
fn parse_date_time(value: &str, today: NaiveDate) -> anyhow::Result<NaiveDateTime> {
    let text = if value.contains('-') {
        value.to_string()
    } else {
        format!("{today} {value}")
    };

    let parsed = NaiveDate::parse_from_str(&text, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN))
        .ok()
        .or_else(|| {
            // Any single character may separate date and time
            let date = NaiveDate::parse_from_str(text.get(..10)?, "%Y-%m-%d").ok()?;
            let time = text.get(10..)?.chars().skip(1).collect::<String>();
            let time = ["%H:%M:%S", "%H:%M"]
                .into_iter()
                .find_map(|format| NaiveTime::parse_from_str(&time, format).ok())?;
            Some(date.and_time(time))
        });

    parsed.with_context(|| format!("can not parse days value \"{value}\""))
}

/// Converts fractional minutes to a duration.
pub fn minutes(value: f64) -> anyhow::Result<Duration> {
    fractional_duration(value, MILLIS_PER_MINUTE).context("timegap must be a non-negative number")
}

/// Converts fractional days to a duration.
pub fn days(value: f64) -> anyhow::Result<Duration> {
    fractional_duration(value, MILLIS_PER_DAY)
        .context("installed net days must be a non-negative number")
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    reason = "sub-millisecond precision is irrelevant for log grouping"
)]
fn fractional_duration(value: f64, millis_per_unit: f64) -> Option<Duration> {
    let millis = value * millis_per_unit;
    if !millis.is_finite() || millis < 0.0 || millis > i64::MAX as f64 {
        return None;
    }
    Duration::try_milliseconds(millis as i64)
}
