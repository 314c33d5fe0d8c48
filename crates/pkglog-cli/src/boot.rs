//! Last system boot time, from the kernel's uptime counter.

use std::fs;
use std::path::Path;

use chrono::{Duration, NaiveDateTime};

pub const UPTIME_PATH: &str = "/proc/uptime";

/// Returns the local time of the last boot, or `None` when uptime can't be
/// read.
pub fn boot_time(now: NaiveDateTime) -> Option<NaiveDateTime> {
    boot_time_from(Path::new(UPTIME_PATH), now)
}

fn boot_time_from(path: &Path, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "can not read system uptime");
            return None;
        }
    };

    let Some(uptime) = parse_uptime(&content) else {
        tracing::debug!(content = %content.trim(), "unrecognized uptime format");
        return None;
    };

    let boot = now.checked_sub_signed(uptime)?;
    tracing::debug!(%boot, "last system boot");
    Some(boot)
}

/// Parses the first field of `/proc/uptime`, the seconds since boot.
#[expect(
    clippy::cast_possible_truncation,
    reason = "uptime is rounded to whole milliseconds"
)]
fn parse_uptime(content: &str) -> Option<Duration> {
    let seconds: f64 = content.split_whitespace().next()?.parse().ok()?;
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    Duration::try_milliseconds((seconds * 1000.0).round() as i64)
}
