//! Arch Linux pacman log parser.
//!
//! Lines look like `[2024-01-01T10:00:00+0100] [ALPM] upgraded foo (1.0 -> 2.0)`.
//! Older logs use `[2016-01-01 10:00] [PACMAN] ...` in local time.

use chrono::{DateTime, NaiveDateTime};

use super::{LogParser, local_from_zoned};
use crate::action::ActionKind;
use crate::event::PackageChange;

const LINE_TYPES: [&str; 2] = ["[ALPM]", "[PACMAN]"];

/// Parser for `/var/log/pacman.log`.
#[derive(Debug, Default)]
pub struct PacmanParser {
    /// Message part of the last timestamped line.
    message: Option<String>,
}

impl LogParser for PacmanParser {
    fn get_time(&mut self, line: &str) -> Option<NaiveDateTime> {
        // Pacman log sometimes has stray leading nulls
        let line = line.trim_start_matches(['\0', ' ']);

        let (stamp, rest) = line.strip_prefix('[')?.split_once(']')?;
        let (line_type, message) = rest.trim_start().split_once(char::is_whitespace)?;
        if !LINE_TYPES.contains(&line_type) {
            return None;
        }

        let timestamp = parse_timestamp(stamp.trim())?;
        self.message = Some(message.trim().to_string());
        Some(timestamp)
    }

    fn get_packages(&mut self) -> Vec<PackageChange> {
        let Some(message) = self.message.take() else {
            return Vec::new();
        };

        let mut parts = message.splitn(3, ' ');
        let (Some(action), Some(package), Some(version)) = (parts.next(), parts.next(), parts.next())
        else {
            return Vec::new();
        };

        let Ok(action) = action.parse::<ActionKind>() else {
            tracing::trace!(%message, "ignoring pacman message");
            return Vec::new();
        };

        let Some(version) = version.strip_prefix('(').and_then(|v| v.strip_suffix(')')) else {
            return Vec::new();
        };

        vec![PackageChange::new(action, package, version)]
    }
}

fn parse_timestamp(stamp: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_str(stamp, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(local_from_zoned(dt));
    }

    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
        .into_iter()
        .find_map(|format| NaiveDateTime::parse_from_str(stamp, format).ok())
}
