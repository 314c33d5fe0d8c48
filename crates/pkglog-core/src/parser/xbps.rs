//! Void Linux xbps parser for the socklog stream.
//!
//! socklog prefixes every syslog message with a UTC timestamp:
//!
//! ```text
//! 2024-03-01T10:15:29.01234 user.notice: Mar  1 10:15:29 xbps-install: foo-1.0_1: updating to 1.1_1 ...
//! 2024-03-01T10:15:30.12345 user.notice: Mar  1 10:15:30 xbps-install: Updated `foo-1.1_1' successfully (rootdir: /).
//! ```

use std::collections::HashMap;

use chrono::NaiveDateTime;

use super::{LogParser, compared_change, local_from_utc, split_fields};
use crate::action::ActionKind;
use crate::event::PackageChange;

/// Parser for `/var/log/socklog/xbps/current`.
#[derive(Debug, Default)]
pub struct XbpsParser {
    /// Version a package had before its pending update.
    previous: HashMap<String, String>,
    /// Currently installed version of each package.
    installed: HashMap<String, String>,
    pending: Option<PackageChange>,
}

impl LogParser for XbpsParser {
    fn get_time(&mut self, line: &str) -> Option<NaiveDateTime> {
        let fields = split_fields(line, 9);
        if fields.len() < 10 {
            return None;
        }

        if fields[7] == "updating" {
            if fields[8] == "to" {
                if let Some((package, version)) = fields[6]
                    .strip_suffix(':')
                    .and_then(|pv| pv.rsplit_once('-'))
                {
                    self.previous
                        .insert(package.to_string(), version.to_string());
                }
            }
            return None;
        }

        if fields[8] != "successfully" {
            return None;
        }

        let func = fields[6];
        if !matches!(func, "Installed" | "Updated" | "Removed") {
            return None;
        }
        let (package, version) = unquote(fields[7])?.rsplit_once('-')?;
        let timestamp = parse_timestamp(line)?;

        let change = match func {
            "Installed" => match self
                .installed
                .insert(package.to_string(), version.to_string())
            {
                Some(old) => compared_change(package, &old, version),
                None => PackageChange::new(ActionKind::Installed, package, version),
            },
            "Updated" => {
                let old = self.previous.remove(package);
                self.installed
                    .insert(package.to_string(), version.to_string());
                compared_change(package, old.as_deref().unwrap_or("?"), version)
            }
            _ => {
                self.installed.remove(package);
                PackageChange::new(ActionKind::Removed, package, version)
            }
        };

        self.pending = Some(change);
        Some(timestamp)
    }

    fn get_packages(&mut self) -> Vec<PackageChange> {
        self.pending.take().into_iter().collect()
    }
}

/// Strips the quote characters around `` `pkg-ver' ``.
fn unquote(s: &str) -> Option<&str> {
    let mut chars = s.chars();
    chars.next()?;
    chars.next_back()?;
    Some(chars.as_str())
}

/// The first 19 characters are the UTC time of the message.
fn parse_timestamp(line: &str) -> Option<NaiveDateTime> {
    let stamp = line.get(..19)?;
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .into_iter()
        .find_map(|format| NaiveDateTime::parse_from_str(stamp, format).ok())
        .map(local_from_utc)
}
