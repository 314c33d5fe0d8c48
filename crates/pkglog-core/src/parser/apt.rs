//! Debian/Ubuntu APT history parser.
//!
//! An entry in `history.log` spans several lines:
//!
//! ```text
//! Start-Date: 2024-01-01  10:00:00
//! Commandline: apt upgrade
//! Install: libfoo:amd64 (1.2-1, automatic)
//! Upgrade: foo:amd64 (1.0, 2.0), bar:amd64 (3.1, 3.2)
//! End-Date: 2024-01-01  10:00:05
//! ```
//!
//! Action lines are collected until `End-Date`, which carries the timestamp.

use chrono::NaiveDateTime;

use super::LogParser;
use crate::action::ActionKind;
use crate::event::PackageChange;

/// Parser for `/var/log/apt/history.log`.
#[derive(Debug, Default)]
pub struct AptParser {
    /// Action lines seen since `Start-Date`.
    pending: Vec<(ActionKind, String)>,
}

fn action_for(key: &str) -> Option<ActionKind> {
    match key {
        "Install" => Some(ActionKind::Installed),
        "Remove" | "Purge" => Some(ActionKind::Removed),
        "Upgrade" => Some(ActionKind::Upgraded),
        "Downgrade" => Some(ActionKind::Downgraded),
        "Reinstall" => Some(ActionKind::Reinstalled),
        _ => None,
    }
}

impl LogParser for AptParser {
    fn get_time(&mut self, line: &str) -> Option<NaiveDateTime> {
        let (key, rest) = line.split_once(':')?;

        match key {
            "Start-Date" => {
                self.pending.clear();
                None
            }
            "End-Date" => {
                let stamp = rest.trim().replace("  ", " ");
                NaiveDateTime::parse_from_str(&stamp, "%Y-%m-%d %H:%M:%S").ok()
            }
            _ => {
                if let Some(action) = action_for(key) {
                    self.pending.push((action, rest.trim().to_string()));
                }
                None
            }
        }
    }

    fn get_packages(&mut self) -> Vec<PackageChange> {
        self.pending
            .drain(..)
            .flat_map(|(action, list)| parse_package_list(action, &list))
            .collect()
    }
}

/// Parses `name:arch (version[, version][, automatic]), ...`.
fn parse_package_list(action: ActionKind, list: &str) -> Vec<PackageChange> {
    list.split("),")
        .filter_map(|entry| {
            let (package, version) = entry.trim().split_once(char::is_whitespace)?;
            let package = package.split(':').next().unwrap_or(package);
            let version = version
                .trim()
                .trim_matches(['(', ')'])
                .replace(", automatic", "")
                .replace(", ", " -> ");
            Some(PackageChange::new(action, package, version))
        })
        .collect()
}
