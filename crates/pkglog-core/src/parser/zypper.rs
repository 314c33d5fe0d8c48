//! OpenSUSE zypper history parser.
//!
//! Records are `|`-separated:
//!
//! ```text
//! 2024-01-01 10:00:00|install|foo|1.0-1.1|x86_64|root@host|repo-oss|...|
//! 2024-01-01 10:05:00|remove |foo|1.0-1.1|x86_64|root@host|
//! ```
//!
//! zypper logs every change as an install, so upgrades, downgrades and
//! reinstalls are told apart by comparing with the previously installed
//! version.

use std::collections::HashMap;

use chrono::NaiveDateTime;

use super::{LogParser, compared_change};
use crate::action::ActionKind;
use crate::event::PackageChange;

/// Parser for `/var/log/zypp/history`.
#[derive(Debug, Default)]
pub struct ZypperParser {
    /// Currently installed version of each package.
    installed: HashMap<String, String>,
    pending: Option<PackageChange>,
}

impl LogParser for ZypperParser {
    fn get_time(&mut self, line: &str) -> Option<NaiveDateTime> {
        if line.starts_with('#') {
            return None;
        }

        let fields: Vec<&str> = line.splitn(5, '|').collect();
        let [stamp, func, package, version, ..] = fields.as_slice() else {
            return None;
        };
        let func = func.trim();
        if func != "install" && func != "remove" {
            return None;
        }

        let timestamp = NaiveDateTime::parse_from_str(stamp.trim(), "%Y-%m-%d %H:%M:%S").ok()?;

        let change = if func == "install" {
            match self
                .installed
                .insert((*package).to_string(), (*version).to_string())
            {
                Some(old) => compared_change(package, &old, version),
                None => PackageChange::new(ActionKind::Installed, *package, *version),
            }
        } else {
            self.installed.remove(*package);
            PackageChange::new(ActionKind::Removed, *package, *version)
        };

        self.pending = Some(change);
        Some(timestamp)
    }

    fn get_packages(&mut self) -> Vec<PackageChange> {
        self.pending.take().into_iter().collect()
    }
}
