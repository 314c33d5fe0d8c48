//! RedHat/Fedora DNF rpm log parser.
//!
//! Each package change is one line:
//!
//! ```text
//! 2024-01-01T10:00:00+0000 SUBDEBUG Upgrade: foo-2.0-1.fc39.x86_64
//! 2024-01-01T10:00:01+0000 SUBDEBUG Upgraded: foo-1.0-1.fc39.x86_64
//! ```
//!
//! The incoming side of an upgrade or downgrade is logged first and is
//! remembered until the outgoing side completes the change.

use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime};
use regex::Regex;

use super::{LogParser, local_from_zoned, split_fields};
use crate::action::ActionKind;
use crate::event::{PackageChange, version_delta};

/// Splits `name-version-release` at the first `-` followed by a digit.
static NAME_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)-(\d.*)$").expect("valid regex"));

/// Parser for `/var/log/dnf.rpm.log`.
#[derive(Debug, Default)]
pub struct DnfParser {
    /// Incoming versions of packages being upgraded or downgraded.
    incoming: HashMap<String, String>,
    pending: Option<PackageChange>,
}

impl LogParser for DnfParser {
    fn get_time(&mut self, line: &str) -> Option<NaiveDateTime> {
        let fields = split_fields(line, 3);
        let [stamp, key, verb, nevra] = fields.as_slice() else {
            return None;
        };

        if *key != "SUBDEBUG" {
            return None;
        }

        let verb = verb.strip_suffix(':').unwrap_or(*verb);
        let nevr = nevra.rsplit_once('.').map_or(*nevra, |(nevr, _arch)| nevr);
        let caps = NAME_VERSION_RE.captures(nevr)?;
        let (package, version) = (&caps[1], &caps[2]);

        let (action, changes_version) = match verb {
            "Upgraded" => (ActionKind::Upgraded, true),
            "Downgraded" => (ActionKind::Downgraded, true),
            "Installed" => (ActionKind::Installed, false),
            "Erase" => (ActionKind::Removed, false),
            "Reinstalled" => (ActionKind::Reinstalled, false),
            _ => {
                self.incoming
                    .insert(package.to_string(), version.to_string());
                return None;
            }
        };

        let timestamp = parse_timestamp(stamp)?;

        let version = if changes_version {
            let new = self.incoming.remove(package);
            version_delta(version, new.as_deref().unwrap_or("?"))
        } else {
            version.to_string()
        };

        self.pending = Some(PackageChange::new(action, package, version));
        Some(timestamp)
    }

    fn get_packages(&mut self) -> Vec<PackageChange> {
        self.pending.take().into_iter().collect()
    }
}

fn parse_timestamp(stamp: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(stamp)
        .or_else(|_| DateTime::parse_from_str(stamp, "%Y-%m-%dT%H:%M:%S%z"))
        .ok()
        .map(local_from_zoned)
}
