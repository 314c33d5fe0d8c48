//! Package change records produced by log parsers.

use chrono::NaiveDateTime;

use crate::action::ActionKind;

/// Format used for timestamps in report lines.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single package change as reported by a parser, before it is timestamped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageChange {
    pub action: ActionKind,
    pub package: String,
    /// Installed version, or `old -> new` for upgrades and downgrades.
    pub version: String,
}

impl PackageChange {
    pub fn new(action: ActionKind, package: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            action,
            package: package.into(),
            version: version.into(),
        }
    }

    /// Attaches the transaction time to this change.
    pub fn at(self, timestamp: NaiveDateTime) -> PackageEvent {
        PackageEvent {
            timestamp,
            action: self.action,
            package: self.package,
            version: self.version,
        }
    }
}

/// A timestamped package change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageEvent {
    /// Local time of the transaction.
    pub timestamp: NaiveDateTime,
    pub action: ActionKind,
    pub package: String,
    pub version: String,
}

/// Formats a version delta the way all parsers report it.
pub fn version_delta(old: &str, new: &str) -> String {
    format!("{old} -> {new}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn change_at_keeps_fields() {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(10, 0, 5)
            .unwrap();
        let event = PackageChange::new(ActionKind::Upgraded, "foo", version_delta("1.0", "2.0")).at(ts);

        assert_eq!(event.timestamp, ts);
        assert_eq!(event.action, ActionKind::Upgraded);
        assert_eq!(event.package, "foo");
        assert_eq!(event.version, "1.0 -> 2.0");
    }
}
