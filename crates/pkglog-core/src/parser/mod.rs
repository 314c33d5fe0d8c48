//! Package manager log parsers.
//!
//! Each supported package manager has a parser implementing [`LogParser`].
//! The pipeline feeds it one trimmed log line at a time through
//! [`LogParser::get_time`]. When that returns a timestamp, the transaction the
//! line completes is collected with [`LogParser::get_packages`].
//!
//! Parsers never fail: lines they don't understand are skipped.

mod apt;
mod dnf;
mod pacman;
mod xbps;
mod zypper;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::event::{PackageChange, version_delta};
use crate::version::classify_change;

pub use apt::AptParser;
pub use dnf::DnfParser;
pub use pacman::PacmanParser;
pub use xbps::XbpsParser;
pub use zypper::ZypperParser;

/// A stateful translator from log lines to package changes.
pub trait LogParser {
    /// Inspects one trimmed log line.
    ///
    /// Returns the local time of the transaction when the line completes one.
    /// Lines that belong to a transaction but carry no time may be remembered
    /// until the completing line arrives.
    fn get_time(&mut self, line: &str) -> Option<NaiveDateTime>;

    /// Drains the package changes completed by the last timestamped line.
    fn get_packages(&mut self) -> Vec<PackageChange>;
}

/// The supported log formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParserKind {
    Pacman,
    Apt,
    Dnf,
    Zypper,
    Xbps,
}

impl ParserKind {
    /// All parsers in priority order.
    pub const ALL: [Self; 5] = [Self::Pacman, Self::Apt, Self::Dnf, Self::Zypper, Self::Xbps];

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Pacman => "pacman",
            Self::Apt => "apt",
            Self::Dnf => "dnf",
            Self::Zypper => "zypper",
            Self::Xbps => "xbps",
        }
    }

    pub const fn description(&self) -> &'static str {
        match self {
            Self::Pacman => "Parse Arch Linux pacman log messages",
            Self::Apt => "Parse Debian/Ubuntu APT log messages",
            Self::Dnf => "Parse RedHat/Fedora DNF log messages",
            Self::Zypper => "Parse OpenSUSE zypper log format",
            Self::Xbps => "Parse Void Linux xbps log messages",
        }
    }

    /// Default location of this package manager's log.
    pub fn logfile(&self) -> &'static Path {
        Path::new(match self {
            Self::Pacman => "/var/log/pacman.log",
            Self::Apt => "/var/log/apt/history.log",
            Self::Dnf => "/var/log/dnf.rpm.log",
            Self::Zypper => "/var/log/zypp/history",
            Self::Xbps => "/var/log/socklog/xbps/current",
        })
    }

    /// Detection order when picking a default; lower wins.
    pub const fn priority(&self) -> u32 {
        match self {
            Self::Pacman => 10,
            Self::Apt => 20,
            Self::Dnf => 30,
            Self::Zypper => 40,
            Self::Xbps => 50,
        }
    }

    /// Creates a fresh parser with empty state.
    pub fn create(&self) -> Box<dyn LogParser> {
        match self {
            Self::Pacman => Box::new(PacmanParser::default()),
            Self::Apt => Box::new(AptParser::default()),
            Self::Dnf => Box::new(DnfParser::default()),
            Self::Zypper => Box::new(ZypperParser::default()),
            Self::Xbps => Box::new(XbpsParser::default()),
        }
    }

    /// Picks the preferred parser whose default log file exists.
    pub fn detect(exists: impl Fn(&Path) -> bool) -> Option<Self> {
        let mut kinds = Self::ALL;
        kinds.sort_by_key(Self::priority);
        kinds.into_iter().find(|kind| exists(kind.logfile()))
    }
}

impl fmt::Display for ParserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ParserKind {
    type Err = UnknownParser;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnknownParser(s.to_string()))
    }
}

impl Serialize for ParserKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for ParserKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown parser names.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown log parser: {0} (expected one of pacman, apt, dnf, zypper, xbps)")]
pub struct UnknownParser(String);

/// Converts a zoned timestamp to naive local time.
fn local_from_zoned(dt: DateTime<FixedOffset>) -> NaiveDateTime {
    dt.with_timezone(&Local).naive_local()
}

/// Converts a naive UTC timestamp to naive local time.
fn local_from_utc(dt: NaiveDateTime) -> NaiveDateTime {
    Utc.from_utc_datetime(&dt).with_timezone(&Local).naive_local()
}

/// Splits on whitespace runs at most `max` times, keeping the remainder whole.
fn split_fields(line: &str, max: usize) -> Vec<&str> {
    let mut fields = Vec::with_capacity(max + 1);
    let mut rest = line.trim();
    while fields.len() < max && !rest.is_empty() {
        match rest.find(char::is_whitespace) {
            Some(end) => {
                fields.push(&rest[..end]);
                rest = rest[end..].trim_start();
            }
            None => {
                fields.push(rest);
                rest = "";
            }
        }
    }
    if !rest.is_empty() {
        fields.push(rest);
    }
    fields
}

/// Builds the change for a package whose previous version is known, for
/// formats that don't log whether it went up or down.
fn compared_change(package: &str, old: &str, new: &str) -> PackageChange {
    let action = classify_change(old, new);
    let version = if action.changes_version() {
        version_delta(old, new)
    } else {
        new.to_string()
    };
    PackageChange::new(action, package, version)
}
