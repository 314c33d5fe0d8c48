//! Package action enum as the single source of truth for action words.

use std::fmt;
use std::str::FromStr;

use colored::Color;

/// A change applied to a package by the package manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Installed,
    Removed,
    Upgraded,
    Downgraded,
    Reinstalled,
}

impl ActionKind {
    /// All actions in priority order.
    pub const ALL: [Self; 5] = [
        Self::Installed,
        Self::Removed,
        Self::Upgraded,
        Self::Downgraded,
        Self::Reinstalled,
    ];

    /// The word used in logs and in report lines.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Installed => "installed",
            Self::Removed => "removed",
            Self::Upgraded => "upgraded",
            Self::Downgraded => "downgraded",
            Self::Reinstalled => "reinstalled",
        }
    }

    /// Sort priority code. Upgrades and downgrades share a code.
    #[must_use]
    pub const fn code(&self) -> u8 {
        match self {
            Self::Installed => 1,
            Self::Removed => 2,
            Self::Upgraded | Self::Downgraded => 3,
            Self::Reinstalled => 4,
        }
    }

    /// Whether the version field of this action is an `old -> new` delta.
    #[must_use]
    pub const fn changes_version(&self) -> bool {
        self.code() == 3
    }

    /// Display color for report lines.
    #[must_use]
    pub const fn color(&self) -> Color {
        match self {
            Self::Installed => Color::Green,
            Self::Removed => Color::Red,
            Self::Upgraded => Color::Yellow,
            Self::Downgraded => Color::Magenta,
            Self::Reinstalled => Color::Cyan,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}

/// Error type for unknown action words.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown package action: {0}")]
pub struct UnknownAction(String);
