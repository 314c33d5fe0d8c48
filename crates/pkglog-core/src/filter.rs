//! Report filters: which actions and which packages are shown.

use chrono::Duration;
use regex::Regex;
use thiserror::Error;

use crate::action::ActionKind;

/// Default days a package must stay removed before a reinstall counts as a
/// new install in net installed mode.
pub const DEFAULT_NET_GRACE_DAYS: u32 = 2;

/// Errors building a package filter.
#[derive(Debug, Error)]
pub enum FilterError {
    /// A package regular expression failed to compile.
    #[error("invalid package regex {pattern:?}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    /// A package glob pattern failed to compile.
    #[error("invalid package glob {pattern:?}")]
    Glob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

/// Restricts which action classes are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionFilter {
    /// Show every action.
    #[default]
    All,
    /// Show upgrades and downgrades only.
    UpdatedOnly,
    /// Show installs and removals only.
    Installed,
    /// Show installs only.
    InstalledOnly,
    /// Show only packages that are still installed at the end of the log.
    ///
    /// A reinstall within `grace` of the previous removal is treated as churn
    /// and hidden. A zero grace disables that check.
    InstalledNet { grace: Duration },
}

impl ActionFilter {
    /// Whether events with the given action pass this filter.
    pub const fn accepts(&self, action: ActionKind) -> bool {
        let code = action.code();
        match self {
            Self::All => true,
            Self::UpdatedOnly => code == 3,
            Self::Installed | Self::InstalledNet { .. } => code <= 2,
            Self::InstalledOnly => code == 1,
        }
    }

    /// Whether this filter produces an install report, shown without group
    /// delimiters.
    pub const fn is_install_report(&self) -> bool {
        matches!(
            self,
            Self::Installed | Self::InstalledOnly | Self::InstalledNet { .. }
        )
    }
}

/// How package name arguments are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    #[default]
    Exact,
    Glob,
    Regex,
}

/// Matches package names against one or more patterns.
#[derive(Debug, Clone)]
pub enum PackageMatcher {
    Exact(Vec<String>),
    Glob(Vec<glob::Pattern>),
    Regex(Vec<Regex>),
}

impl PackageMatcher {
    /// Builds a matcher from raw pattern strings.
    pub fn new<S: AsRef<str>>(patterns: &[S], mode: MatchMode) -> Result<Self, FilterError> {
        let patterns = patterns.iter().map(|p| p.as_ref());
        Ok(match mode {
            MatchMode::Exact => Self::Exact(patterns.map(String::from).collect()),
            MatchMode::Glob => Self::Glob(
                patterns
                    .map(|p| {
                        glob::Pattern::new(p).map_err(|source| FilterError::Glob {
                            pattern: p.to_string(),
                            source,
                        })
                    })
                    .collect::<Result<_, _>>()?,
            ),
            MatchMode::Regex => Self::Regex(
                patterns
                    .map(|p| {
                        Regex::new(p).map_err(|source| FilterError::Regex {
                            pattern: p.to_string(),
                            source,
                        })
                    })
                    .collect::<Result<_, _>>()?,
            ),
        })
    }

    /// Whether any pattern matches the package name.
    ///
    /// Regular expressions match anywhere in the name, globs must match the
    /// whole name.
    pub fn matches(&self, package: &str) -> bool {
        match self {
            Self::Exact(names) => names.iter().any(|n| n == package),
            Self::Glob(patterns) => patterns.iter().any(|p| p.matches(package)),
            Self::Regex(patterns) => patterns.iter().any(|p| p.is_match(package)),
        }
    }
}

/// Everything that decides which events are printed and how.
#[derive(Debug, Clone)]
pub struct ReportFilter {
    pub action: ActionFilter,
    pub packages: Option<PackageMatcher>,
    /// Pad package names to the widest name in each group.
    pub justify: bool,
    /// Append the action word to upgrades and downgrades too.
    pub verbose: bool,
}

impl Default for ReportFilter {
    fn default() -> Self {
        Self {
            action: ActionFilter::All,
            packages: None,
            justify: true,
            verbose: false,
        }
    }
}

impl ReportFilter {
    /// Groups are separated by delimiter lines only in the full report.
    pub const fn uses_delimiters(&self) -> bool {
        self.packages.is_none() && !self.action.is_install_report()
    }

    /// Net installed needs the full log before any group can be judged.
    pub const fn defers_output(&self) -> bool {
        matches!(self.action, ActionFilter::InstalledNet { .. })
    }

    pub fn matches_package(&self, package: &str) -> bool {
        self.packages.as_ref().is_none_or(|m| m.matches(package))
    }
}
