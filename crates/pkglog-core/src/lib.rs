//! Core logic for reporting package changes from package manager logs.
//!
//! This crate contains:
//! - Parsers for the pacman, apt, dnf, zypper and xbps log formats
//! - Version comparison used to tell upgrades from downgrades
//! - The queue that groups, filters and formats package events
//! - The pipeline driving a parser over a stream of lines

pub mod action;
pub mod event;
pub mod filter;
pub mod parser;
pub mod pipeline;
pub mod queue;
pub mod version;

pub use action::{ActionKind, UnknownAction};
pub use event::{PackageChange, PackageEvent};
pub use filter::{
    ActionFilter, DEFAULT_NET_GRACE_DAYS, FilterError, MatchMode, PackageMatcher, ReportFilter,
};
pub use parser::{LogParser, ParserKind, UnknownParser};
pub use pipeline::{DEFAULT_GAP_MINUTES, Pipeline, PipelineOptions};
pub use queue::{OutputLine, Queue};
pub use version::{classify_change, compare_versions};
