//! pkglog CLI library.
//!
//! This crate provides the command-line interface, configuration and log
//! file handling around `pkglog-core`.

pub mod boot;
mod cli;
mod config;
pub mod logfiles;
pub mod output;
pub mod report;
pub mod util;

pub use cli::Cli;
pub use config::Config;
