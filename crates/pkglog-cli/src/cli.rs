//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{ArgGroup, Parser};
use pkglog_core::ParserKind;

/// Reports a concise log of package changes.
///
/// Reads the package manager log of this system (pacman, apt, dnf, zypper or
/// xbps) and prints installs, removals, upgrades, downgrades and reinstalls
/// in groups of changes made close together in time.
#[derive(Debug, Parser)]
#[command(
    name = "pkglog",
    version,
    about,
    long_about = None,
    after_help = "Default options are read from ~/.config/pkglog/config.toml, e.g. \
                  `timegap = 5` or `installed_net = true`. Command-line options \
                  take precedence."
)]
#[command(group(
    ArgGroup::new("actions").args(["updated_only", "installed", "installed_only", "installed_net"])
))]
#[command(group(ArgGroup::new("period").args(["days", "alldays", "boot", "list_parsers"])))]
#[command(group(ArgGroup::new("patterns").args(["glob", "regex"])))]
#[expect(
    clippy::struct_excessive_bools,
    reason = "each bool is an independent command-line flag"
)]
pub struct Cli {
    /// Show updated packages only.
    #[arg(short, long)]
    pub updated_only: bool,

    /// Show installed and removed packages only.
    #[arg(short, long)]
    pub installed: bool,

    /// Show installed packages only.
    #[arg(short = 'I', long)]
    pub installed_only: bool,

    /// Show net installed packages only.
    #[arg(short = 'n', long)]
    pub installed_net: bool,

    /// Days a package must have been removed before a reinstall is reported
    /// as a new install with --installed-net (0 disables) [default: 2].
    #[arg(short = 'N', long, value_name = "DAYS")]
    pub installed_net_days: Option<f64>,

    /// Show packages from this many days ago (0 = today, -1 = all), or from
    /// YYYY-MM-DD[?HH:MM[:SS]], or from a time today [default: 30].
    #[arg(short, long, value_name = "DAYS|DATE", allow_hyphen_values = true)]
    pub days: Option<String>,

    /// Show packages for all days.
    #[arg(short, long)]
    pub alldays: bool,

    /// Show only packages changed since the last boot.
    #[arg(short, long)]
    pub boot: bool,

    /// Don't right justify package names.
    #[arg(short = 'j', long)]
    pub nojustify: bool,

    /// Describe upgrades and downgrades as well.
    #[arg(short, long)]
    pub verbose: bool,

    /// Do not color output lines.
    #[arg(short = 'c', long)]
    pub no_color: bool,

    /// Log parser to use [default: detected from this system].
    #[arg(short, long, value_name = "NAME")]
    pub parser: Option<ParserKind>,

    /// Maximum minutes between changes shown in one group [default: 2].
    #[arg(short, long, value_name = "MINUTES")]
    pub timegap: Option<f64>,

    /// Alternate log path(s), separated by ':' and given in time order.
    #[arg(short = 'P', long, value_name = "PATHS")]
    pub path: Option<String>,

    /// Package names are glob patterns.
    #[arg(short, long)]
    pub glob: bool,

    /// Package names are regular expressions.
    #[arg(short, long)]
    pub regex: bool,

    /// List available log parsers and exit.
    #[arg(short, long)]
    pub list_parsers: bool,

    /// Path to an extra config file, read after the default one.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log debug messages to stderr.
    #[arg(long)]
    pub debug: bool,

    /// Show only changes to these packages.
    pub package: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_negative_days() {
        let cli = Cli::try_parse_from(["pkglog", "-d", "-1"]).unwrap();
        assert_eq!(cli.days.as_deref(), Some("-1"));
    }

    #[test]
    fn parses_parser_name() {
        let cli = Cli::try_parse_from(["pkglog", "-p", "apt", "vim"]).unwrap();
        assert_eq!(cli.parser, Some(ParserKind::Apt));
        assert_eq!(cli.package, ["vim"]);

        assert!(Cli::try_parse_from(["pkglog", "-p", "yum"]).is_err());
    }

    #[test]
    fn action_filters_are_exclusive() {
        assert!(Cli::try_parse_from(["pkglog", "-u", "-i"]).is_err());
        assert!(Cli::try_parse_from(["pkglog", "-I", "-n"]).is_err());
    }

    #[test]
    fn period_options_are_exclusive() {
        assert!(Cli::try_parse_from(["pkglog", "-a", "-b"]).is_err());
        assert!(Cli::try_parse_from(["pkglog", "-d", "3", "-a"]).is_err());
        assert!(Cli::try_parse_from(["pkglog", "-l", "-b"]).is_err());
    }

    #[test]
    fn glob_and_regex_are_exclusive() {
        assert!(Cli::try_parse_from(["pkglog", "-g", "-r", "lib*"]).is_err());
        assert!(Cli::try_parse_from(["pkglog", "-g", "lib*"]).is_ok());
    }

    #[test]
    fn short_c_disables_color() {
        let cli = Cli::try_parse_from(["pkglog", "-c"]).unwrap();
        assert!(cli.no_color);
        assert!(cli.config.is_none());

        let cli = Cli::try_parse_from(["pkglog", "--config", "extra.toml"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("extra.toml")));
    }

    #[test]
    fn help_names_config_file() {
        let help = Cli::command().render_help().to_string();
        assert!(help.contains("~/.config/pkglog/config.toml"), "{help}");
    }
}
