//! Builds the pipeline from options and prints the report.

use std::io::{self, BufWriter, IsTerminal, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use pkglog_core::{
    ActionFilter, MatchMode, PackageMatcher, ParserKind, Pipeline, PipelineOptions, Queue,
    ReportFilter,
};

use crate::output::{Printer, is_broken_pipe};
use crate::{Cli, Config, boot, logfiles, util};

/// Prints the available parsers, marking the one detected on this system.
pub fn list_parsers(out: &mut impl Write) -> io::Result<()> {
    let detected = ParserKind::detect(Path::exists);
    let mut kinds = ParserKind::ALL;
    kinds.sort_by_key(ParserKind::name);
    for kind in kinds {
        let marker = if Some(kind) == detected { " (default)" } else { "" };
        writeln!(out, "{kind}\t: {}{marker}", kind.description())?;
    }
    Ok(())
}

/// Runs the report to stdout. A closed stdout ends the report quietly.
pub fn run(cli: &Cli, config: &Config) -> Result<()> {
    let color = !(cli.no_color || config.no_color) && io::stdout().is_terminal();
    if !color {
        colored::control::set_override(false);
    }

    let stdout = io::stdout();
    let mut printer = Printer::new(BufWriter::new(stdout.lock()), color);
    match write_report(cli, config, &mut printer).and_then(|()| {
        printer.flush().context("failed to write report")
    }) {
        Err(e) if is_broken_pipe(&e) => {
            tracing::debug!("stdout closed, stopping");
            Ok(())
        }
        result => result,
    }
}

fn write_report<W: Write>(cli: &Cli, config: &Config, printer: &mut Printer<W>) -> Result<()> {
    let kind = match cli.parser.or(config.parser) {
        Some(kind) => kind,
        None => ParserKind::detect(Path::exists)
            .context("can not determine log parser for this system")?,
    };
    tracing::debug!(parser = %kind, "using log parser");

    let filter = report_filter(cli, config)?;
    let period = Period::new(cli, config);
    let now = Local::now().naive_local();
    let start = util::compute_start_time(
        period.days,
        period.alldays,
        !cli.package.is_empty(),
        now.date(),
    )?;
    let boot = boot::boot_time(now);
    tracing::debug!(?period, ?start, ?boot, "time cutoffs");

    let mut queue = Queue::new(filter);
    if let Some(boot) = boot.filter(|_| cli.package.is_empty() && !period.boot) {
        queue = queue.with_boot_marker(boot);
    }

    let options = PipelineOptions {
        gap: util::minutes(cli.timegap.unwrap_or(config.timegap))?,
        start,
        boot_cutoff: boot.filter(|_| period.boot),
    };

    let files = logfiles::resolve(cli.path.as_deref().or(config.path.as_deref()), kind.logfile())?;

    let mut pipeline = Pipeline::new(kind.create(), queue, options);
    for file in &files {
        tracing::debug!(path = %file.display(), "reading log file");
        let reader = logfiles::open(file)?;
        logfiles::read_lines(reader, |line| {
            printer
                .print(&pipeline.feed_line(line))
                .context("failed to write report")
        })
        .with_context(|| format!("failed to read {}", file.display()))?;
    }

    printer
        .print(&pipeline.finish())
        .context("failed to write report")
}

/// The reporting period. Any period option on the command line replaces
/// the configured one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Period<'a> {
    days: Option<&'a str>,
    alldays: bool,
    boot: bool,
}

impl<'a> Period<'a> {
    fn new(cli: &'a Cli, config: &'a Config) -> Self {
        if cli.days.is_some() || cli.alldays || cli.boot {
            Self {
                days: cli.days.as_deref(),
                alldays: cli.alldays,
                boot: cli.boot,
            }
        } else {
            Self {
                days: config.days.as_deref(),
                alldays: config.alldays,
                boot: config.boot,
            }
        }
    }
}

fn report_filter(cli: &Cli, config: &Config) -> Result<ReportFilter> {
    Ok(ReportFilter {
        action: action_filter(cli, config)?,
        packages: package_matcher(cli, config)?,
        justify: !(cli.nojustify || config.nojustify),
        verbose: cli.verbose || config.verbose,
    })
}

/// Action flags given on the command line replace the configured ones.
fn action_filter(cli: &Cli, config: &Config) -> Result<ActionFilter> {
    let from_cli = cli.updated_only || cli.installed || cli.installed_only || cli.installed_net;
    let (updated_only, installed, installed_only, installed_net) = if from_cli {
        (cli.updated_only, cli.installed, cli.installed_only, cli.installed_net)
    } else {
        (
            config.updated_only,
            config.installed,
            config.installed_only,
            config.installed_net,
        )
    };

    let action = if updated_only {
        ActionFilter::UpdatedOnly
    } else if installed_net {
        ActionFilter::InstalledNet {
            grace: util::days(cli.installed_net_days.unwrap_or(config.installed_net_days))?,
        }
    } else if installed_only {
        ActionFilter::InstalledOnly
    } else if installed {
        ActionFilter::Installed
    } else {
        ActionFilter::All
    };
    Ok(action)
}

fn package_matcher(cli: &Cli, config: &Config) -> Result<Option<PackageMatcher>> {
    if cli.package.is_empty() {
        return Ok(None);
    }

    let (glob, regex) = if cli.glob || cli.regex {
        (cli.glob, cli.regex)
    } else {
        (config.glob, config.regex)
    };
    let mode = if glob {
        MatchMode::Glob
    } else if regex {
        MatchMode::Regex
    } else {
        MatchMode::Exact
    };
    Ok(Some(PackageMatcher::new(&cli.package, mode)?))
}
