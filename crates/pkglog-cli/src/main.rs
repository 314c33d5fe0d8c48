use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pkglog_cli::{Cli, Config, report};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with debug flag support
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    if cli.list_parsers {
        return report::list_parsers(&mut io::stdout().lock()).context("failed to list parsers");
    }

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    report::run(&cli, &config)
}
