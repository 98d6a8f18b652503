// ABOUTME: Entry point for the recursica theme compiler
// ABOUTME: Prints CSS or JSON on stdout; logs go to stderr

mod cli;
mod config;
mod run;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use config::Config;
use std::io::Write;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_cli(&cli);

    let mut logging = config.logging.clone();
    logging
        .apply_env_overrides()
        .context("invalid logging environment")?;
    recursica_logging::init_logging_with_config(logging)
        .context("failed to initialize logging")?;

    let outcome = run::execute(&config)?;
    let rendered = outcome.render(cli.format)?;

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(rendered.as_bytes())
        .context("failed to write output")?;
    if !rendered.ends_with('\n') {
        writeln!(stdout).context("failed to write output")?;
    }
    Ok(())
}
