// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use devboot::{Config, Setup, SystemExecutor};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inquire::Confirm;
use std::{path::PathBuf, process::exit};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(about, subcommand_help_heading = "Commands", version)]
struct Cli {
    /// Path to configuration file to use instead of the default one.
    #[arg(short, long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    fn run(self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;
        match self.command {
            Command::Setup(opts) => run_setup(config, opts),
            Command::Config => run_config(config),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Set up local development machine.
    #[command(override_usage = "devboot setup [options]")]
    Setup(SetupOptions),

    /// Print effective configuration.
    #[command(override_usage = "devboot config [options]")]
    Config,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct SetupOptions {
    /// Only show what would be done without changing anything.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Do not ask for confirmation before changing anything.
    #[arg(short, long)]
    pub yes: bool,
}

fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = run() {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

fn run() -> Result<()> {
    Cli::parse().run()
}

fn run_setup(config: Config, opts: SetupOptions) -> Result<()> {
    if !opts.dry_run && !opts.yes && !confirm(&config)? {
        info!("setup cancelled");
        return Ok(());
    }

    Setup::new(config, SystemExecutor::new(opts.dry_run)).run()?;

    Ok(())
}

fn run_config(config: Config) -> Result<()> {
    print!("{config}");

    Ok(())
}

fn confirm(config: &Config) -> Result<bool> {
    Confirm::new("set up this machine now?")
        .with_default(false)
        .with_help_message(&format!(
            "clones into {}, installs apps, and edits {}",
            config.workspace_dir.display(),
            config.aliases.profile.display()
        ))
        .prompt()
        .context("cannot ask for confirmation, pass --yes to skip it")
}
