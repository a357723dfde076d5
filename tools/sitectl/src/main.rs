//! sitectl - SiteWorks operator tool
//!
//! Command-line front end for the cable sizing engine and the sync queue.

mod calc;
mod schedule;
mod sync_demo;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use common::{init_logging, load_config, LogConfig};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "sitectl")]
#[command(about = "SiteWorks field tool: cable sizing and sync queue")]
#[command(long_about = "SiteWorks field tool: cable sizing and sync queue

Commands:
  size        Size a single cable run
  table       Show the standard cable reference table
  schedule    Size every run in a cable schedule CSV
  sync-demo   Push simulated project changes through the retry queue

Examples:
  sitectl size --load 20 --voltage 230 --length 25
  sitectl size --load 32 --length 40 --phase three --method ground --json
  sitectl schedule runs.csv -o sized.csv
  sitectl sync-demo --count 3 --failure-rate 0.3")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Configuration file (TOML, YAML or JSON)
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Size a single cable run
    Size(calc::SizeArgs),

    /// Show the standard cable reference table
    Table {
        /// Print the table as JSON
        #[arg(long)]
        json: bool,
    },

    /// Size every run in a cable schedule CSV
    Schedule(schedule::ScheduleArgs),

    /// Push simulated project changes through the retry queue
    SyncDemo(sync_demo::SyncDemoArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;

    let mut log_config = LogConfig::from_settings("sitectl", &config.logging).with_ansi(!cli.no_color);
    if cli.verbose {
        log_config = log_config.with_level("debug");
    }
    init_logging(&log_config).context("Failed to initialize logging")?;

    match cli.command {
        Commands::Size(args) => calc::run_size(&args, &config.calculator),
        Commands::Table { json } => calc::run_table(json),
        Commands::Schedule(args) => schedule::run_schedule(&args, &config.calculator),
        Commands::SyncDemo(args) => sync_demo::run_sync_demo(&args, &config.sync).await,
    }
}
