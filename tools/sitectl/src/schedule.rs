//! `schedule` command: size every run of a cable schedule CSV

use anyhow::{Context, Result};
use cable_calc::{
    read_schedule, size_schedule, write_schedule, CableRun, CableSizer, InstallationMethod, Phase,
    ScheduleSummary, SupplyConditions,
};
use clap::Args;
use colored::*;
use common::validation::ensure_positive;
use common::{CalculatorConfig, CsvHeaderValidator};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

#[derive(Args, Debug, Clone)]
pub struct ScheduleArgs {
    /// Cable schedule CSV (tag, from, to, load, length)
    pub input: PathBuf,

    /// Write the sized schedule here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Nominal voltage (V) for every run
    #[arg(long)]
    pub voltage: Option<f64>,

    /// Installation method: air or ground
    #[arg(short, long)]
    pub method: Option<InstallationMethod>,

    /// Phase: single or three
    #[arg(short, long)]
    pub phase: Option<Phase>,
}

impl ScheduleArgs {
    fn conditions(&self, defaults: &CalculatorConfig) -> Result<SupplyConditions> {
        let mut conditions = defaults.conditions();
        if let Some(voltage) = self.voltage {
            ensure_positive("voltage", voltage)?;
            conditions.nominal_voltage = voltage;
        }
        if let Some(method) = self.method {
            conditions.method = method;
        }
        if let Some(phase) = self.phase {
            conditions.phase = phase;
        }
        Ok(conditions)
    }
}

/// Validate, read and size a schedule file
pub fn load_and_size(
    path: &Path,
    conditions: &SupplyConditions,
) -> Result<(Vec<CableRun>, ScheduleSummary)> {
    let check = CsvHeaderValidator::validate_csv_header::<CableRun>(path)?;
    for warning in check.into_result()? {
        warn!("{}", warning);
    }

    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut runs =
        read_schedule(file).with_context(|| format!("Failed to read {}", path.display()))?;

    let summary = size_schedule(&mut runs, &CableSizer::standard(), conditions);
    Ok((runs, summary))
}

pub fn run_schedule(args: &ScheduleArgs, defaults: &CalculatorConfig) -> Result<ExitCode> {
    let conditions = args.conditions(defaults)?;
    info!(
        "Sizing schedule {} at {} V, {}, {}",
        args.input.display(),
        conditions.nominal_voltage,
        conditions.method,
        conditions.phase
    );

    let (runs, summary) = load_and_size(&args.input, &conditions)?;

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_schedule(file, &runs)?;
            eprintln!("{} {}", "Wrote".green(), path.display());
        },
        None => write_schedule(std::io::stdout().lock(), &runs)?,
    }

    // Summary goes to stderr so the CSV on stdout stays clean
    eprintln!(
        "{} {}/{} runs sized",
        "Schedule:".bright_cyan(),
        summary.sized,
        summary.total
    );

    if summary.all_sized() {
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!(
            "{} {}",
            "No suitable cable for:".yellow(),
            summary.unsized_tags.join(", ")
        );
        Ok(ExitCode::FAILURE)
    }
}
