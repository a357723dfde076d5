//! `size` and `table` commands

use anyhow::Result;
use cable_calc::{
    standard_table, CableCalculation, CableSizer, CalcError, CalculationInput, InstallationMethod,
    Phase, NO_SUITABLE_CABLE,
};
use clap::Args;
use colored::*;
use common::CalculatorConfig;
use errors::SiteError;
use std::process::ExitCode;
use tracing::debug;
use uuid::Uuid;

/// Exit code for input that could not be parsed
const EXIT_INVALID_INPUT: u8 = 2;

#[derive(Args, Debug, Clone)]
pub struct SizeArgs {
    /// Load current (A)
    #[arg(long)]
    pub load: String,

    /// Nominal voltage (V); defaults to the configured voltage
    #[arg(long)]
    pub voltage: Option<String>,

    /// Run length (m)
    #[arg(long)]
    pub length: String,

    /// Installation method: air or ground
    #[arg(short, long)]
    pub method: Option<InstallationMethod>,

    /// Phase: single or three
    #[arg(short, long)]
    pub phase: Option<Phase>,

    /// Print the calculation record as JSON
    #[arg(long)]
    pub json: bool,

    /// Project to file the calculation against (JSON output)
    #[arg(long)]
    pub project: Option<Uuid>,
}

/// Rendered outcome of `size`
#[derive(Debug)]
pub struct SizeReport {
    pub output: String,
    pub feasible: bool,
}

impl SizeArgs {
    fn to_input(&self, defaults: &CalculatorConfig) -> cable_calc::Result<CalculationInput> {
        let voltage = self
            .voltage
            .clone()
            .unwrap_or_else(|| defaults.voltage.to_string());

        CalculationInput::parse(
            &self.load,
            &voltage,
            &self.length,
            self.method.unwrap_or(defaults.method),
            self.phase.unwrap_or(defaults.phase),
        )
    }
}

/// Compute and render one calculation
pub fn size_report(args: &SizeArgs, defaults: &CalculatorConfig) -> Result<SizeReport, CalcError> {
    let input = args.to_input(defaults)?;
    debug!(?input, "Sizing cable run");

    let Some(result) = CableSizer::standard().select_for(&input) else {
        let output = if args.json {
            let info = SiteError::NoFeasibleCable(describe_input(&input))
                .to_error_info()
                .with_details(NO_SUITABLE_CABLE);
            to_json(&info)
        } else {
            NO_SUITABLE_CABLE.to_string()
        };
        return Ok(SizeReport {
            output,
            feasible: false,
        });
    };

    let output = if args.json {
        let mut record = CableCalculation::from_result(&input, &result);
        if let Some(project) = args.project {
            record = record.with_project(project);
        }
        to_json(&record)
    } else {
        format!("{}\n{}", describe_input(&input), result.summary())
    };

    Ok(SizeReport {
        output,
        feasible: true,
    })
}

fn describe_input(input: &CalculationInput) -> String {
    format!(
        "{} A, {} V, {} m, {}, {}",
        input.load_amps, input.nominal_voltage, input.length_meters, input.method, input.phase
    )
}

/// Map an input error onto the shared error type for reporting
pub fn input_error(e: &CalcError) -> SiteError {
    match e {
        CalcError::InvalidInput { field, reason } => SiteError::InvalidParameter {
            param: field.clone(),
            reason: reason.clone(),
        },
        other => SiteError::Validation(other.to_string()),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

pub fn run_size(args: &SizeArgs, defaults: &CalculatorConfig) -> Result<ExitCode> {
    let report = match size_report(args, defaults) {
        Ok(report) => report,
        Err(e) => {
            let error = input_error(&e);
            if args.json {
                println!("{}", to_json(&error.to_error_info()));
            } else {
                eprintln!("{} {}", "Invalid input:".red().bold(), error);
            }
            return Ok(ExitCode::from(EXIT_INVALID_INPUT));
        },
    };

    if report.feasible {
        if args.json {
            println!("{}", report.output);
        } else {
            println!("{}", "Cable Calculation".bright_cyan());
            println!("{}", "=".repeat(40).bright_blue());
            println!("{}", report.output);
        }
        Ok(ExitCode::SUCCESS)
    } else {
        if args.json {
            println!("{}", report.output);
        } else {
            println!("{}", report.output.red());
        }
        Ok(ExitCode::FAILURE)
    }
}

/// Render the reference table as aligned text
pub fn table_text() -> String {
    let mut lines = vec![format!(
        "{:<10} {:>8} {:>11} {:>8}",
        "Size", "Air (A)", "Ground (A)", "mΩ/m"
    )];
    for cable in standard_table() {
        lines.push(format!(
            "{:<10} {:>8} {:>11} {:>8.2}",
            cable.size, cable.rating_air, cable.rating_ground, cable.impedance_per_meter
        ));
    }
    lines.join("\n")
}

pub fn run_table(json: bool) -> Result<ExitCode> {
    if json {
        println!("{}", serde_json::to_string_pretty(standard_table())?);
    } else {
        println!("{}", "Standard Cable Table".bright_cyan());
        println!("{}", table_text());
    }
    Ok(ExitCode::SUCCESS)
}
