//! Cable selection engine
//!
//! Picks the smallest table entry that satisfies both the derated current
//! check and the voltage drop limit for the run.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::Result;
use crate::input::CalculationInput;
use crate::table::{standard_table, validate_table, CableSpec};
use crate::types::{InstallationMethod, Phase};

/// Margin applied to the load before the capacity comparison
pub const SAFETY_FACTOR: f64 = 1.15;

/// Voltage drop limit for single-phase circuits (% of nominal)
pub const MAX_DROP_PERCENT_SINGLE: f64 = 3.0;

/// Voltage drop limit for three-phase circuits (% of nominal)
pub const MAX_DROP_PERCENT_THREE: f64 = 5.0;

/// Text shown when no table entry passes both checks
pub const NO_SUITABLE_CABLE: &str = "No suitable cable found within standard range.";

/// Outcome of a successful selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Size label of the chosen cable
    pub selected_cable_size: String,
    /// Voltage drop along the run (V)
    pub voltage_drop_volts: f64,
    /// Voltage drop as a percentage of nominal voltage
    pub voltage_drop_percent: f64,
    /// Always true for a produced result
    pub is_feasible: bool,
    /// Load scaled by [`SAFETY_FACTOR`]
    pub required_design_current_amps: f64,
}

impl CalculationResult {
    /// Multi-line summary for display
    pub fn summary(&self) -> String {
        format!(
            "Selected Cable: {}\nVoltage Drop: {:.2} V\nDrop %: {:.2}%\nRequired Current: {:.2} A",
            self.selected_cable_size,
            self.voltage_drop_volts,
            self.voltage_drop_percent,
            self.required_design_current_amps
        )
    }
}

impl std::fmt::Display for CalculationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.summary())
    }
}

/// Display text for an optional result
pub fn describe(result: Option<&CalculationResult>) -> String {
    match result {
        Some(result) => result.summary(),
        None => NO_SUITABLE_CABLE.to_string(),
    }
}

/// Design current: load scaled by the safety factor
pub fn design_current(load_amps: f64) -> f64 {
    load_amps * SAFETY_FACTOR
}

/// Maximum permissible voltage drop in volts
pub fn max_voltage_drop(nominal_voltage: f64, phase: Phase) -> f64 {
    nominal_voltage * phase.max_drop_percent() / 100.0
}

/// Voltage drop along a run of `cable`
///
/// Uses the actual load current; only the capacity check is derated.
pub fn voltage_drop(cable: &CableSpec, load_amps: f64, length_meters: f64, phase: Phase) -> f64 {
    phase.drop_multiplier() * length_meters * cable.ohms_per_meter() * load_amps
}

/// Cable selector over an ordered reference table
#[derive(Debug, Clone, Copy)]
pub struct CableSizer<'a> {
    table: &'a [CableSpec],
}

impl Default for CableSizer<'static> {
    fn default() -> Self {
        Self::standard()
    }
}

impl CableSizer<'static> {
    /// Sizer over [`crate::table::STANDARD_CABLES`]
    pub fn standard() -> Self {
        Self {
            table: standard_table(),
        }
    }
}

impl<'a> CableSizer<'a> {
    /// Sizer over a custom table, checked for ordering first
    pub fn with_table(table: &'a [CableSpec]) -> Result<Self> {
        validate_table(table)?;
        Ok(Self { table })
    }

    pub fn table(&self) -> &'a [CableSpec] {
        self.table
    }

    /// Select the first cable passing both checks, or `None`
    pub fn select(
        &self,
        load_amps: f64,
        nominal_voltage: f64,
        length_meters: f64,
        method: InstallationMethod,
        phase: Phase,
    ) -> Option<CalculationResult> {
        let design_current = design_current(load_amps);
        let max_drop = max_voltage_drop(nominal_voltage, phase);

        for cable in self.table {
            let current_rating = cable.rating(method);
            if current_rating < design_current {
                trace!(
                    size = cable.size,
                    rating = current_rating,
                    design_current,
                    "rejected on capacity"
                );
                continue;
            }

            let drop = voltage_drop(cable, load_amps, length_meters, phase);
            if drop <= max_drop {
                return Some(CalculationResult {
                    selected_cable_size: cable.size.to_string(),
                    voltage_drop_volts: drop,
                    voltage_drop_percent: drop / nominal_voltage * 100.0,
                    is_feasible: true,
                    required_design_current_amps: design_current,
                });
            }

            trace!(size = cable.size, drop, max_drop, "rejected on voltage drop");
        }

        None
    }

    /// Select using a validated input record
    pub fn select_for(&self, input: &CalculationInput) -> Option<CalculationResult> {
        self.select(
            input.load_amps,
            input.nominal_voltage,
            input.length_meters,
            input.method,
            input.phase,
        )
    }
}

/// Select the minimum standard cable for a circuit
///
/// Inputs must satisfy `load_amps > 0`, `nominal_voltage > 0` and
/// `length_meters >= 0`; validation is the caller's job (see
/// [`CalculationInput::parse`]).
pub fn select_cable(
    load_amps: f64,
    nominal_voltage: f64,
    length_meters: f64,
    method: InstallationMethod,
    phase: Phase,
) -> Option<CalculationResult> {
    CableSizer::standard().select(load_amps, nominal_voltage, length_meters, method, phase)
}
