//! Validated calculator input
//!
//! The engine assumes its inputs are in range. Form text and CSV values go
//! through here first so malformed numbers never reach the scan.

use serde::{Deserialize, Serialize};

use crate::error::{CalcError, Result};
use crate::types::{InstallationMethod, Phase};

/// Inputs for one cable calculation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalculationInput {
    /// Load current (A), strictly positive
    pub load_amps: f64,
    /// Nominal system voltage (V), strictly positive
    pub nominal_voltage: f64,
    /// Length of the run (m), zero or more
    pub length_meters: f64,
    pub method: InstallationMethod,
    pub phase: Phase,
}

impl CalculationInput {
    /// Build and validate an input record
    pub fn new(
        load_amps: f64,
        nominal_voltage: f64,
        length_meters: f64,
        method: InstallationMethod,
        phase: Phase,
    ) -> Result<Self> {
        let input = Self {
            load_amps,
            nominal_voltage,
            length_meters,
            method,
            phase,
        };
        input.validate()?;
        Ok(input)
    }

    /// Parse text fields as entered in the calculator form
    pub fn parse(
        load_text: &str,
        voltage_text: &str,
        length_text: &str,
        method: InstallationMethod,
        phase: Phase,
    ) -> Result<Self> {
        let load_amps = parse_number("load", load_text)?;
        let nominal_voltage = parse_number("voltage", voltage_text)?;
        let length_meters = parse_number("length", length_text)?;
        Self::new(load_amps, nominal_voltage, length_meters, method, phase)
    }

    /// Check the numeric domain of the engine
    pub fn validate(&self) -> Result<()> {
        ensure_positive("load", self.load_amps)?;
        ensure_positive("voltage", self.nominal_voltage)?;
        ensure_non_negative("length", self.length_meters)?;
        Ok(())
    }
}

/// Parse a finite decimal number from user text
pub fn parse_number(field: &str, text: &str) -> Result<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CalcError::invalid_input(field, "value is required"));
    }

    let value: f64 = trimmed
        .parse()
        .map_err(|_| CalcError::invalid_input(field, format!("'{}' is not a number", trimmed)))?;

    if !value.is_finite() {
        return Err(CalcError::invalid_input(field, "value must be finite"));
    }
    Ok(value)
}

fn ensure_positive(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CalcError::invalid_input(
            field,
            format!("must be greater than zero, got {}", value),
        ))
    }
}

fn ensure_non_negative(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(CalcError::invalid_input(
            field,
            format!("must not be negative, got {}", value),
        ))
    }
}
