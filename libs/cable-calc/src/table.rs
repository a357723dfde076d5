//! Standard cable reference table
//!
//! Entries are ordered by cross-section, smallest first. The selection scan
//! is first-fit over this order.

use serde::Serialize;

use crate::error::{CalcError, Result};
use crate::types::InstallationMethod;

/// One row of the cable reference table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CableSpec {
    /// Nominal cross-section label, e.g. `2.5mm²`
    pub size: &'static str,
    /// Continuous current rating (A) when installed in air
    pub rating_air: f64,
    /// Continuous current rating (A) when buried in ground
    pub rating_ground: f64,
    /// Conductor impedance in milliohms per meter
    pub impedance_per_meter: f64,
}

impl CableSpec {
    pub const fn new(
        size: &'static str,
        rating_air: f64,
        rating_ground: f64,
        impedance_per_meter: f64,
    ) -> Self {
        Self {
            size,
            rating_air,
            rating_ground,
            impedance_per_meter,
        }
    }

    /// Current rating for the given installation method
    pub fn rating(&self, method: InstallationMethod) -> f64 {
        match method {
            InstallationMethod::Air => self.rating_air,
            InstallationMethod::Ground => self.rating_ground,
        }
    }

    /// Resistance in ohms per meter
    pub fn ohms_per_meter(&self) -> f64 {
        self.impedance_per_meter / 1000.0
    }
}

/// Standard copper cable sizes
pub static STANDARD_CABLES: [CableSpec; 6] = [
    CableSpec::new("1.5mm²", 19.0, 24.0, 14.48),
    CableSpec::new("2.5mm²", 26.0, 32.0, 8.87),
    CableSpec::new("4mm²", 35.0, 42.0, 5.52),
    CableSpec::new("6mm²", 45.0, 53.0, 3.69),
    CableSpec::new("10mm²", 62.0, 70.0, 2.19),
    CableSpec::new("16mm²", 83.0, 91.0, 1.38),
];

/// The standard reference table
pub fn standard_table() -> &'static [CableSpec] {
    &STANDARD_CABLES
}

/// Check that a table is usable for first-fit selection
///
/// Ratings must not decrease and impedance must not increase from one entry
/// to the next, and every value must be a positive finite number.
pub fn validate_table(table: &[CableSpec]) -> Result<()> {
    if table.is_empty() {
        return Err(CalcError::invalid_table("table is empty"));
    }

    for spec in table {
        let values = [spec.rating_air, spec.rating_ground, spec.impedance_per_meter];
        if values.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(CalcError::invalid_table(format!(
                "{}: ratings and impedance must be positive",
                spec.size
            )));
        }
    }

    for pair in table.windows(2) {
        let (smaller, larger) = (&pair[0], &pair[1]);
        if larger.rating_air < smaller.rating_air || larger.rating_ground < smaller.rating_ground
        {
            return Err(CalcError::invalid_table(format!(
                "{} is rated below {}",
                larger.size, smaller.size
            )));
        }
        if larger.impedance_per_meter > smaller.impedance_per_meter {
            return Err(CalcError::invalid_table(format!(
                "{} has higher impedance than {}",
                larger.size, smaller.size
            )));
        }
    }

    Ok(())
}
