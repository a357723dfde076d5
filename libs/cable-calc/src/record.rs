//! Stored calculation record
//!
//! Results are transient; callers keep this record against a project.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::CalculationResult;
use crate::input::CalculationInput;
use crate::types::{InstallationMethod, Phase};

/// A saved cable calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CableCalculation {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub load_current: f64,
    pub voltage: f64,
    pub length: f64,
    pub cable_size: String,
    pub voltage_drop: f64,
    pub percentage_drop: f64,
    pub installation_method: InstallationMethod,
    pub phase: Phase,
    /// Owning project, if the calculation was filed against one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Uuid>,
}

impl CableCalculation {
    /// Copy inputs and outputs into a new record
    pub fn from_result(input: &CalculationInput, result: &CalculationResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            load_current: input.load_amps,
            voltage: input.nominal_voltage,
            length: input.length_meters,
            cable_size: result.selected_cable_size.clone(),
            voltage_drop: result.voltage_drop_volts,
            percentage_drop: result.voltage_drop_percent,
            installation_method: input.method,
            phase: input.phase,
            project_id: None,
        }
    }

    pub fn with_project(mut self, project_id: Uuid) -> Self {
        self.project_id = Some(project_id);
        self
    }
}
