//! Cable schedule sizing
//!
//! A schedule is a list of runs (tag, origin, destination, load, length).
//! Sizing fills each run's cable size and voltage drop from the engine.

use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use tracing::{debug, info, warn};

use crate::engine::{CableSizer, CalculationResult};
use crate::error::Result;
use crate::types::{InstallationMethod, Phase};

/// Supply conditions shared by every run in a schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupplyConditions {
    pub nominal_voltage: f64,
    pub method: InstallationMethod,
    pub phase: Phase,
}

impl Default for SupplyConditions {
    fn default() -> Self {
        Self {
            nominal_voltage: 230.0,
            method: InstallationMethod::Air,
            phase: Phase::Single,
        }
    }
}

/// One row of a cable schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CableRun {
    pub tag: String,
    pub from: String,
    pub to: String,
    /// Load current (A)
    pub load: f64,
    /// Run length (m)
    pub length: f64,
    #[serde(default)]
    pub cable_size: Option<String>,
    #[serde(default)]
    pub voltage_drop: Option<f64>,
}

impl CableRun {
    pub fn new(
        tag: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        load: f64,
        length: f64,
    ) -> Self {
        Self {
            tag: tag.into(),
            from: from.into(),
            to: to.into(),
            load,
            length,
            cable_size: None,
            voltage_drop: None,
        }
    }

    /// Whether the run's load and length are inside the engine's domain
    pub fn is_sizable(&self, conditions: &SupplyConditions) -> bool {
        self.load.is_finite()
            && self.load > 0.0
            && self.length.is_finite()
            && self.length >= 0.0
            && conditions.nominal_voltage.is_finite()
            && conditions.nominal_voltage > 0.0
    }

    /// Size this run, updating its cable size and voltage drop
    ///
    /// Runs outside the engine's domain and infeasible runs are left with
    /// both fields cleared.
    pub fn size_with(
        &mut self,
        sizer: &CableSizer<'_>,
        conditions: &SupplyConditions,
    ) -> Option<CalculationResult> {
        let result = if self.is_sizable(conditions) {
            sizer.select(
                self.load,
                conditions.nominal_voltage,
                self.length,
                conditions.method,
                conditions.phase,
            )
        } else {
            debug!(tag = %self.tag, load = self.load, length = self.length, "run not sizable");
            None
        };

        match &result {
            Some(result) => {
                self.cable_size = Some(result.selected_cable_size.clone());
                self.voltage_drop = Some(result.voltage_drop_volts);
            },
            None => {
                self.cable_size = None;
                self.voltage_drop = None;
            },
        }
        result
    }
}

/// Outcome of sizing a whole schedule
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScheduleSummary {
    pub total: usize,
    pub sized: usize,
    /// Tags of runs left without a cable
    pub unsized_tags: Vec<String>,
}

impl ScheduleSummary {
    pub fn all_sized(&self) -> bool {
        self.unsized_tags.is_empty()
    }
}

/// Size every run in a schedule
pub fn size_schedule(
    runs: &mut [CableRun],
    sizer: &CableSizer<'_>,
    conditions: &SupplyConditions,
) -> ScheduleSummary {
    let mut summary = ScheduleSummary {
        total: runs.len(),
        ..Default::default()
    };

    for run in runs.iter_mut() {
        if run.size_with(sizer, conditions).is_some() {
            summary.sized += 1;
        } else {
            warn!(tag = %run.tag, "No suitable cable for run");
            summary.unsized_tags.push(run.tag.clone());
        }
    }

    info!(
        total = summary.total,
        sized = summary.sized,
        "Cable schedule sized"
    );
    summary
}

/// Read a schedule from CSV with a header row
pub fn read_schedule<R: Read>(reader: R) -> Result<Vec<CableRun>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut runs = Vec::new();
    for record in csv_reader.deserialize() {
        runs.push(record?);
    }
    Ok(runs)
}

/// Write a schedule as CSV with a header row
pub fn write_schedule<W: Write>(writer: W, runs: &[CableRun]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for run in runs {
        csv_writer.serialize(run)?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use tracing_test::traced_test;

    const SCHEDULE_CSV: &str = "\
tag,from,to,load,length,cable_size,voltage_drop
C1,DB1,Lighting,20,25,,
C2,DB1,Pump,100,10,,
C3,DB1,Spare,0,0,,
";

    #[test]
    fn test_read_schedule_empty_fields_are_none() {
        let runs = read_schedule(SCHEDULE_CSV.as_bytes()).unwrap();
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].tag, "C1");
        assert_eq!(runs[0].cable_size, None);
        assert_eq!(runs[0].voltage_drop, None);
    }

    #[test]
    #[traced_test]
    fn test_size_schedule() {
        let mut runs = read_schedule(SCHEDULE_CSV.as_bytes()).unwrap();
        let summary = size_schedule(
            &mut runs,
            &CableSizer::standard(),
            &SupplyConditions::default(),
        );

        assert_eq!(summary.total, 3);
        assert_eq!(summary.sized, 1);
        assert_eq!(summary.unsized_tags, vec!["C2".to_string(), "C3".to_string()]);
        assert!(!summary.all_sized());
        assert_eq!(runs[0].cable_size.as_deref(), Some("4mm²"));
        assert!(runs[1].cable_size.is_none());
        assert!(logs_contain("No suitable cable for run"));
    }

    #[test]
    fn test_resizing_clears_stale_values() {
        let mut run = CableRun::new("C9", "DB2", "Heater", 20.0, 25.0);
        let sizer = CableSizer::standard();
        let conditions = SupplyConditions::default();
        assert!(run.size_with(&sizer, &conditions).is_some());

        run.length = 1000.0;
        assert!(run.size_with(&sizer, &conditions).is_none());
        assert!(run.cable_size.is_none());
        assert!(run.voltage_drop.is_none());
    }

    #[test]
    fn test_write_schedule_round_trip() {
        let mut runs = vec![CableRun::new("C1", "DB1", "Lighting", 20.0, 25.0)];
        size_schedule(&mut runs, &CableSizer::standard(), &SupplyConditions::default());

        let mut out = Vec::new();
        write_schedule(&mut out, &runs).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("tag,from,to,load,length,cable_size,voltage_drop"));

        let back = read_schedule(text.as_bytes()).unwrap();
        assert_eq!(back[0].cable_size.as_deref(), Some("4mm²"));
    }
}
