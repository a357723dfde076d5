//! cable-calc - Cable sizing library for SiteWorks
//!
//! Selects the smallest standard cable that carries the derated load current
//! and keeps the voltage drop of the run within the regulatory limit.
//!
//! # Example
//!
//! ```rust
//! use cable_calc::{select_cable, InstallationMethod, Phase};
//!
//! // 20 A lighting circuit, 230 V single phase, 25 m clipped in air
//! let result = select_cable(20.0, 230.0, 25.0, InstallationMethod::Air, Phase::Single)
//!     .expect("a standard cable fits this run");
//!
//! // 2.5mm² carries 23 A but drops 8.87 V; 4mm² drops 5.52 V
//! assert_eq!(result.selected_cable_size, "4mm²");
//! assert!((result.voltage_drop_percent - 2.4).abs() < 1e-9);
//! ```
//!
//! # Rules
//!
//! | Check | Limit |
//! |-------|-------|
//! | Capacity | rating (air or ground) ≥ load × 1.15 |
//! | Voltage drop, single phase | 2 × L × R × I ≤ 3 % of nominal |
//! | Voltage drop, three phase | √3 × L × R × I ≤ 5 % of nominal |
//!
//! The drop check uses the actual load current, not the derated one.

pub mod engine;
pub mod error;
pub mod input;
pub mod record;
pub mod schedule;
pub mod table;
pub mod types;

// Re-exports for convenience
pub use engine::{
    describe, design_current, max_voltage_drop, select_cable, voltage_drop, CableSizer,
    CalculationResult, NO_SUITABLE_CABLE, SAFETY_FACTOR,
};
pub use error::{CalcError, Result};
pub use input::CalculationInput;
pub use record::CableCalculation;
pub use schedule::{
    read_schedule, size_schedule, write_schedule, CableRun, ScheduleSummary, SupplyConditions,
};
pub use table::{standard_table, CableSpec, STANDARD_CABLES};
pub use types::{InstallationMethod, Phase};
