//! Error types for cable-calc

use errors::{ErrorCategory, SiteErrorTrait};
use thiserror::Error;

/// Calculation errors
///
/// The sizing scan itself never fails; these cover input parsing, custom
/// reference tables and schedule files.
#[derive(Debug, Error)]
pub enum CalcError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid cable table: {0}")]
    InvalidTable(String),

    #[error("Schedule error: {0}")]
    Schedule(#[from] csv::Error),
}

impl CalcError {
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_table(msg: impl Into<String>) -> Self {
        Self::InvalidTable(msg.into())
    }
}

impl SiteErrorTrait for CalcError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "INVALID_INPUT",
            Self::InvalidTable(_) => "INVALID_TABLE",
            Self::Schedule(_) => "SCHEDULE_ERROR",
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput { .. } | Self::InvalidTable(_) => ErrorCategory::Validation,
            Self::Schedule(_) => ErrorCategory::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, CalcError>;
