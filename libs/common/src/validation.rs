//! CSV and configuration validation utilities
//!
//! Header validation compares an actual CSV header row against the field
//! names a record type declares through [`CsvFields`].

use std::collections::HashSet;
use std::path::Path;

use cable_calc::CableRun;
use errors::{SiteError, SiteResult};

/// Types that can be read from CSV files with a known header layout
pub trait CsvFields {
    /// Expected CSV header field names in order
    fn field_names() -> Vec<String>;

    /// Fields that must appear in the header
    fn required_fields() -> Vec<String> {
        Self::field_names()
    }

    /// Fields that may be left out entirely
    fn optional_fields() -> Vec<String> {
        vec![]
    }
}

impl CsvFields for CableRun {
    fn field_names() -> Vec<String> {
        [
            "tag",
            "from",
            "to",
            "load",
            "length",
            "cable_size",
            "voltage_drop",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn required_fields() -> Vec<String> {
        ["tag", "from", "to", "load", "length"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn optional_fields() -> Vec<String> {
        vec!["cable_size".to_string(), "voltage_drop".to_string()]
    }
}

/// Result of a header check
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderCheck {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl HeaderCheck {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Turn collected errors into a validation error
    pub fn into_result(self) -> SiteResult<Vec<String>> {
        if self.errors.is_empty() {
            Ok(self.warnings)
        } else {
            Err(SiteError::Validation(self.errors.join("; ")))
        }
    }
}

pub struct CsvHeaderValidator;

impl CsvHeaderValidator {
    /// Read the header row of `csv_path` and check it against `T`
    pub fn validate_csv_header<T: CsvFields>(csv_path: &Path) -> SiteResult<HeaderCheck> {
        if !csv_path.exists() {
            return Err(SiteError::FileNotFound(csv_path.display().to_string()));
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(csv_path)?;
        let actual: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();

        Ok(Self::validate_headers::<T>(
            &actual,
            &csv_path.display().to_string(),
        ))
    }

    /// Check a header row; `source` names the file in messages
    pub fn validate_headers<T: CsvFields>(actual: &[String], source: &str) -> HeaderCheck {
        let expected = T::field_names();
        let required = T::required_fields();

        let actual_set: HashSet<&String> = actual.iter().collect();
        let expected_set: HashSet<&String> = expected.iter().collect();

        let mut check = HeaderCheck::default();

        // Keep declaration order so messages are stable
        let missing: Vec<&str> = required
            .iter()
            .filter(|field| !actual_set.contains(field))
            .map(|s| s.as_str())
            .collect();
        if !missing.is_empty() {
            check.errors.push(format!(
                "Missing required fields in {}: [{}]",
                source,
                missing.join(", ")
            ));
        }

        let extra: Vec<&str> = actual
            .iter()
            .filter(|field| !expected_set.contains(field))
            .map(|s| s.as_str())
            .collect();
        if !extra.is_empty() {
            check.warnings.push(format!(
                "Extra fields found in {} (will be ignored): [{}]",
                source,
                extra.join(", ")
            ));
        }

        let known: Vec<&String> = actual
            .iter()
            .filter(|field| expected_set.contains(field))
            .collect();
        let declared: Vec<&String> = expected
            .iter()
            .filter(|field| actual_set.contains(field))
            .collect();
        if missing.is_empty() && known != declared {
            check.warnings.push(format!(
                "Field order in {} differs from expected (this is OK, just informational)",
                source
            ));
        }

        check
    }
}

/// Require a non-empty string value
pub fn ensure_non_empty(field: &str, value: &str) -> SiteResult<()> {
    if value.trim().is_empty() {
        return Err(SiteError::InvalidConfig {
            field: field.to_string(),
            reason: "must not be empty".to_string(),
        });
    }
    Ok(())
}

/// Require a finite value greater than zero
pub fn ensure_positive(field: &str, value: f64) -> SiteResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(SiteError::InvalidConfig {
            field: field.to_string(),
            reason: format!("must be a positive number, got {}", value),
        });
    }
    Ok(())
}

/// Require a probability in `[0, 1]`
pub fn ensure_fraction(field: &str, value: f64) -> SiteResult<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(SiteError::InvalidConfig {
            field: field.to_string(),
            reason: format!("must be between 0 and 1, got {}", value),
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use std::io::Write;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_exact_headers_pass() {
        let check = CsvHeaderValidator::validate_headers::<CableRun>(
            &CableRun::field_names(),
            "runs.csv",
        );
        assert!(check.is_valid());
        assert!(check.warnings.is_empty());
    }

    #[test]
    fn test_optional_columns_may_be_absent() {
        let actual = headers(&["tag", "from", "to", "load", "length"]);
        let check = CsvHeaderValidator::validate_headers::<CableRun>(&actual, "runs.csv");
        assert!(check.is_valid());
        assert!(check.warnings.is_empty());
    }

    #[test]
    fn test_missing_required_field() {
        let actual = headers(&["tag", "from", "to", "length"]);
        let check = CsvHeaderValidator::validate_headers::<CableRun>(&actual, "runs.csv");
        assert!(!check.is_valid());
        assert_eq!(
            check.errors,
            vec!["Missing required fields in runs.csv: [load]".to_string()]
        );
        assert!(matches!(
            check.into_result(),
            Err(SiteError::Validation(_))
        ));
    }

    #[test]
    fn test_extra_and_reordered_fields_warn() {
        let actual = headers(&["from", "tag", "to", "load", "length", "notes"]);
        let check = CsvHeaderValidator::validate_headers::<CableRun>(&actual, "runs.csv");
        assert!(check.is_valid());
        assert_eq!(check.warnings.len(), 2);
        assert!(check.warnings[0].contains("[notes]"));
        assert!(check.warnings[1].contains("Field order"));
    }

    #[test]
    fn test_validate_csv_file() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "tag, from, to, load, length").unwrap();
        writeln!(file, "C-01,MSB,DB-1,20,50").unwrap();

        let check = CsvHeaderValidator::validate_csv_header::<CableRun>(file.path()).unwrap();
        assert!(check.is_valid());

        let err = CsvHeaderValidator::validate_csv_header::<CableRun>(Path::new("/nope.csv"))
            .unwrap_err();
        assert!(matches!(err, SiteError::FileNotFound(_)));
    }

    #[test]
    fn test_value_helpers() {
        assert!(ensure_non_empty("logging.level", "info").is_ok());
        assert!(ensure_non_empty("logging.level", "  ").is_err());
        assert!(ensure_positive("calculator.voltage", 230.0).is_ok());
        assert!(ensure_positive("calculator.voltage", 0.0).is_err());
        assert!(ensure_positive("calculator.voltage", f64::NAN).is_err());
        assert!(ensure_fraction("sync.failure_rate", 0.25).is_ok());
        assert!(ensure_fraction("sync.failure_rate", 1.5).is_err());
        assert!(ensure_fraction("sync.failure_rate", f64::NAN).is_err());
    }
}
