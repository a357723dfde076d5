//! Configuration loading
//!
//! Priority (highest to lowest):
//! 1. Environment variables (`SITEWORKS_` prefix, `__` separates sections)
//! 2. Config file (TOML, YAML or JSON, chosen by extension)
//! 3. Built-in defaults
//!
//! Example: `SITEWORKS_SYNC__MAX_RETRIES=5` overrides `sync.max_retries`.

use cable_calc::{InstallationMethod, Phase, SupplyConditions};
use errors::{SiteError, SiteResult};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use sync_queue::RetryPolicy;
use tracing::{debug, info};

use crate::validation::{ensure_fraction, ensure_non_empty, ensure_positive};

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "SITEWORKS_";

/// Config files looked up when no path is given
pub const DEFAULT_CONFIG_FILES: [&str; 3] = ["sitectl.toml", "sitectl.yaml", "sitectl.json"];

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub logging: LoggingConfig,
    pub calculator: CalculatorConfig,
    pub sync: SyncConfig,
}

/// Logging section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `info,sync_queue=debug`
    pub level: String,
    /// Directory for the daily log file; no file logging when unset
    pub dir: Option<PathBuf>,
    /// Write the file log as JSON lines
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: None,
            json: false,
        }
    }
}

/// Calculator defaults applied when the command line leaves them out
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorConfig {
    /// Nominal supply voltage (V)
    pub voltage: f64,
    pub method: InstallationMethod,
    pub phase: Phase,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        let conditions = SupplyConditions::default();
        Self {
            voltage: conditions.nominal_voltage,
            method: conditions.method,
            phase: conditions.phase,
        }
    }
}

impl CalculatorConfig {
    pub fn conditions(&self) -> SupplyConditions {
        SupplyConditions {
            nominal_voltage: self.voltage,
            method: self.method,
            phase: self.phase,
        }
    }
}

/// Sync queue section
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    /// Latency of the simulated remote
    pub simulated_latency_ms: u64,
    /// Probability in `[0, 1]` that a simulated push fails
    pub failure_rate: f64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_retries: policy.max_retries,
            initial_backoff_ms: policy.initial_backoff.as_millis() as u64,
            simulated_latency_ms: 500,
            failure_rate: 0.0,
        }
    }
}

impl SyncConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_retries,
            Duration::from_millis(self.initial_backoff_ms),
        )
    }

    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }
}

impl SiteConfig {
    /// Check values that deserialize fine but make no sense
    pub fn validate(&self) -> SiteResult<()> {
        ensure_non_empty("logging.level", &self.logging.level)?;
        ensure_positive("calculator.voltage", self.calculator.voltage)?;
        ensure_fraction("sync.failure_rate", self.sync.failure_rate)?;
        Ok(())
    }
}

/// Load configuration from an explicit file or the default locations
pub fn load_config(path: Option<&Path>) -> SiteResult<SiteConfig> {
    let path = match path {
        Some(path) => {
            if !path.exists() {
                return Err(SiteError::FileNotFound(path.display().to_string()));
            }
            Some(path.to_path_buf())
        },
        None => DEFAULT_CONFIG_FILES
            .iter()
            .map(PathBuf::from)
            .find(|candidate| candidate.exists()),
    };

    match &path {
        Some(path) => info!("Loading configuration from {}", path.display()),
        None => debug!("No config file found, using defaults"),
    }

    load_config_with(path.as_deref(), ENV_PREFIX)
}

/// Load configuration from an optional file and a given env prefix
pub fn load_config_with(path: Option<&Path>, env_prefix: &str) -> SiteResult<SiteConfig> {
    let mut figment = Figment::from(Serialized::defaults(SiteConfig::default()));

    if let Some(path) = path {
        figment = merge_file(figment, path)?;
    }

    let config: SiteConfig = figment
        .merge(Env::prefixed(env_prefix).split("__"))
        .extract()
        .map_err(|e| SiteError::Configuration(format!("Failed to load configuration: {}", e)))?;

    config.validate()?;
    Ok(config)
}

fn merge_file(figment: Figment, path: &Path) -> SiteResult<Figment> {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| SiteError::Configuration("Config file must have an extension".to_string()))?;

    match extension {
        "toml" => Ok(figment.merge(Toml::file(path))),
        "yaml" | "yml" => Ok(figment.merge(Yaml::file(path))),
        "json" => Ok(figment.merge(Json::file(path))),
        _ => Err(SiteError::Configuration(format!(
            "Unsupported config file format: {}",
            extension
        ))),
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = load_config_with(None, "SITEWORKS_TEST_DEFAULTS_").unwrap();
        assert_eq!(config, SiteConfig::default());
        assert_eq!(config.sync.retry_policy(), RetryPolicy::default());
        assert_eq!(config.calculator.conditions(), SupplyConditions::default());
    }

    #[test]
    fn test_toml_file_overrides_defaults() {
        let file = write_file(
            ".toml",
            r#"
[calculator]
voltage = 400.0
phase = "three"
method = "ground"

[sync]
initial_backoff_ms = 250
"#,
        );

        let config = load_config_with(Some(file.path()), "SITEWORKS_TEST_TOML_").unwrap();
        assert_eq!(config.calculator.voltage, 400.0);
        assert_eq!(config.calculator.phase, Phase::Three);
        assert_eq!(config.calculator.method, InstallationMethod::Ground);
        assert_eq!(
            config.sync.retry_policy().initial_backoff,
            Duration::from_millis(250)
        );
        // untouched keys keep defaults
        assert_eq!(config.sync.max_retries, 3);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_yaml_file() {
        let file = write_file(".yaml", "logging:\n  level: debug\n  json: true\n");
        let config = load_config_with(Some(file.path()), "SITEWORKS_TEST_YAML_").unwrap();
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn test_env_overrides_file() {
        let file = write_file(".toml", "[sync]\nmax_retries = 5\n");
        std::env::set_var("SITEWORKS_TEST_ENV_SYNC__MAX_RETRIES", "7");

        let config = load_config_with(Some(file.path()), "SITEWORKS_TEST_ENV_").unwrap();
        assert_eq!(config.sync.max_retries, 7);

        std::env::remove_var("SITEWORKS_TEST_ENV_SYNC__MAX_RETRIES");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let file = write_file(".toml", "[sync]\nfailure_rate = 1.5\n");
        let err = load_config_with(Some(file.path()), "SITEWORKS_TEST_INVALID_").unwrap_err();
        assert!(matches!(err, SiteError::InvalidConfig { .. }));

        let file = write_file(".toml", "[calculator]\nphase = \"two\"\n");
        let err = load_config_with(Some(file.path()), "SITEWORKS_TEST_BADPHASE_").unwrap_err();
        assert!(matches!(err, SiteError::Configuration(_)));
    }

    #[test]
    fn test_unsupported_extension_and_missing_file() {
        let file = write_file(".ini", "x=1");
        assert!(load_config_with(Some(file.path()), "SITEWORKS_TEST_INI_").is_err());

        let err = load_config(Some(Path::new("/nonexistent/sitectl.toml"))).unwrap_err();
        assert!(matches!(err, SiteError::FileNotFound(_)));
    }
}
