//! Shared infrastructure for SiteWorks tools
//!
//! - configuration loading (defaults, file, environment)
//! - logging setup
//! - CSV header and config value validation
//! - shutdown signal handling

pub mod config_loader;
pub mod logging;
pub mod shutdown;
pub mod validation;

pub use config_loader::{
    load_config, load_config_with, CalculatorConfig, LoggingConfig, SiteConfig, SyncConfig,
    DEFAULT_CONFIG_FILES, ENV_PREFIX,
};
pub use logging::{init_logging, BracketedLevelFormat, LogConfig, LOG_DIR_ENV};
pub use shutdown::{run_until_shutdown, wait_for_shutdown};
pub use validation::{CsvFields, CsvHeaderValidator, HeaderCheck};
