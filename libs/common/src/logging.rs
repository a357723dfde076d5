//! Logging setup for SiteWorks tools
//!
//! Console output goes to stderr so machine-readable stdout stays clean.
//! When a log directory is configured, a daily rolling file is written
//! alongside the console.

use std::path::PathBuf;
use std::sync::OnceLock;

use errors::{SiteError, SiteResult};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{
        self,
        format::Writer,
        FmtContext, FormatEvent, FormatFields,
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::config_loader::LoggingConfig;

/// Environment variable that overrides the log directory
pub const LOG_DIR_ENV: &str = "SITEWORKS_LOG_DIR";

fn format_level(level: &Level) -> &'static str {
    match *level {
        Level::TRACE => "[TRACE]",
        Level::DEBUG => "[DEBUG]",
        Level::INFO => "[INFO]",
        Level::WARN => "[WARN]",
        Level::ERROR => "[ERROR]",
    }
}

/// Event formatter producing `timestamp [LEVEL] message fields`
///
/// Example: `2026-03-02T09:14:05.120331Z [WARN] Retry attempt 1 for task, backing off`
pub struct BracketedLevelFormat;

impl<S, N> FormatEvent<S, N> for BracketedLevelFormat
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let now = chrono::Utc::now();
        write!(writer, "{} ", now.format("%Y-%m-%dT%H:%M:%S%.6fZ"))?;

        let level = *event.metadata().level();
        if writer.has_ansi_escapes() {
            let color = match level {
                Level::TRACE => "\x1b[35m",
                Level::DEBUG => "\x1b[34m",
                Level::INFO => "\x1b[32m",
                Level::WARN => "\x1b[33m",
                Level::ERROR => "\x1b[31m",
            };
            write!(writer, "{}{}\x1b[0m ", color, format_level(&level))?;
        } else {
            write!(writer, "{} ", format_level(&level))?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

// Keeps the non-blocking file writer flushing until process exit
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Logger configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Used as the log file name prefix
    pub app_name: String,
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// Directory for daily log files; console only when `None`
    pub log_dir: Option<PathBuf>,
    /// JSON lines in the log file
    pub json: bool,
    /// Colored console output
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            app_name: "sitectl".to_string(),
            level: "info".to_string(),
            log_dir: log_dir_from_env(),
            json: false,
            ansi: true,
        }
    }
}

impl LogConfig {
    /// Build from the `[logging]` config section
    ///
    /// `SITEWORKS_LOG_DIR` takes priority over the configured directory.
    pub fn from_settings(app_name: &str, settings: &LoggingConfig) -> Self {
        Self {
            app_name: app_name.to_string(),
            level: settings.level.clone(),
            log_dir: log_dir_from_env().or_else(|| settings.dir.clone()),
            json: settings.json,
            ansi: true,
        }
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }
}

fn log_dir_from_env() -> Option<PathBuf> {
    std::env::var(LOG_DIR_ENV)
        .ok()
        .filter(|dir| !dir.trim().is_empty())
        .map(PathBuf::from)
}

/// Resolve the active filter: `RUST_LOG` wins over the configured level
pub fn build_filter(level: &str) -> SiteResult<EnvFilter> {
    let directive = std::env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| level.to_string());

    EnvFilter::try_new(&directive).map_err(|e| SiteError::InvalidConfig {
        field: "logging.level".to_string(),
        reason: format!("invalid filter '{}': {}", directive, e),
    })
}

/// Install the global subscriber
///
/// Fails if the filter is invalid, the log directory cannot be created,
/// or a subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> SiteResult<()> {
    let filter = build_filter(&config.level)?;

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(config.ansi)
        .event_format(BracketedLevelFormat)
        .boxed();

    let file_layer = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender =
                tracing_appender::rolling::daily(dir, format!("{}.log", config.app_name));
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);

            let layer = if config.json {
                fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_target(true)
                    .boxed()
            } else {
                fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .event_format(BracketedLevelFormat)
                    .boxed()
            };
            Some(layer)
        },
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| SiteError::Internal(format!("Failed to install logger: {}", e)))?;

    match &config.log_dir {
        Some(dir) => tracing::debug!("Logging: {} @ {}", config.app_name, dir.display()),
        None => tracing::debug!("Logging: {} (console only)", config.app_name),
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_bracketed_format() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_writer(move || writer.clone())
                .with_ansi(false)
                .event_format(BracketedLevelFormat),
        );

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(task_id = "abc", "Retry attempt 1 for task, backing off");
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains(" [WARN] Retry attempt 1 for task, backing off"));
        assert!(output.contains("task_id=\"abc\""));
        assert!(output.ends_with('\n'));
        // timestamp comes first
        assert!(output.chars().next().unwrap().is_ascii_digit());
    }

    #[test]
    fn test_build_filter_rejects_garbage() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        assert!(build_filter("info,sync_queue=debug").is_ok());
        let err = build_filter("sync_queue=loud").unwrap_err();
        assert!(matches!(err, SiteError::InvalidConfig { .. }));
    }

    #[test]
    fn test_log_config_from_settings() {
        let settings = LoggingConfig {
            level: "debug".to_string(),
            dir: Some(PathBuf::from("/tmp/siteworks-logs")),
            json: true,
        };
        let config = LogConfig::from_settings("sitectl", &settings).with_ansi(false);
        assert_eq!(config.app_name, "sitectl");
        assert_eq!(config.level, "debug");
        assert!(config.json);
        assert!(!config.ansi);
        if std::env::var(LOG_DIR_ENV).is_err() {
            assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/siteworks-logs")));
        }
    }
}
