//! # Logging Utilities
//!
//! Logging infrastructure for the hatchery crates using `tracing`.
//!
//! `hatchery-core` emits structured events (rejected buffers at `debug`,
//! conversions at `trace`, composed contexts at `debug`) but never installs a
//! subscriber. Tools built on it call one of the initialisers here.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hatchery_utils::init_logging;
//!
//! // Initialize with default settings (reads from RUST_LOG env var)
//! init_logging().expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Set log level filter (e.g., `RUST_LOG=debug`, `RUST_LOG=hatchery_core=trace`)
//! - `HATCHERY_LOG_FORMAT`: Set output format (`json` or `pretty`, default: `pretty`)
//! - `HATCHERY_LOG_FILE`: Optional path to a log file, rotated daily (if not set, logs only to console)

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{env, io};

use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Environment variable selecting the output format
pub const LOG_FORMAT_ENV: &str = "HATCHERY_LOG_FORMAT";

/// Environment variable naming an optional log file
pub const LOG_FILE_ENV: &str = "HATCHERY_LOG_FILE";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat
{
    /// Pretty-printed, human-readable format (default for development)
    #[default]
    Pretty,
    /// JSON format (default for production)
    Json,
}

impl FromStr for LogFormat
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "pretty" | "dev" | "development" => Ok(LogFormat::Pretty),
            "json" | "prod" | "production" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {s}. Use 'pretty' or 'json'")),
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel
{
    /// Error level
    Error,
    /// Warning level
    Warn,
    /// Info level (default)
    #[default]
    Info,
    /// Debug level
    Debug,
    /// Trace level (most verbose)
    Trace,
}

impl From<LogLevel> for Level
{
    fn from(level: LogLevel) -> Self
    {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl FromStr for LogLevel
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "error" | "err" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(format!(
                "Unknown log level: {s}. Use 'error', 'warn', 'info', 'debug', or 'trace'"
            )),
        }
    }
}

/// Resolved logging configuration
///
/// Built from the environment by [`LogConfig::from_env`], or by hand.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogConfig
{
    /// Default level when `RUST_LOG` holds no usable filter
    pub level: LogLevel,
    /// Output format for every sink
    pub format: LogFormat,
    /// Optional daily-rotated log file, written in addition to stdout
    pub file: Option<PathBuf>,
}

impl LogConfig
{
    /// Read the configuration from the process environment.
    ///
    /// ## Errors
    ///
    /// `LoggingError::InvalidFormat` if `HATCHERY_LOG_FORMAT` is set to an
    /// unknown format.
    pub fn from_env() -> Result<Self, LoggingError>
    {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read the configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// `RUST_LOG` is only used for the default level when it is a bare level
    /// name; module filters such as `hatchery_core=debug` are still honoured
    /// by the filter when logging starts.
    ///
    /// ## Errors
    ///
    /// `LoggingError::InvalidFormat` if the format variable names an unknown
    /// format.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LoggingError>
    {
        let format = match lookup(LOG_FORMAT_ENV) {
            Some(value) => LogFormat::from_str(&value).map_err(LoggingError::InvalidFormat)?,
            None => LogFormat::default(),
        };

        let level = lookup("RUST_LOG")
            .and_then(|value| value.parse::<LogLevel>().ok())
            .unwrap_or_default();

        let file = lookup(LOG_FILE_ENV).filter(|path| !path.is_empty()).map(PathBuf::from);

        Ok(Self { level, format, file })
    }

    /// Install a global subscriber for this configuration.
    ///
    /// ## Errors
    ///
    /// `LoggingError::InitializationFailed` if a global subscriber is already
    /// installed or the log file cannot be opened, `LoggingError::FileError`
    /// if the log directory cannot be created.
    pub fn init(self) -> Result<(), LoggingError>
    {
        let default_level = Level::from(self.level);
        // RUST_LOG can override the default level with more specific filters
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level.to_string()));

        let mut layers = vec![console_layer(self.format)];
        if let Some(path) = &self.file {
            layers.push(file_layer(self.format, path)?);
        }

        Registry::default()
            .with(layers)
            .with(env_filter)
            .try_init()
            .map_err(|e| LoggingError::InitializationFailed(e.to_string()))
    }
}

/// Initialize logging with default settings
///
/// Reads configuration from environment variables:
/// - `RUST_LOG`: Log level filter (e.g., `debug`, `hatchery_core=debug`)
/// - `HATCHERY_LOG_FORMAT`: Output format (`json` or `pretty`, default: `pretty`)
/// - `HATCHERY_LOG_FILE`: Optional path to log file
///
/// ## Errors
///
/// Returns an error if:
/// - Logging is already initialized
/// - `HATCHERY_LOG_FORMAT` is not a known format
/// - File logging fails (if `HATCHERY_LOG_FILE` is set)
pub fn init_logging() -> Result<(), LoggingError>
{
    LogConfig::from_env()?.init()
}

/// Initialize logging with explicit level and format
///
/// `HATCHERY_LOG_FILE` is still honoured.
///
/// ## Example
///
/// ```rust,no_run
/// use hatchery_utils::{LogFormat, LogLevel, init_logging_with_level};
///
/// init_logging_with_level(LogLevel::Debug, LogFormat::Pretty)
///     .expect("Failed to initialize logging");
/// ```
///
/// ## Errors
///
/// Returns an error if logging is already initialized or file logging fails.
pub fn init_logging_with_level(level: LogLevel, format: LogFormat) -> Result<(), LoggingError>
{
    let file = env::var(LOG_FILE_ENV).ok().filter(|path| !path.is_empty()).map(PathBuf::from);
    LogConfig { level, format, file }.init()
}

fn console_layer(format: LogFormat) -> BoxedLayer
{
    match format {
        LogFormat::Pretty => fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_ansi(true)
            .with_writer(io::stdout)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(io::stdout)
            .boxed(),
    }
}

fn file_layer(format: LogFormat, path: &Path) -> Result<BoxedLayer, LoggingError>
{
    let directory = path.parent().filter(|dir| !dir.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let prefix = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| LoggingError::InitializationFailed(format!("not a file path: {}", path.display())))?;

    std::fs::create_dir_all(directory)?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .build(directory)
        .map_err(|e| LoggingError::InitializationFailed(e.to_string()))?;
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    // The worker must outlive every event; the subscriber is global.
    std::mem::forget(guard);

    let layer = match format {
        LogFormat::Pretty => fmt::layer()
            .with_writer(non_blocking)
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_ansi(false) // No ANSI in files
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(non_blocking)
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_current_span(true)
            .with_span_list(true)
            .boxed(),
    };
    Ok(layer)
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    /// Invalid log format
    #[error("Invalid log format: {0}")]
    InvalidFormat(String),

    /// Failed to initialize logging
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),

    /// File logging error
    #[error("File logging error: {0}")]
    FileError(#[from] io::Error),
}

#[cfg(test)]
mod tests
{
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String>
    {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_log_format_from_str()
    {
        assert_eq!(LogFormat::from_str("pretty").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("json").unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::from_str("dev").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("prod").unwrap(), LogFormat::Json);
        assert!(LogFormat::from_str("invalid").is_err());
    }

    #[test]
    fn test_log_level_from_str()
    {
        assert_eq!(LogLevel::from_str("error").unwrap(), LogLevel::Error);
        assert_eq!(LogLevel::from_str("warn").unwrap(), LogLevel::Warn);
        assert_eq!(LogLevel::from_str("info").unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::from_str("debug").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("trace").unwrap(), LogLevel::Trace);
        assert!(LogLevel::from_str("invalid").is_err());
    }

    #[test]
    fn test_log_level_to_tracing_level()
    {
        assert_eq!(Level::from(LogLevel::Error), Level::ERROR);
        assert_eq!(Level::from(LogLevel::Warn), Level::WARN);
        assert_eq!(Level::from(LogLevel::Info), Level::INFO);
        assert_eq!(Level::from(LogLevel::Debug), Level::DEBUG);
        assert_eq!(Level::from(LogLevel::Trace), Level::TRACE);
    }

    #[test]
    fn test_config_defaults_with_empty_environment()
    {
        let config = LogConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, LogConfig::default());
        assert_eq!(config.level, LogLevel::Info);
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(config.file, None);
    }

    #[test]
    fn test_config_reads_variables()
    {
        let config = LogConfig::from_lookup(lookup(&[
            ("RUST_LOG", "debug"),
            (LOG_FORMAT_ENV, "json"),
            (LOG_FILE_ENV, "/tmp/hatchery.log"),
        ]))
        .unwrap();
        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.file, Some(PathBuf::from("/tmp/hatchery.log")));
    }

    #[test]
    fn test_config_module_filter_keeps_default_level()
    {
        let config = LogConfig::from_lookup(lookup(&[("RUST_LOG", "hatchery_core=trace")])).unwrap();
        assert_eq!(config.level, LogLevel::Info);
    }

    #[test]
    fn test_config_rejects_unknown_format()
    {
        let err = LogConfig::from_lookup(lookup(&[(LOG_FORMAT_ENV, "xml")])).unwrap_err();
        assert!(matches!(err, LoggingError::InvalidFormat(_)));
        assert!(err.to_string().contains("xml"));
    }
}
