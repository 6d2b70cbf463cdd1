//! Logging setup for the price monitor kiosk
//!
//! - Structured logging with tracing, filtered by `RUST_LOG` or the
//!   configured level
//! - Daily log files when a log directory is configured, written off the hot
//!   path; stderr otherwise, since the terminal is the kiosk display
//! - A session id to correlate the lines of one run

use console::Term;
use once_cell::sync::Lazy;
use pricemonitor_core::config::LoggingConfig;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

/// Global session ID for correlating logs
static SESSION_ID: Lazy<String> = Lazy::new(|| Uuid::new_v4().to_string());

/// File name prefix of the daily log files
pub const LOG_FILE_PREFIX: &str = "price-monitor.log";

/// Get the current session ID
pub fn session_id() -> &'static str {
    &SESSION_ID
}

/// Telemetry configuration
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryConfig {
    pub log_level: String,
    /// Directory for daily rolling log files; replaces stderr when set
    pub log_dir: Option<PathBuf>,
    pub show_target: bool,
    /// Colour stderr output
    pub ansi: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: None,
            show_target: false,
            ansi: Term::stderr().is_term(),
        }
    }
}

impl TelemetryConfig {
    /// Build from the settings file, raised by `-v` flags
    pub fn from_logging(logging: &LoggingConfig, verbosity: u8) -> Self {
        let log_level = match verbosity {
            0 => logging.level.clone(),
            1 => "debug".to_string(),
            _ => "trace".to_string(),
        };
        let log_dir = if logging.file.trim().is_empty() {
            None
        } else {
            Some(PathBuf::from(shellexpand::tilde(logging.file.trim()).as_ref()))
        };

        Self {
            log_level,
            log_dir,
            show_target: verbosity > 1,
            ..Self::default()
        }
    }

    /// Whether log lines go to stderr rather than a log file
    pub fn logs_to_stderr(&self) -> bool {
        self.log_dir.is_none()
    }
}

/// Keeps the background log writer alive; dropping it flushes the file
#[derive(Default)]
pub struct TelemetryGuard {
    _file: Option<WorkerGuard>,
}

/// Initialize logging with custom configuration
pub fn init_with_config(config: TelemetryConfig) -> anyhow::Result<TelemetryGuard> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level)
            .map_err(|e| anyhow::anyhow!("Invalid log level '{}': {}", config.log_level, e))?,
    };

    let stderr_layer = config.logs_to_stderr().then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(config.show_target)
            .with_ansi(config.ansi)
            .compact()
    });

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .map_err(|e| anyhow::anyhow!("Cannot create log directory {}: {}", dir.display(), e))?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer);

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    tracing::info!(
        session_id = %session_id(),
        version = env!("CARGO_PKG_VERSION"),
        "Telemetry initialized"
    );

    Ok(TelemetryGuard { _file: guard })
}

/// Timer for measuring operation duration
pub struct Timer {
    name: &'static str,
    start: Instant,
}

impl Timer {
    /// Start a new timer
    pub fn start(name: &'static str) -> Self {
        Self {
            name,
            start: Instant::now(),
        }
    }

    /// Stop the timer and log the duration
    pub fn stop(self) -> Duration {
        let duration = self.start.elapsed();
        tracing::debug!(
            operation = self.name,
            duration_ms = duration.as_millis() as u64,
            "Timer completed"
        );
        duration
    }
}
