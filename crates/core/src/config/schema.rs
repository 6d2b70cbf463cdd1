//! Settings schema definitions
//!
//! Everything the kiosk reads from `price-monitor.toml`. Missing sections and
//! keys fall back to the defaults below.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root settings schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub timeouts: TimeoutConfig,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub update: UpdateConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Price service endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// In-store server host (`server` is the pre-1.3 key)
    #[serde(default = "default_local_host", alias = "server")]
    pub local_host: String,

    /// In-store server port (`port` is the pre-1.3 key)
    #[serde(default = "default_local_port", alias = "port")]
    pub local_port: u16,

    /// Head-office server host
    #[serde(default = "default_remote_host")]
    pub remote_host: String,

    /// Head-office server port
    #[serde(default = "default_remote_port")]
    pub remote_port: u16,

    /// Use the in-store server for lookups
    #[serde(default = "default_true")]
    pub local_mode: bool,

    /// URL scheme for both endpoints
    #[serde(default = "default_scheme")]
    pub scheme: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            local_host: default_local_host(),
            local_port: default_local_port(),
            remote_host: default_remote_host(),
            remote_port: default_remote_port(),
            local_mode: true,
            scheme: default_scheme(),
        }
    }
}

fn default_local_host() -> String {
    "192.168.0.100".to_string()
}

fn default_local_port() -> u16 {
    8080
}

fn default_remote_host() -> String {
    "185.129.0.46".to_string()
}

fn default_remote_port() -> u16 {
    8081
}

fn default_scheme() -> String {
    "http".to_string()
}

fn default_true() -> bool {
    true
}

/// Network and display timeouts, in whole seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Bound on establishing the connection
    #[serde(default = "default_five")]
    pub connection_secs: u64,

    /// How long a result or dialog stays on screen
    #[serde(default = "default_five")]
    pub result_secs: u64,

    /// Overall deadline for one lookup, body read included
    #[serde(default = "default_request_secs")]
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connection_secs: default_five(),
            result_secs: default_five(),
            request_secs: default_request_secs(),
        }
    }
}

impl TimeoutConfig {
    pub fn connection(&self) -> Duration {
        Duration::from_secs(self.connection_secs)
    }

    pub fn result(&self) -> Duration {
        Duration::from_secs(self.result_secs)
    }

    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }
}

fn default_five() -> u64 {
    5
}

fn default_request_secs() -> u64 {
    15
}

/// Screen presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Text size used by graphical front ends; the terminal switches to the
    /// banner layout at 40 and above
    #[serde(default = "default_text_size")]
    pub text_size: f32,

    /// Suffix appended to every formatted price
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            text_size: default_text_size(),
            currency: default_currency(),
        }
    }
}

fn default_text_size() -> f32 {
    40.0
}

fn default_currency() -> String {
    "AZN".to_string()
}

/// Self-update settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateConfig {
    /// File fetched from the remote server root
    #[serde(default = "default_package_name")]
    pub package_name: String,

    /// Where the package is staged (shell-expanded)
    #[serde(default = "default_download_dir")]
    pub download_dir: String,

    /// Arguments passed to the staged package to make it print its version
    #[serde(default = "default_version_probe")]
    pub version_probe: Vec<String>,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            package_name: default_package_name(),
            download_dir: default_download_dir(),
            version_probe: default_version_probe(),
        }
    }
}

fn default_package_name() -> String {
    "price-monitor".to_string()
}

fn default_download_dir() -> String {
    "~/Downloads".to_string()
}

fn default_version_probe() -> Vec<String> {
    vec!["--version".to_string()]
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for daily log files; empty logs to stderr
    #[serde(default)]
    pub file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: String::new(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
