//! Settings file loading

use super::schema::Settings;
use crate::error::{Error, ErrorCode, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Environment variables that override file values
const ENV_LOCAL_HOST: &str = "PRICEMON_LOCAL_HOST";
const ENV_LOCAL_PORT: &str = "PRICEMON_LOCAL_PORT";
const ENV_REMOTE_HOST: &str = "PRICEMON_REMOTE_HOST";
const ENV_REMOTE_PORT: &str = "PRICEMON_REMOTE_PORT";
const ENV_LOCAL_MODE: &str = "PRICEMON_LOCAL_MODE";
const ENV_CONNECTION_TIMEOUT: &str = "PRICEMON_CONNECTION_TIMEOUT";
const ENV_RESULT_TIMEOUT: &str = "PRICEMON_RESULT_TIMEOUT";

/// Settings together with the file they came from
#[derive(Debug, Clone)]
pub struct Config {
    pub settings: Settings,
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load settings from a file path, the standard locations, or defaults
    ///
    /// An explicit path that does not exist is an error; a missing file in
    /// the standard locations is not.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) if !p.exists() => return Err(Error::config_not_found(p)),
            Some(p) => Some(p.to_path_buf()),
            None => find_config_file(),
        };

        let mut settings = if let Some(ref p) = config_path {
            load_config_file(p)?
        } else {
            Settings::default()
        };

        settings.apply_env()?;
        settings.validate()?;

        Ok(Self {
            settings,
            path: config_path,
        })
    }

    /// Defaults only (no file, no environment)
    pub fn defaults() -> Self {
        Self {
            settings: Settings::default(),
            path: None,
        }
    }
}

/// Find the settings file in standard locations
pub fn find_config_file() -> Option<PathBuf> {
    let mut candidates = vec![
        PathBuf::from("price-monitor.toml"),
        PathBuf::from(".price-monitor.toml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("price-monitor").join("config.toml"));
    }

    candidates.into_iter().find(|candidate| candidate.exists())
}

/// Read and parse a TOML settings file
pub fn load_config_file(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::from(e).with_context(format!("Reading settings file {}", path.display()))
    })?;

    Settings::from_toml(&content)
        .map_err(|e| e.with_context(format!("Parsing settings file {}", path.display())))
}

impl Settings {
    /// Parse settings from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `PRICEMON_*` overrides from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from any key lookup
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(host) = lookup(ENV_LOCAL_HOST) {
            self.server.local_host = host;
        }
        if let Some(port) = lookup(ENV_LOCAL_PORT) {
            self.server.local_port = parse_override(ENV_LOCAL_PORT, &port)?;
        }
        if let Some(host) = lookup(ENV_REMOTE_HOST) {
            self.server.remote_host = host;
        }
        if let Some(port) = lookup(ENV_REMOTE_PORT) {
            self.server.remote_port = parse_override(ENV_REMOTE_PORT, &port)?;
        }
        if let Some(mode) = lookup(ENV_LOCAL_MODE) {
            self.server.local_mode = match mode.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                other => {
                    return Err(Error::config(format!(
                        "{ENV_LOCAL_MODE} must be a boolean, got '{other}'"
                    )));
                }
            };
        }
        if let Some(secs) = lookup(ENV_CONNECTION_TIMEOUT) {
            self.timeouts.connection_secs = parse_override(ENV_CONNECTION_TIMEOUT, &secs)?;
        }
        if let Some(secs) = lookup(ENV_RESULT_TIMEOUT) {
            self.timeouts.result_secs = parse_override(ENV_RESULT_TIMEOUT, &secs)?;
        }
        Ok(())
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        let server = &self.server;
        if server.local_host.trim().is_empty() {
            return Err(Error::config_validation("server.local_host cannot be empty"));
        }
        if server.remote_host.trim().is_empty() {
            return Err(Error::config_validation("server.remote_host cannot be empty"));
        }
        if server.local_port == 0 || server.remote_port == 0 {
            return Err(Error::config_validation("server ports cannot be zero"));
        }
        if server.scheme != "http" && server.scheme != "https" {
            return Err(Error::config_validation("server.scheme must be http or https"));
        }

        let timeouts = &self.timeouts;
        if timeouts.connection_secs == 0 {
            return Err(Error::config_validation("timeouts.connection_secs must be at least 1"));
        }
        if timeouts.result_secs == 0 {
            return Err(Error::config_validation("timeouts.result_secs must be at least 1"));
        }
        if timeouts.request_secs < timeouts.connection_secs {
            return Err(Error::config_validation(
                "timeouts.request_secs cannot be shorter than timeouts.connection_secs",
            ));
        }

        if self.update.package_name.trim().is_empty() || self.update.package_name.contains('/') {
            return Err(Error::config_validation(
                "update.package_name must be a plain file name",
            ));
        }

        Ok(())
    }

    /// Base URL of the in-store server
    pub fn local_url(&self) -> String {
        format!(
            "{}://{}:{}",
            self.server.scheme, self.server.local_host, self.server.local_port
        )
    }

    /// Base URL of the head-office server
    pub fn remote_url(&self) -> String {
        format!(
            "{}://{}:{}",
            self.server.scheme, self.server.remote_host, self.server.remote_port
        )
    }

    /// Base URL selected by `local_mode`
    pub fn active_base_url(&self) -> String {
        if self.server.local_mode {
            self.local_url()
        } else {
            self.remote_url()
        }
    }

    /// Download directory with `~` and variables expanded
    pub fn download_dir(&self) -> Result<PathBuf> {
        shellexpand::full(&self.update.download_dir)
            .map(|expanded| PathBuf::from(expanded.as_ref()))
            .map_err(|e| {
                Error::config(format!(
                    "Cannot expand update.download_dir '{}': {}",
                    self.update.download_dir, e
                ))
            })
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::new(ErrorCode::Internal, format!("TOML render error: {e}")))
    }
}

fn parse_override<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        Error::config(format!("{key} has an invalid value '{value}'"))
            .with_suggestion(format!("Unset {key} or give it a whole number"))
    })
}
