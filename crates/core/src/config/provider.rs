//! Settings providers
//!
//! The lookup path asks for a fresh snapshot every time a barcode is
//! submitted, so edits to the settings file take effect on the next scan.

use super::loader::load_config_file;
use super::schema::Settings;
use crate::error::Result;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::SystemTime;
use tracing::{debug, warn};

/// Source of the current settings
pub trait SettingsProvider: Send + Sync {
    /// Settings in effect right now
    fn snapshot(&self) -> Settings;
}

/// Fixed settings, never reloaded
#[derive(Debug, Clone)]
pub struct StaticSettings(Settings);

impl StaticSettings {
    pub fn new(settings: Settings) -> Self {
        Self(settings)
    }
}

impl SettingsProvider for StaticSettings {
    fn snapshot(&self) -> Settings {
        self.0.clone()
    }
}

/// Settings backed by a file, reloaded when its modification time changes
///
/// A reload that fails to parse or validate keeps the previous settings.
#[derive(Debug)]
pub struct FileSettings {
    path: PathBuf,
    state: Mutex<Cached>,
}

#[derive(Debug)]
struct Cached {
    settings: Settings,
    modified: Option<SystemTime>,
}

impl FileSettings {
    /// Load the file once and watch it for later changes
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let settings = read_validated(&path)?;
        let modified = modified_time(&path);

        Ok(Self {
            path,
            state: Mutex::new(Cached { settings, modified }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsProvider for FileSettings {
    fn snapshot(&self) -> Settings {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let modified = modified_time(&self.path);
        if modified != state.modified {
            match read_validated(&self.path) {
                Ok(settings) => {
                    debug!(path = %self.path.display(), "Settings reloaded");
                    state.settings = settings;
                }
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "Keeping previous settings");
                }
            }
            state.modified = modified;
        }

        state.settings.clone()
    }
}

/// Any provider with lookups forced to the head-office server
#[derive(Debug)]
pub struct ForceRemote<P>(P);

impl<P: SettingsProvider> ForceRemote<P> {
    pub fn new(inner: P) -> Self {
        Self(inner)
    }
}

impl<P: SettingsProvider> SettingsProvider for ForceRemote<P> {
    fn snapshot(&self) -> Settings {
        let mut settings = self.0.snapshot();
        settings.server.local_mode = false;
        settings
    }
}

fn read_validated(path: &Path) -> Result<Settings> {
    let mut settings = load_config_file(path)?;
    settings.apply_env()?;
    settings.validate()?;
    Ok(settings)
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn write(path: &Path, body: &str) {
        std::fs::write(path, body).unwrap();
    }

    #[test]
    fn test_static_settings() {
        let mut settings = Settings::default();
        settings.server.local_port = 9999;
        let provider = StaticSettings::new(settings.clone());
        assert_eq!(provider.snapshot(), settings);
    }

    #[test]
    fn test_force_remote() {
        let provider = ForceRemote::new(StaticSettings::new(Settings::default()));
        let settings = provider.snapshot();
        assert!(!settings.server.local_mode);
        assert_eq!(settings.active_base_url(), settings.remote_url());
    }

    #[test]
    fn test_file_settings_reload_on_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("price-monitor.toml");
        write(&path, "[server]\nlocal_mode = true\n");

        let provider = FileSettings::open(&path).unwrap();
        assert!(provider.snapshot().server.local_mode);

        // mtime granularity on some filesystems is one second
        std::thread::sleep(Duration::from_millis(1100));
        write(&path, "[server]\nlocal_mode = false\n");

        assert!(!provider.snapshot().server.local_mode);
    }

    #[test]
    fn test_file_settings_keep_previous_on_bad_edit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("price-monitor.toml");
        write(&path, "[timeouts]\nresult_secs = 7\n");

        let provider = FileSettings::open(&path).unwrap();
        assert_eq!(provider.snapshot().timeouts.result_secs, 7);

        std::thread::sleep(Duration::from_millis(1100));
        write(&path, "[timeouts]\nresult_secs = 0\n");

        assert_eq!(provider.snapshot().timeouts.result_secs, 7);
    }
}
