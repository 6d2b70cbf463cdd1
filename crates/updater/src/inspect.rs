//! Reading the version of a downloaded package

use crate::install::mark_executable;
use pricemonitor_core::process::run_command;
use pricemonitor_core::{Error, Result};
use semver::Version;
use std::path::Path;
use tracing::debug;

/// Reports the version a package would install
pub trait PackageInspector: Send + Sync {
    fn version(&self, package: &Path) -> Result<Version>;
}

/// Runs the package with the configured arguments and reads the version it prints
///
/// The package is marked executable before it is run.
#[derive(Debug, Clone)]
pub struct ProcessInspector {
    args: Vec<String>,
}

impl ProcessInspector {
    pub fn new(args: Vec<String>) -> Self {
        Self { args }
    }
}

impl Default for ProcessInspector {
    fn default() -> Self {
        Self::new(vec!["--version".to_string()])
    }
}

impl PackageInspector for ProcessInspector {
    fn version(&self, package: &Path) -> Result<Version> {
        let program = package.display().to_string();
        mark_executable(package)?;
        let result = run_command(package, &self.args)?.ensure_success(&program)?;
        debug!(package = %program, output = %result.stdout.trim(), "Version query finished");
        parse_version_output(&result.stdout)
    }
}

/// First semantic version found in `output`, `v` prefix allowed
pub fn parse_version_output(output: &str) -> Result<Version> {
    output
        .split_whitespace()
        .map(|word| {
            word.trim_start_matches(['v', 'V'])
                .trim_matches(|c: char| !c.is_ascii_alphanumeric())
        })
        .find_map(|word| Version::parse(word).ok())
        .ok_or_else(|| {
            Error::update("Package did not report a version")
                .with_context(output.trim().to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_version() {
        assert_eq!(parse_version_output("1.5.0\n").unwrap(), Version::new(1, 5, 0));
    }

    #[test]
    fn test_parse_version_in_banner() {
        let version = parse_version_output("price-monitor v2.0.1 (built 2026-03-01)").unwrap();
        assert_eq!(version, Version::new(2, 0, 1));
    }

    #[test]
    fn test_parse_prerelease() {
        let version = parse_version_output("PriceMonitor 1.6.0-rc.1").unwrap();
        assert_eq!(version.major, 1);
        assert!(!version.pre.is_empty());
    }

    #[test]
    fn test_parse_missing_version() {
        let err = parse_version_output("usage: price-monitor [run]").unwrap_err();
        assert_eq!(err.code, pricemonitor_core::ErrorCode::UpdateError);
    }

    #[cfg(unix)]
    #[test]
    fn test_missing_package_is_reported() {
        let inspector = ProcessInspector::default();
        let err = inspector
            .version(Path::new("/nonexistent/price-monitor"))
            .unwrap_err();
        assert_eq!(err.code, pricemonitor_core::ErrorCode::FileNotFound);
    }

    #[cfg(unix)]
    #[test]
    fn test_fresh_download_is_run() {
        let dir = tempfile::tempdir().unwrap();
        let package = dir.path().join("price-monitor");
        std::fs::write(&package, "#!/bin/sh\necho \"price-monitor 1.7.2\"\n").unwrap();

        let version = ProcessInspector::default().version(&package).unwrap();

        assert_eq!(version, Version::new(1, 7, 2));
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_package_is_command_failure() {
        let dir = tempfile::tempdir().unwrap();
        let package = dir.path().join("price-monitor");
        std::fs::write(&package, "#!/bin/sh\nexit 3\n").unwrap();

        let err = ProcessInspector::default().version(&package).unwrap_err();

        assert_eq!(err.code, pricemonitor_core::ErrorCode::CommandFailed);
    }
}
