//! Installing a staged package

use pricemonitor_core::Result;
use semver::Version;
use std::path::Path;
use tracing::info;

/// Hands a staged package over to the system
pub trait Installer: Send + Sync {
    fn install(&self, package: &Path, version: &Version) -> Result<()>;
}

/// Marks the package executable and leaves the switch-over to the operator
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutableInstaller;

impl Installer for ExecutableInstaller {
    fn install(&self, package: &Path, version: &Version) -> Result<()> {
        mark_executable(package)?;

        info!(
            package = %package.display(),
            version = %version,
            "Package staged; restart the kiosk from it to finish the update"
        );
        Ok(())
    }
}

/// Add the execute bits to `package`
pub(crate) fn mark_executable(package: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let mut permissions = std::fs::metadata(package)?.permissions();
        permissions.set_mode(permissions.mode() | 0o755);
        std::fs::set_permissions(package, permissions)?;
    }
    #[cfg(not(unix))]
    let _ = package;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_marks_package_executable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let package = dir.path().join("price-monitor");
        std::fs::write(&package, b"package").unwrap();

        ExecutableInstaller
            .install(&package, &Version::new(1, 5, 0))
            .unwrap();

        let mode = std::fs::metadata(&package).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
    }

    #[cfg(unix)]
    #[test]
    fn test_missing_package_fails() {
        let err = ExecutableInstaller
            .install(Path::new("/nonexistent/price-monitor"), &Version::new(1, 0, 0))
            .unwrap_err();
        assert_eq!(err.code, pricemonitor_core::ErrorCode::FileNotFound);
    }
}
