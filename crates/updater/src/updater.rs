//! Download, verify, compare and stage

use crate::inspect::{PackageInspector, ProcessInspector};
use crate::install::{ExecutableInstaller, Installer};
use pricemonitor_api_client::{ApiError, ClientConfig, DownloadedPackage, PriceClient};
use pricemonitor_core::config::Settings;
use pricemonitor_core::error::ResultExt;
use pricemonitor_core::{Error, ErrorCode, Result};
use semver::Version;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of an update check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateStatus {
    /// A newer package is downloaded and waiting to be installed
    Ready { path: PathBuf, version: Version },
    /// The offered package is not newer than the running build
    UpToDate { current: Version, offered: Version },
}

/// Fetches the published package from the head-office server
pub struct Updater<I = ProcessInspector, N = ExecutableInstaller> {
    settings: Settings,
    current: Version,
    inspector: Arc<I>,
    installer: N,
}

impl Updater {
    /// Updater for the running build with the default inspector and installer
    pub fn new(settings: Settings) -> Result<Self> {
        let current = Version::parse(env!("CARGO_PKG_VERSION"))
            .map_err(|e| Error::new(ErrorCode::Internal, format!("Bad build version: {e}")))?;
        let inspector = ProcessInspector::new(settings.update.version_probe.clone());
        Ok(Self::with_parts(settings, current, inspector, ExecutableInstaller))
    }
}

impl<I: PackageInspector + 'static, N: Installer> Updater<I, N> {
    pub fn with_parts(settings: Settings, current: Version, inspector: I, installer: N) -> Self {
        Self {
            settings,
            current,
            inspector: Arc::new(inspector),
            installer,
        }
    }

    pub fn current_version(&self) -> &Version {
        &self.current
    }

    /// Download the package and decide whether it is an update
    ///
    /// An empty package means the server has nothing to offer and is
    /// reported as [`ErrorCode::NoNewVersion`]. The download must match the
    /// published `<package>.sha256` before it is ever executed.
    pub async fn check(&self) -> Result<UpdateStatus> {
        let client = self.client()?;
        let package = self.download(&client).await?;
        if package.is_empty() {
            discard(&package.path).await;
            return Err(Error::new(ErrorCode::NoNewVersion, "No new version published")
                .with_context(format!("{} is empty on the server", self.settings.update.package_name)));
        }

        if let Err(e) = self.verify(&client, &package).await {
            discard(&package.path).await;
            return Err(e);
        }

        let offered = self.inspect(&package.path).await?;
        info!(current = %self.current, offered = %offered, sha256 = %package.sha256, "Package inspected");

        if offered > self.current {
            Ok(UpdateStatus::Ready {
                path: package.path,
                version: offered,
            })
        } else {
            Ok(UpdateStatus::UpToDate {
                current: self.current.clone(),
                offered,
            })
        }
    }

    /// Hand a staged package to the installer
    pub fn install(&self, path: &Path, version: &Version) -> Result<()> {
        self.installer.install(path, version)
    }

    /// [`check`](Self::check), then install when a newer package was found
    pub async fn check_and_stage(&self) -> Result<UpdateStatus> {
        let status = self.check().await?;
        if let UpdateStatus::Ready { path, version } = &status {
            self.install(path, version)?;
        }
        Ok(status)
    }

    fn client(&self) -> Result<PriceClient> {
        let config = ClientConfig::from_settings(&self.settings).with_base_url(self.settings.remote_url());
        PriceClient::with_config(config)
            .map_err(|e| Error::update(format!("Cannot reach the update server: {e}")).with_source(e))
    }

    async fn download(&self, client: &PriceClient) -> Result<DownloadedPackage> {
        let dest = self.settings.download_dir()?;
        client
            .packages()
            .download(&self.settings.update.package_name, &dest)
            .await
            .map_err(|e| download_error(e, &dest))
    }

    async fn verify(&self, client: &PriceClient, package: &DownloadedPackage) -> Result<()> {
        let name = &self.settings.update.package_name;
        let published = client.packages().checksum(name).await.map_err(|e| {
            Error::update(format!("No checksum published for {name}: {e}"))
                .with_suggestion(format!("Publish {name}.sha256 next to the package"))
                .with_source(e)
        })?;

        if published == package.sha256 {
            debug!(sha256 = %published, "Package checksum verified");
            Ok(())
        } else {
            warn!(expected = %published, actual = %package.sha256, "Package checksum mismatch");
            Err(Error::update(format!("Checksum mismatch for {name}"))
                .with_context(format!("expected {published}, downloaded {}", package.sha256)))
        }
    }

    async fn inspect(&self, path: &Path) -> Result<Version> {
        let inspector = Arc::clone(&self.inspector);
        let package = path.to_path_buf();
        tokio::task::spawn_blocking(move || inspector.version(&package))
            .await
            .map_err(|e| Error::new(ErrorCode::Internal, format!("Version check stopped: {e}")))?
            .context(format!("Asking {} for its version", path.display()))
    }
}

async fn discard(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        warn!(path = %path.display(), error = %e, "Cannot remove rejected package");
    }
}

fn download_error(err: ApiError, dest: &Path) -> Error {
    let denied = matches!(&err, ApiError::Io(io) if io.kind() == std::io::ErrorKind::PermissionDenied);
    warn!(error = %err, dest = %dest.display(), "Package download failed");

    if denied {
        Error::permission_denied(dest).with_source(err)
    } else {
        Error::update(format!("Package download failed: {err}")).with_source(err)
    }
}
