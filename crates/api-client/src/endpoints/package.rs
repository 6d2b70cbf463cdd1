//! Update package download
//!
//! The head-office server publishes the current kiosk package at
//! `<base>/<package name>` and its SHA-256 at `<base>/<package name>.sha256`.

use crate::client::PriceClient;
use crate::error::{ApiError, ApiResult};
use reqwest::Response;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Package download API interface
#[derive(Clone)]
pub struct PackageApi {
    client: PriceClient,
}

impl PackageApi {
    pub(crate) fn new(client: PriceClient) -> Self {
        Self { client }
    }

    /// Download a package into `dest_dir`
    ///
    /// The body is streamed into `<name>.part` and renamed once complete. A
    /// failed transfer removes the partial file.
    pub async fn download(&self, name: &str, dest_dir: &Path) -> ApiResult<DownloadedPackage> {
        let url = self.client.url(name, &[])?;
        info!(url = %url, dest = %dest_dir.display(), "Downloading package");

        fs::create_dir_all(dest_dir).await?;
        let path = dest_dir.join(name);
        let partial = dest_dir.join(format!("{name}.part"));

        let response = self.client.get_streaming(url).await?;
        let (bytes, sha256) = match write_body(response, &partial).await {
            Ok(written) => written,
            Err(e) => {
                if let Err(cleanup) = fs::remove_file(&partial).await {
                    warn!(path = %partial.display(), error = %cleanup, "Cannot remove partial download");
                }
                return Err(e);
            }
        };

        fs::rename(&partial, &path).await?;
        debug!(path = %path.display(), bytes, sha256 = %sha256, "Package stored");

        Ok(DownloadedPackage {
            path,
            bytes,
            sha256,
        })
    }

    /// Published SHA-256 of a package, lowercase hex
    pub async fn checksum(&self, name: &str) -> ApiResult<String> {
        let url = self.client.url(&format!("{name}.sha256"), &[])?;
        let body = self.client.get_text(url).await?;
        parse_checksum(&body)
    }
}

async fn write_body(mut response: Response, partial: &Path) -> ApiResult<(u64, String)> {
    let mut file = File::create(partial).await?;
    let mut hasher = Sha256::new();
    let mut bytes = 0u64;

    while let Some(chunk) = response.chunk().await? {
        hasher.update(&chunk);
        file.write_all(&chunk).await?;
        bytes += chunk.len() as u64;
    }
    file.flush().await?;

    Ok((bytes, hex::encode(hasher.finalize())))
}

/// Digest from a checksum file, accepting `sha256sum` output
pub fn parse_checksum(body: &str) -> ApiResult<String> {
    let digest = body.split_whitespace().next().unwrap_or_default();
    if digest.len() == 64 && digest.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(digest.to_ascii_lowercase())
    } else {
        Err(ApiError::parse(format!("'{}' is not a SHA-256 digest", body.trim())))
    }
}

/// A package written to local storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedPackage {
    /// Final location of the file
    pub path: PathBuf,
    /// Size in bytes
    pub bytes: u64,
    /// Hex SHA-256 of the contents
    pub sha256: String,
}

impl DownloadedPackage {
    /// Whether the server sent an empty file
    pub fn is_empty(&self) -> bool {
        self.bytes == 0
    }
}
