//! Main API client implementation

use crate::config::ClientConfig;
use crate::endpoints::{PackageApi, PriceApi};
use crate::error::{ApiError, ApiResult};
use pricemonitor_core::config::Settings;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, Response, Url};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use uuid::Uuid;

/// Request correlation ID header
const X_REQUEST_ID: &str = "X-Request-ID";

/// Price service client
///
/// One instance is bound to one base URL and one pair of timeouts. Lookups
/// are never retried: one call, one GET.
#[derive(Clone)]
pub struct PriceClient {
    inner: Client,
    config: Arc<ClientConfig>,
}

impl PriceClient {
    /// Create a client for the base URL selected by the given settings
    pub fn from_settings(settings: &Settings) -> ApiResult<Self> {
        Self::with_config(ClientConfig::from_settings(settings))
    }

    /// Create a new client with specific configuration
    pub fn with_config(config: ClientConfig) -> ApiResult<Self> {
        config.validate()?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("price-monitor/", env!("CARGO_PKG_VERSION"))),
        );

        let inner = Client::builder()
            .connect_timeout(config.connect_timeout)
            .default_headers(default_headers)
            .build()
            .map_err(ApiError::Network)?;

        Ok(Self {
            inner,
            config: Arc::new(config),
        })
    }

    /// Get the current configuration
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    // -------------------------------------------------------------------------
    // Endpoint API accessors
    // -------------------------------------------------------------------------

    /// Access the price lookup endpoint
    #[must_use]
    pub fn prices(&self) -> PriceApi {
        PriceApi::new(self.clone())
    }

    /// Access the update package endpoint
    #[must_use]
    pub fn packages(&self) -> PackageApi {
        PackageApi::new(self.clone())
    }

    // -------------------------------------------------------------------------
    // Low-level HTTP methods
    // -------------------------------------------------------------------------

    /// Build an absolute URL below the base URL with url-encoded query pairs
    pub fn url(&self, path: &str, query: &[(&str, &str)]) -> ApiResult<Url> {
        let base = format!("{}/", self.config.base_url.trim_end_matches('/'));
        let mut url = Url::parse(&base)
            .and_then(|base| base.join(path))
            .map_err(|e| ApiError::InvalidUrl(format!("{base}{path}: {e}")))?;

        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// GET a URL and read the whole body as text within the overall deadline
    pub async fn get_text(&self, url: Url) -> ApiResult<String> {
        let request_id = Uuid::new_v4().to_string();
        let start = Instant::now();

        let result = self
            .with_deadline(async {
                let response = self.send(&request_id, url.clone()).await?;
                Ok::<_, ApiError>(response.text().await?)
            })
            .await;

        match &result {
            Ok(body) => debug!(
                request_id = %request_id,
                url = %url,
                bytes = body.len(),
                elapsed_ms = start.elapsed().as_millis(),
                "Request succeeded"
            ),
            Err(e) => warn!(
                request_id = %request_id,
                url = %url,
                elapsed_ms = start.elapsed().as_millis(),
                error = %e,
                "Request failed"
            ),
        }

        result
    }

    /// GET a URL and return the response once its headers arrive
    ///
    /// The overall deadline covers only the wait for headers; the caller owns
    /// reading the body.
    pub async fn get_streaming(&self, url: Url) -> ApiResult<Response> {
        let request_id = Uuid::new_v4().to_string();
        self.with_deadline(self.send(&request_id, url)).await
    }

    async fn send(&self, request_id: &str, url: Url) -> ApiResult<Response> {
        debug!(request_id = %request_id, url = %url, "Sending request");

        let response = self
            .inner
            .get(url)
            .header(X_REQUEST_ID, request_id)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let message = response
                .text()
                .await
                .ok()
                .filter(|body| !body.trim().is_empty())
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());
            Err(ApiError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn with_deadline<T>(&self, fut: impl Future<Output = ApiResult<T>>) -> ApiResult<T> {
        let deadline: Duration = self.config.request_timeout;
        tokio::time::timeout(deadline, fut)
            .await
            .map_err(|_| ApiError::Timeout(deadline))?
    }
}
