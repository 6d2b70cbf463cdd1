//! Lookup seam between the controller and the price service

use pricemonitor_api_client::{ApiResult, ClientConfig, LookupOutcome, PriceClient};
use pricemonitor_core::config::Settings;
use std::future::Future;
use std::time::Duration;

/// Everything needed to perform one lookup, resolved when the scan happens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    /// Trimmed, non-empty barcode
    pub barcode: String,
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl LookupRequest {
    /// Resolve the target from the settings in effect right now
    pub fn new(barcode: impl Into<String>, settings: &Settings) -> Self {
        Self {
            barcode: barcode.into(),
            base_url: settings.active_base_url(),
            connect_timeout: settings.timeouts.connection(),
            request_timeout: settings.timeouts.request(),
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::default()
            .with_base_url(self.base_url.clone())
            .with_connect_timeout(self.connect_timeout)
            .with_request_timeout(self.request_timeout)
    }
}

/// Performs price lookups off the controller task
pub trait PriceLookup: Send + Sync + 'static {
    fn lookup(
        &self,
        request: LookupRequest,
    ) -> impl Future<Output = ApiResult<LookupOutcome>> + Send;
}

/// Lookup over HTTP, one client per request so each scan honours the
/// settings current at that moment
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpLookup;

impl PriceLookup for HttpLookup {
    async fn lookup(&self, request: LookupRequest) -> ApiResult<LookupOutcome> {
        let client = PriceClient::with_config(request.client_config())?;
        client.prices().lookup(&request.barcode).await
    }
}
