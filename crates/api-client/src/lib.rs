//! HTTP client for the store price service
//!
//! This crate talks to the in-store (or head-office) price server:
//!
//! - **Price lookup**: one GET per barcode, parsed into a [`PriceRecord`] or a
//!   not-found outcome
//! - **Package download**: streams the kiosk update package to disk
//! - **Bounded time**: a connect timeout plus an overall request deadline
//! - **Request correlation**: every request carries an `X-Request-ID`
//!
//! # Example
//!
//! ```rust,no_run
//! use pricemonitor_api_client::{ClientConfig, LookupOutcome, PriceClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PriceClient::with_config(
//!         ClientConfig::default().with_base_url("http://192.168.0.100:8080"),
//!     )?;
//!
//!     match client.prices().lookup("4760001234567").await? {
//!         LookupOutcome::Found(record) => println!("{} {}", record.item_name(), record.price()),
//!         LookupOutcome::NotFound { barcode } => println!("unknown barcode {barcode}"),
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;

pub use client::PriceClient;
pub use config::ClientConfig;
pub use endpoints::{DownloadedPackage, LookupOutcome, PriceRecord};
pub use error::{ApiError, ApiResult, FailureKind};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::client::PriceClient;
    pub use crate::config::ClientConfig;
    pub use crate::endpoints::{LookupOutcome, PackageApi, PriceApi, PriceRecord};
    pub use crate::error::{ApiError, ApiResult, FailureKind};
}
