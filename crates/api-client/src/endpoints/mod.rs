//! Endpoint-specific API implementations
//!
//! | Module | Server path | Description |
//! |--------|-------------|-------------|
//! | `price` | `app.aspx?barcode=` | Price lookup by barcode |
//! | `package` | `<package name>` | Kiosk update package |

pub mod package;
pub mod price;

pub use package::{parse_checksum, DownloadedPackage, PackageApi};
pub use price::{parse_price_response, LookupOutcome, PriceApi, PriceRecord};
