//! Settings loading, schema and providers
//!
//! One TOML file configures the whole kiosk.

mod loader;
mod provider;
mod schema;

pub use loader::{find_config_file, load_config_file, Config};
pub use provider::{FileSettings, ForceRemote, SettingsProvider, StaticSettings};
pub use schema::*;
