//! Core utilities for the price monitor kiosk
//!
//! This crate provides functionality shared by every other crate:
//!
//! - **Error handling**: errors with codes, context, and recovery suggestions
//! - **Settings**: TOML settings with legacy key migration, environment
//!   overrides, validation and live reload
//! - **Process execution**: running a staged update package to read its version
//!
//! # Example
//!
//! ```rust,no_run
//! use pricemonitor_core::config::Config;
//!
//! let config = Config::load(None).expect("invalid settings");
//! println!("Looking prices up at {}", config.settings.active_base_url());
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod process;

pub use error::{Error, ErrorCode, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, FileSettings, Settings, SettingsProvider, StaticSettings};
    pub use crate::error::{Error, ErrorCode, Result, ResultExt};
}
