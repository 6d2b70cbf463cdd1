//! Self-update for the price monitor kiosk
//!
//! The head-office server publishes the current package. The updater
//! downloads it, asks it for its version and stages it when it is newer
//! than the running build.

#![warn(clippy::all)]

pub mod inspect;
pub mod install;
pub mod updater;

pub use inspect::{parse_version_output, PackageInspector, ProcessInspector};
pub use install::{ExecutableInstaller, Installer};
pub use updater::{UpdateStatus, Updater};
