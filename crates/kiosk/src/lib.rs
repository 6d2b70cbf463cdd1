//! Display controller for the price monitor kiosk
//!
//! Drives what a price-check screen shows: an idle logo, a progress
//! indicator while a lookup runs, the found item for a few seconds, or a
//! dialog when the barcode is unknown or the server fails.
//!
//! The front end only implements [`Display`]; typed text goes in through a
//! [`ControllerHandle`].
//!
//! # Example
//!
//! ```rust,no_run
//! use pricemonitor_core::config::{Settings, StaticSettings};
//! use pricemonitor_kiosk::{Controller, Display, HttpLookup, Screen, UiState};
//! use std::sync::Arc;
//!
//! struct Stdout;
//!
//! impl Display for Stdout {
//!     fn render(&mut self, state: &UiState, screen: &Screen) {
//!         println!("[{}] {} {}", state.name(), screen.item_name, screen.price);
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let settings = Arc::new(StaticSettings::new(Settings::default()));
//!     let (controller, handle) = Controller::new(HttpLookup, settings, Stdout);
//!     handle.input("4760001234567\n");
//!     controller.run().await;
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod controller;
pub mod format;
pub mod input;
pub mod lookup;
pub mod screen;
pub mod timer;

pub use controller::{Controller, ControllerHandle, Display, Event};
pub use format::{format_amount, format_price};
pub use input::InputBuffer;
pub use lookup::{HttpLookup, LookupRequest, PriceLookup};
pub use screen::{messages, Dialog, Screen, UiState};
pub use timer::Countdown;
