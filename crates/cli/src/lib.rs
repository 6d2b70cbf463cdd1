//! Terminal front end utilities for the price monitor kiosk
//!
//! Provides shared CLI functionality:
//! - Status messages and confirmation prompts
//! - Progress spinners
//! - A terminal rendering of the kiosk screen

#![warn(missing_docs)]

pub mod output;
pub mod progress;
pub mod terminal;
