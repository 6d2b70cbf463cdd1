//! Kiosk screen drawn on a terminal
//!
//! The whole screen is redrawn on every change. A spinner stands in for the
//! progress indicator while a lookup runs.

use crate::progress;
use console::Term;
use indicatif::ProgressBar;
use owo_colors::{OwoColorize, Stream};
use pricemonitor_kiosk::{Display, Screen, UiState};
use std::io;

/// Text of the idle logo
pub const LOGO: &str = "İ N C İ";

/// Spinner text while a lookup runs
pub const SEARCHING: &str = "Axtarılır...";

/// Text size from which the large layout is used
pub const BANNER_TEXT_SIZE: f32 = 40.0;

/// How much room the screen takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// One line per element
    Compact,
    /// Framed, spaced out and emphasised
    Banner,
}

impl Layout {
    /// Pick the layout for the configured text size
    pub fn for_text_size(text_size: f32) -> Self {
        if text_size >= BANNER_TEXT_SIZE {
            Self::Banner
        } else {
            Self::Compact
        }
    }
}

/// Terminal implementation of the kiosk [`Display`]
pub struct TerminalDisplay {
    term: Term,
    layout: Layout,
    spinner: Option<ProgressBar>,
}

impl TerminalDisplay {
    /// Draw on stdout with the given layout
    pub fn new(layout: Layout) -> Self {
        Self {
            term: Term::stdout(),
            layout,
            spinner: None,
        }
    }

    fn draw(&self, lines: &[String]) -> io::Result<()> {
        if self.term.is_term() {
            self.term.clear_screen()?;
        }
        for line in lines {
            self.term.write_line(line)?;
        }
        Ok(())
    }

    fn sync_spinner(&mut self, visible: bool) {
        match (visible, self.spinner.take()) {
            (true, None) => self.spinner = Some(progress::spinner(SEARCHING)),
            (true, Some(spinner)) => self.spinner = Some(spinner),
            (false, Some(spinner)) => spinner.finish_and_clear(),
            (false, None) => {}
        }
    }
}

impl Display for TerminalDisplay {
    fn render(&mut self, state: &UiState, screen: &Screen) {
        let lines = frame(state, screen, self.layout);
        // A broken terminal must not stop the kiosk
        let _ = self.draw(&lines);
        self.sync_spinner(screen.progress_visible);
    }
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        self.sync_spinner(false);
    }
}

/// Lines making up one picture of the screen
pub fn frame(state: &UiState, screen: &Screen, layout: Layout) -> Vec<String> {
    let mut lines = Vec::new();

    match layout {
        Layout::Banner => {
            let rule = "═".repeat(40);
            lines.push(rule.clone());
            if screen.logo_visible {
                lines.push(String::new());
                lines.push(format!("{:^40}", LOGO).if_supports_color(Stream::Stdout, |t| t.bold()).to_string());
                lines.push(String::new());
            }
            if !screen.barcode.is_empty() {
                lines.push(format!("Barkod: {}", screen.barcode));
                lines.push(String::new());
                lines.push(
                    screen
                        .item_name
                        .if_supports_color(Stream::Stdout, |t| t.bold())
                        .to_string(),
                );
                lines.push(String::new());
                lines.push(
                    format!("{:>40}", screen.price)
                        .if_supports_color(Stream::Stdout, |t| t.green())
                        .to_string(),
                );
            }
            lines.push(rule);
        }
        Layout::Compact => {
            if screen.logo_visible {
                lines.push(LOGO.to_string());
            }
            if !screen.barcode.is_empty() {
                lines.push(format!(
                    "{} | {} | {}",
                    screen.barcode,
                    screen.item_name,
                    screen.price.if_supports_color(Stream::Stdout, |t| t.green())
                ));
            }
        }
    }

    if let Some(dialog) = &screen.dialog {
        lines.push(String::new());
        lines.push(format!(
            "{} {}",
            "!".if_supports_color(Stream::Stdout, |t| t.red()),
            dialog.title.if_supports_color(Stream::Stdout, |t| t.bold())
        ));
        lines.push(format!("  {}", dialog.message));
    }

    if matches!(state, UiState::Idle | UiState::Error { .. }) || !screen.input.is_empty() {
        lines.push(String::new());
        lines.push(format!("> {}", screen.input));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricemonitor_api_client::PriceRecord;
    use pricemonitor_kiosk::Dialog;

    fn result_screen() -> (UiState, Screen) {
        let record = PriceRecord::new("123", "Milk", "2.5").unwrap();
        let screen = Screen {
            barcode: "123".to_string(),
            item_name: "Milk".to_string(),
            price: "2.50 AZN".to_string(),
            logo_visible: false,
            ..Screen::idle()
        };
        (UiState::Result(record), screen)
    }

    #[test]
    fn test_layout_threshold() {
        assert_eq!(Layout::for_text_size(40.0), Layout::Banner);
        assert_eq!(Layout::for_text_size(72.0), Layout::Banner);
        assert_eq!(Layout::for_text_size(18.5), Layout::Compact);
    }

    #[test]
    fn test_idle_shows_logo_and_prompt() {
        let lines = frame(&UiState::Idle, &Screen::idle(), Layout::Compact);
        assert_eq!(lines.first().map(String::as_str), Some(LOGO));
        assert_eq!(lines.last().map(String::as_str), Some("> "));
    }

    #[test]
    fn test_result_compact_line() {
        let (state, screen) = result_screen();
        let lines = frame(&state, &screen, Layout::Compact);
        assert!(lines.iter().any(|l| l.contains("123 | Milk | ") && l.contains("2.50 AZN")));
        assert!(!lines.iter().any(|l| l.contains(LOGO)));
    }

    #[test]
    fn test_result_banner_has_fields() {
        let (state, screen) = result_screen();
        let text = frame(&state, &screen, Layout::Banner).join("\n");
        assert!(text.contains("Barkod: 123"));
        assert!(text.contains("Milk"));
        assert!(text.contains("2.50 AZN"));
    }

    #[test]
    fn test_dialog_is_drawn() {
        let screen = Screen {
            dialog: Some(Dialog {
                id: 1,
                title: "Xəta".to_string(),
                message: "Server xətası: timeout".to_string(),
            }),
            ..Screen::idle()
        };
        let state = UiState::Error {
            title: "Xəta".to_string(),
            message: "Server xətası: timeout".to_string(),
        };
        let text = frame(&state, &screen, Layout::Banner).join("\n");
        assert!(text.contains("Xəta"));
        assert!(text.contains("Server xətası: timeout"));
    }
}
