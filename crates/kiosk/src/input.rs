//! Barcode input field
//!
//! Scanners type the code followed by Enter. Text accumulates until a line
//! end, then the field is cleared and the trimmed line becomes a barcode
//! candidate.

/// Accumulated text of the input field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBuffer {
    text: String,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text currently in the field
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Append typed text, returning every barcode completed by a line end
    ///
    /// Whitespace-only lines still clear the field but yield nothing.
    pub fn push(&mut self, typed: &str) -> Vec<String> {
        let mut completed = Vec::new();

        for ch in typed.chars() {
            if ch == '\n' {
                let candidate = self.text.trim().to_string();
                self.text.clear();
                if !candidate.is_empty() {
                    completed.push(candidate);
                }
            } else {
                self.text.push(ch);
            }
        }

        completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_keystrokes_accumulate_until_newline() {
        let mut input = InputBuffer::new();
        assert!(input.push("47").is_empty());
        assert!(input.push("60").is_empty());
        assert_eq!(input.text(), "4760");

        assert_eq!(input.push("\n"), vec!["4760".to_string()]);
        assert_eq!(input.text(), "");
    }

    #[test]
    fn test_trims_surrounding_whitespace() {
        let mut input = InputBuffer::new();
        assert_eq!(input.push("  123 \r\n"), vec!["123".to_string()]);
    }

    #[test]
    fn test_several_lines_in_one_chunk() {
        let mut input = InputBuffer::new();
        assert_eq!(
            input.push("111\n\n222\n33"),
            vec!["111".to_string(), "222".to_string()]
        );
        assert_eq!(input.text(), "33");
    }

    proptest! {
        #[test]
        fn prop_whitespace_lines_yield_nothing(line in "[ \t\r]{0,12}") {
            let mut input = InputBuffer::new();
            let completed = input.push(&format!("{line}\n"));
            prop_assert!(completed.is_empty());
            prop_assert_eq!(input.text(), "");
        }

        #[test]
        fn prop_completed_barcodes_are_trimmed(code in "[0-9A-Za-z]{1,20}", pad in "[ \t]{0,4}") {
            let mut input = InputBuffer::new();
            let completed = input.push(&format!("{pad}{code}{pad}\n"));
            prop_assert_eq!(completed, vec![code]);
        }
    }
}
