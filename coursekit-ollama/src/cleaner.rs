//! Post-processing for single-shot responses.
//!
//! Reasoning models such as deepseek-r1 prefix their answer with a
//! `<think>...</think>` block. [`ResponseCleaner`] strips every such block,
//! with the whitespace around it, and trims the result.

use regex::Regex;

/// Default opening marker for reasoning blocks.
pub const THINK_OPEN: &str = "<think>";
/// Default closing marker for reasoning blocks.
pub const THINK_CLOSE: &str = "</think>";

/// Removes delimited reasoning blocks from a complete response.
///
/// Matching is non-greedy and spans line breaks, so two blocks separated by
/// answer text are removed independently. An opening marker with no closing
/// marker is left in place.
#[derive(Debug, Clone)]
pub struct ResponseCleaner {
    pattern: Regex,
}

impl ResponseCleaner {
    /// A cleaner for `<think>` / `</think>` blocks.
    pub fn new() -> Self {
        Self::with_markers(THINK_OPEN, THINK_CLOSE)
    }

    /// A cleaner for a custom marker pair. Markers are matched literally.
    pub fn with_markers(open: &str, close: &str) -> Self {
        let pattern = format!(
            r"\s*{}[\s\S]*?{}\s*",
            regex::escape(open),
            regex::escape(close)
        );
        Self {
            pattern: Regex::new(&pattern).expect("valid regex"),
        }
    }

    /// Strip reasoning blocks and surrounding whitespace, then trim.
    pub fn clean(&self, text: &str) -> String {
        self.pattern.replace_all(text, "").trim().to_string()
    }
}

impl Default for ResponseCleaner {
    fn default() -> Self {
        Self::new()
    }
}

/// [`ResponseCleaner::clean`] with the default `<think>` markers.
pub fn clean_response(text: &str) -> String {
    ResponseCleaner::new().clean(text)
}
