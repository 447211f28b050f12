//! Request, response and session event types.

use serde::{Deserialize, Serialize};

use crate::error::GenerateError;

/// A single-prompt generation request.
///
/// Provider-neutral: the Ollama client maps it onto its wire format and fills
/// in defaults (model, temperature) from its configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Model identifier. Empty means "use the client default".
    #[serde(default)]
    pub model: String,
    /// Prompt text.
    pub prompt: String,
    /// Optional system prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Sampling temperature. `None` means "use the client default".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Extra generation options forwarded to the service untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<serde_json::Value>,
}

impl GenerateRequest {
    /// Build a request for `prompt` with every other field defaulted.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    /// Set the model for this request only.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the system prompt.
    #[must_use]
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the sampling temperature for this request only.
    #[must_use]
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Token accounting reported by the service on its final record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens in the prompt.
    pub prompt_tokens: u64,
    /// Tokens generated.
    pub completion_tokens: u64,
}

/// The finished text of a generation, with whatever metadata the service sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    /// Final text. For streaming sessions this is the accumulated text; for
    /// single-shot calls it has been passed through the response cleaner.
    pub text: String,
    /// Model that produced the text, if reported.
    pub model: Option<String>,
    /// Why generation stopped (`"stop"`, `"length"`, ...), if reported.
    pub done_reason: Option<String>,
    /// Token usage, if reported.
    pub usage: Option<TokenUsage>,
}

/// What to do with a line that is not a valid record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinePolicy {
    /// Log and drop the line. For endpoints with a strict NDJSON contract.
    #[default]
    Discard,
    /// Append the raw line to the accumulated text and notify the consumer.
    /// For endpoints whose output mixes JSON records with plain text.
    Verbatim,
}

/// One event of a streaming session.
///
/// A session yields zero or more [`SessionEvent::Fragment`]s in arrival order,
/// then at most one terminal event. Only a cancelled session ends without one.
#[derive(Debug)]
pub enum SessionEvent {
    /// New text arrived.
    Fragment {
        /// Text added by this record.
        delta: String,
        /// Accumulated text so far, including `delta`.
        ///
        /// Each fragment carries its own copy, so a whole session copies
        /// O(n²) bytes in the length of the answer. Consumers of long
        /// outputs that only need the new text should read `delta`.
        text: String,
    },
    /// The stream ended normally.
    Completed(Completion),
    /// The session failed; nothing follows.
    Failed(GenerateError),
}

impl SessionEvent {
    /// Whether this event ends the session.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionEvent::Fragment { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builder_sets_fields() {
        let req = GenerateRequest::new("hello")
            .model("qwen2.5")
            .system("be brief")
            .temperature(0.3);
        assert_eq!(req.prompt, "hello");
        assert_eq!(req.model, "qwen2.5");
        assert_eq!(req.system.as_deref(), Some("be brief"));
        assert_eq!(req.temperature, Some(0.3));
    }

    #[test]
    fn request_serde_skips_unset_options() {
        let json = serde_json::to_value(GenerateRequest::new("hi")).expect("serialize");
        assert_eq!(json, serde_json::json!({"model": "", "prompt": "hi"}));
    }

    #[test]
    fn line_policy_defaults_to_discard() {
        assert_eq!(LinePolicy::default(), LinePolicy::Discard);
        let json = serde_json::to_string(&LinePolicy::Verbatim).expect("serialize");
        assert_eq!(json, r#""verbatim""#);
    }

    #[test]
    fn only_fragments_are_non_terminal() {
        let frag = SessionEvent::Fragment {
            delta: "a".into(),
            text: "a".into(),
        };
        assert!(!frag.is_terminal());
        assert!(SessionEvent::Completed(Completion::default()).is_terminal());
        assert!(SessionEvent::Failed(GenerateError::Cancelled).is_terminal());
    }
}
