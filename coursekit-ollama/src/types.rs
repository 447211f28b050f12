//! Ollama `/api/generate` request and record types.
//!
//! Differences from the chat endpoint:
//! - Single `prompt` string instead of a message array
//! - Each streamed record carries its text in a top-level `response` field
//! - The final record has `done: true` plus timing and token counts
//! - An `error` field may appear instead of `response` when the model fails

use serde::{Deserialize, Serialize};

/// Ollama `/api/generate` request body.
#[derive(Debug, Serialize)]
pub struct OllamaGenerateRequest {
    /// Model identifier (e.g. "deepseek-r1:1.5b").
    pub model: String,
    /// Prompt text.
    pub prompt: String,
    /// Optional system prompt overriding the modelfile's.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// `true` for NDJSON streaming, `false` for a single JSON body.
    pub stream: bool,
    /// How long to keep the model loaded in memory (e.g. "5m", "0").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<String>,
    /// Generation options.
    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    pub options: serde_json::Map<String, serde_json::Value>,
}

/// One `/api/generate` record.
///
/// Used both for NDJSON stream lines and for the single non-streaming body.
/// Every field is optional so that sparse records still parse.
#[derive(Debug, Default, Deserialize)]
pub struct OllamaGenerateChunk {
    /// Model that generated the record.
    #[serde(default)]
    pub model: Option<String>,
    /// Text fragment (streaming) or full text (non-streaming).
    #[serde(default)]
    pub response: Option<String>,
    /// Whether this is the final record.
    #[serde(default)]
    pub done: bool,
    /// Why generation stopped (e.g. "stop", "length").
    #[serde(default)]
    pub done_reason: Option<String>,
    /// Number of tokens in the prompt.
    #[serde(default)]
    pub prompt_eval_count: Option<u64>,
    /// Number of tokens generated.
    #[serde(default)]
    pub eval_count: Option<u64>,
    /// Error message reported by the service.
    #[serde(default)]
    pub error: Option<String>,
}
