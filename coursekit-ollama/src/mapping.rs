//! Mapping between coursekit types and the Ollama generate API format.
//!
//! Reference: <https://github.com/ollama/ollama/blob/main/docs/api.md#generate-a-completion>

use coursekit_types::{Completion, GenerateRequest, TokenUsage};

use crate::config::OllamaConfig;
use crate::types::{OllamaGenerateChunk, OllamaGenerateRequest};

// ─── Request mapping ─────────────────────────────────────────────────────────

/// Convert a [`GenerateRequest`] into the Ollama generate body.
///
/// Empty model and unset temperature fall back to `config`. Entries of
/// `request.extra` (when it is an object) are merged into `options` and win
/// over the temperature default.
pub fn to_api_request(
    request: &GenerateRequest,
    config: &OllamaConfig,
    stream: bool,
) -> OllamaGenerateRequest {
    let model = if request.model.is_empty() {
        config.model.clone()
    } else {
        request.model.clone()
    };

    let mut options = serde_json::Map::new();
    let temperature = request.temperature.unwrap_or(config.temperature);
    options.insert(
        "temperature".into(),
        serde_json::Value::from(f64::from(temperature)),
    );

    if let Some(serde_json::Value::Object(extra)) = &request.extra {
        for (k, v) in extra {
            options.insert(k.clone(), v.clone());
        }
    }

    OllamaGenerateRequest {
        model,
        prompt: request.prompt.clone(),
        system: request.system.clone(),
        stream,
        keep_alive: config.keep_alive.clone(),
        options,
    }
}

// ─── Response mapping ─────────────────────────────────────────────────────────

/// Token usage from a record, if it carries either count.
pub fn usage_of(chunk: &OllamaGenerateChunk) -> Option<TokenUsage> {
    if chunk.prompt_eval_count.is_none() && chunk.eval_count.is_none() {
        return None;
    }
    Some(TokenUsage {
        prompt_tokens: chunk.prompt_eval_count.unwrap_or(0),
        completion_tokens: chunk.eval_count.unwrap_or(0),
    })
}

/// Build a [`Completion`] from a non-streaming body, with `text` as given.
pub fn completion_from(chunk: &OllamaGenerateChunk, text: String) -> Completion {
    Completion {
        text,
        model: chunk.model.clone(),
        done_reason: chunk.done_reason.clone(),
        usage: usage_of(chunk),
    }
}
