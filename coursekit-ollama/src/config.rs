//! Client configuration.

use std::time::Duration;

/// Default model, a small local reasoning model.
pub const DEFAULT_MODEL: &str = "deepseek-r1:1.5b";

/// Default Ollama base URL.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:11434";

/// Default sampling temperature. Low, because callers mostly want terse,
/// parseable answers (a price, a yes/no).
pub const DEFAULT_TEMPERATURE: f32 = 0.1;

/// Default timeout for single-shot requests. Generation can be slow on CPU.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Static configuration for an [`Ollama`](crate::Ollama) client.
///
/// Per-request overrides come from [`GenerateRequest`](coursekit_types::GenerateRequest).
/// This struct holds the defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct OllamaConfig {
    /// API base URL, without a trailing `/api`.
    pub base_url: String,
    /// Model used when a request leaves `model` empty.
    pub model: String,
    /// Temperature used when a request leaves `temperature` unset.
    pub temperature: f32,
    /// Timeout applied to single-shot requests. Streaming sessions are not
    /// bounded by it.
    pub timeout: Duration,
    /// Optional keep_alive duration string (e.g. "5m", "0" to unload).
    pub keep_alive: Option<String>,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
            temperature: DEFAULT_TEMPERATURE,
            timeout: DEFAULT_TIMEOUT,
            keep_alive: None,
        }
    }
}

impl OllamaConfig {
    /// Defaults, overridden by `OLLAMA_HOST` and `OLLAMA_MODEL` when set.
    ///
    /// `OLLAMA_HOST` may omit the scheme (`127.0.0.1:11434`), as the Ollama
    /// CLI accepts; `http://` is assumed.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(host) = lookup("OLLAMA_HOST").filter(|h| !h.trim().is_empty()) {
            config.base_url = normalize_host(&host);
        }
        if let Some(model) = lookup("OLLAMA_MODEL").filter(|m| !m.trim().is_empty()) {
            config.model = model.trim().to_string();
        }
        config
    }

    /// Build the generate endpoint URL.
    pub(crate) fn generate_url(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }
}

fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{host}")
    }
}
