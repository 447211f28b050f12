//! Ollama API client struct and builder.

use std::future::Future;
use std::time::Duration;

use coursekit_types::{
    Completion, GenerateError, GenerateRequest, Generator, LinePolicy, SessionEvent,
    StreamCallbacks,
};
use futures::{Stream, StreamExt};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::cleaner::ResponseCleaner;
use crate::config::OllamaConfig;
use crate::error::{map_http_status, map_reqwest_error};
use crate::mapping::{completion_from, to_api_request};
use crate::streaming::{assemble, dispatch};
use crate::types::{OllamaGenerateChunk, OllamaGenerateRequest};

/// Client for the Ollama generate API.
///
/// Implements [`Generator`] for single-shot calls and exposes streaming
/// sessions through [`events`](Self::events),
/// [`generate_stream`](Self::generate_stream) and
/// [`spawn_generate_stream`](Self::spawn_generate_stream).
///
/// # Example
///
/// ```no_run
/// use coursekit_ollama::Ollama;
///
/// let client = Ollama::new()
///     .model("deepseek-r1:1.5b")
///     .base_url("http://127.0.0.1:11434");
/// ```
#[derive(Debug, Clone)]
pub struct Ollama {
    pub(crate) config: OllamaConfig,
    pub(crate) cleaner: ResponseCleaner,
    /// Shared HTTP client.
    pub(crate) client: reqwest::Client,
}

/// Per-session options for a streaming call.
#[derive(Debug, Clone, Default)]
pub struct StreamOptions {
    /// What to do with lines that are not valid records.
    pub policy: LinePolicy,
    /// Cancels the session when triggered.
    pub cancel: CancellationToken,
}

impl StreamOptions {
    /// Discard malformed lines, never cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the malformed-line policy.
    #[must_use]
    pub fn policy(mut self, policy: LinePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Attach a cancellation token.
    #[must_use]
    pub fn cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

impl Ollama {
    /// Create a new client with default configuration.
    ///
    /// Default model: `deepseek-r1:1.5b`.
    /// Default base URL: `http://127.0.0.1:11434`.
    /// No authentication required (Ollama is local).
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(OllamaConfig::default())
    }

    /// Create a client from an explicit configuration.
    #[must_use]
    pub fn from_config(config: OllamaConfig) -> Self {
        Self {
            config,
            cleaner: ResponseCleaner::new(),
            client: reqwest::Client::new(),
        }
    }

    /// Override the default model.
    ///
    /// This is used when [`GenerateRequest::model`] is empty.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Override the API base URL.
    ///
    /// Useful for testing with a local mock server or a remote Ollama instance.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the keep_alive duration for model memory residency.
    ///
    /// Examples: `"5m"` (keep for 5 minutes), `"0"` (unload immediately after request).
    /// When not set, Ollama uses its server default.
    #[must_use]
    pub fn keep_alive(mut self, duration: impl Into<String>) -> Self {
        self.config.keep_alive = Some(duration.into());
        self
    }

    /// Override the default sampling temperature.
    #[must_use]
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = temperature;
        self
    }

    /// Override the single-shot request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Replace the cleaner applied to single-shot responses.
    #[must_use]
    pub fn cleaner(mut self, cleaner: ResponseCleaner) -> Self {
        self.cleaner = cleaner;
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    /// Open a streaming session and return its events.
    ///
    /// The request is sent when the stream is first polled. Connection
    /// failures and non-success statuses arrive as a single
    /// [`SessionEvent::Failed`], so the exactly-one-terminal contract of
    /// [`assemble`] holds for the whole session.
    pub fn events(
        &self,
        request: &GenerateRequest,
        options: StreamOptions,
    ) -> impl Stream<Item = SessionEvent> + Send + 'static {
        let url = self.config.generate_url();
        let body = to_api_request(request, &self.config, true);
        let http_client = self.client.clone();
        let timeout = self.config.timeout;
        let StreamOptions { policy, cancel } = options;

        async_stream::stream! {
            tracing::debug!(url = %url, model = %body.model, ?policy, "sending streaming generate request to Ollama");

            let opened = tokio::select! {
                biased;
                () = cancel.cancelled() => None,
                opened = open_stream(&http_client, &url, &body, timeout) => Some(opened),
            };
            let response = match opened {
                None => return,
                Some(Err(err)) => {
                    yield SessionEvent::Failed(err);
                    return;
                }
                Some(Ok(response)) => response,
            };

            let bytes = response
                .bytes_stream()
                .map(move |chunk| chunk.map_err(|e| map_reqwest_error(e, timeout)));
            let mut session = std::pin::pin!(assemble(bytes, policy, cancel));
            while let Some(event) = session.next().await {
                yield event;
            }
        }
    }

    /// Run a streaming session to the end, invoking `callbacks` along the way.
    ///
    /// `on_fragment` receives the accumulated text after each fragment.
    /// Exactly one of `on_complete` / `on_failure` fires, unless the session
    /// is cancelled, in which case neither fires and
    /// [`GenerateError::Cancelled`] is returned.
    pub async fn generate_stream(
        &self,
        request: &GenerateRequest,
        options: StreamOptions,
        callbacks: StreamCallbacks,
    ) -> Result<Completion, GenerateError> {
        dispatch(self.events(request, options), callbacks).await
    }

    /// Like [`generate_stream`](Self::generate_stream), but runs the session on
    /// the tokio runtime and returns immediately.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime, as [`tokio::spawn`] does.
    pub fn spawn_generate_stream(
        &self,
        request: &GenerateRequest,
        options: StreamOptions,
        callbacks: StreamCallbacks,
    ) -> JoinHandle<Result<Completion, GenerateError>> {
        tokio::spawn(dispatch(self.events(request, options), callbacks))
    }
}

impl Default for Ollama {
    fn default() -> Self {
        Self::new()
    }
}

/// Send a streaming request and check its status before any body is read.
async fn open_stream(
    http_client: &reqwest::Client,
    url: &str,
    body: &OllamaGenerateRequest,
    timeout: Duration,
) -> Result<reqwest::Response, GenerateError> {
    let response = http_client
        .post(url)
        .header("content-type", "application/json")
        .json(body)
        .send()
        .await
        .map_err(|e| map_reqwest_error(e, timeout))?;

    let status = response.status();
    if !status.is_success() {
        let body_text = response
            .text()
            .await
            .map_err(|e| map_reqwest_error(e, timeout))?;
        return Err(map_http_status(status, &body_text));
    }
    Ok(response)
}

impl Generator for Ollama {
    /// Send a generate request with `stream: false`.
    ///
    /// The `response` text goes through the configured [`ResponseCleaner`]
    /// before it is returned.
    fn generate(
        &self,
        request: GenerateRequest,
    ) -> impl Future<Output = Result<Completion, GenerateError>> + Send {
        let url = self.config.generate_url();
        let body = to_api_request(&request, &self.config, false);
        let timeout = self.config.timeout;
        let http_client = self.client.clone();
        let cleaner = self.cleaner.clone();

        async move {
            tracing::debug!(url = %url, model = %body.model, "sending generate request to Ollama");

            let response = http_client
                .post(&url)
                .header("content-type", "application/json")
                .timeout(timeout)
                .json(&body)
                .send()
                .await
                .map_err(|e| map_reqwest_error(e, timeout))?;

            let status = response.status();
            let response_text = response
                .text()
                .await
                .map_err(|e| map_reqwest_error(e, timeout))?;

            if !status.is_success() {
                return Err(map_http_status(status, &response_text));
            }

            let chunk: OllamaGenerateChunk = serde_json::from_str(&response_text)
                .map_err(|e| GenerateError::InvalidResponse(format!("invalid JSON response: {e}")))?;

            if let Some(message) = chunk.error.as_deref() {
                return Err(GenerateError::InvalidResponse(message.to_string()));
            }
            let Some(raw) = chunk.response.as_deref() else {
                return Err(GenerateError::InvalidResponse(
                    "response body has no `response` field".into(),
                ));
            };

            Ok(completion_from(&chunk, cleaner.clean(raw)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_BASE_URL, DEFAULT_MODEL};

    #[test]
    fn default_model_is_set() {
        let client = Ollama::new();
        assert_eq!(client.config.model, DEFAULT_MODEL);
    }

    #[test]
    fn default_base_url_is_set() {
        let client = Ollama::new();
        assert_eq!(client.config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn builder_overrides_model() {
        let client = Ollama::new().model("qwen2.5:7b");
        assert_eq!(client.config.model, "qwen2.5:7b");
    }

    #[test]
    fn builder_overrides_base_url() {
        let client = Ollama::new().base_url("http://remote:11434");
        assert_eq!(client.config.base_url, "http://remote:11434");
    }

    #[test]
    fn builder_sets_keep_alive_temperature_and_timeout() {
        let client = Ollama::new()
            .keep_alive("5m")
            .temperature(0.6)
            .timeout(Duration::from_secs(5));
        assert_eq!(client.config.keep_alive, Some("5m".to_string()));
        assert_eq!(client.config.temperature, 0.6);
        assert_eq!(client.config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn from_config_keeps_values() {
        let config = OllamaConfig {
            model: "llama3.2".into(),
            ..Default::default()
        };
        let client = Ollama::from_config(config.clone());
        assert_eq!(client.config(), &config);
    }

    #[test]
    fn stream_options_default_to_discard() {
        let options = StreamOptions::new();
        assert_eq!(options.policy, LinePolicy::Discard);
        assert!(!options.cancel.is_cancelled());
        let options = options.policy(LinePolicy::Verbatim);
        assert_eq!(options.policy, LinePolicy::Verbatim);
    }

    #[test]
    fn default_impl_matches_new() {
        let client = Ollama::default();
        assert_eq!(client.config, OllamaConfig::default());
    }
}
