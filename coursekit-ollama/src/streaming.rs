//! NDJSON streaming support for the Ollama generate API.
//!
//! Ollama emits one JSON object per line:
//! ```text
//! {"model":"deepseek-r1:1.5b","response":"Hello","done":false}
//! {"model":"deepseek-r1:1.5b","response":" world","done":false}
//! {"model":"deepseek-r1:1.5b","response":"","done":true,"done_reason":"stop","eval_count":10,"prompt_eval_count":20}
//! ```
//!
//! Lines are framed by [`LineFramer`] and folded into accumulated text by
//! [`StreamAssembler`]. [`assemble`] drives both over a live byte stream and
//! yields [`SessionEvent`]s; [`dispatch`] feeds those to [`StreamCallbacks`].
//!
//! Reference: <https://github.com/ollama/ollama/blob/main/docs/api.md#generate-a-completion>

use bytes::Bytes;
use coursekit_types::{
    Completion, GenerateError, LinePolicy, SessionEvent, StreamCallbacks, TokenUsage,
};
use futures::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::framing::LineFramer;
use crate::mapping::usage_of;
use crate::types::OllamaGenerateChunk;

/// Turn a live byte stream into a stream of [`SessionEvent`]s.
///
/// Yields a [`SessionEvent::Fragment`] per extracted fragment, then exactly
/// one terminal event: [`SessionEvent::Completed`] after the end-of-stream
/// flush, or [`SessionEvent::Failed`] on the first transport error or service
/// error record. Once `cancel` fires nothing more is read or yielded, not even
/// a terminal event.
pub fn assemble<S>(
    byte_stream: S,
    policy: LinePolicy,
    cancel: CancellationToken,
) -> impl Stream<Item = SessionEvent> + Send + 'static
where
    S: Stream<Item = Result<Bytes, GenerateError>> + Send + 'static,
{
    async_stream::stream! {
        let mut assembler = StreamAssembler::new(policy);
        let mut bytes_stream = std::pin::pin!(byte_stream);

        loop {
            let next = tokio::select! {
                biased;
                () = cancel.cancelled() => None,
                next = bytes_stream.next() => Some(next),
            };
            let Some(next) = next else {
                tracing::debug!(received = assembler.text().len(), "generation stream cancelled");
                return;
            };

            match next {
                Some(Ok(chunk)) => {
                    for event in assembler.push(&chunk) {
                        if cancel.is_cancelled() {
                            return;
                        }
                        let terminal = event.is_terminal();
                        yield event;
                        if terminal {
                            return;
                        }
                    }
                }
                Some(Err(err)) => {
                    tracing::debug!(error = %err, "generation stream read failed");
                    yield SessionEvent::Failed(err);
                    return;
                }
                None => break,
            }
        }

        for event in assembler.finish() {
            if cancel.is_cancelled() {
                return;
            }
            yield event;
        }
    }
}

/// Drive `events` to the end, invoking `callbacks` for each one.
///
/// Returns the completion, the failure, or [`GenerateError::Cancelled`] if the
/// stream ended without a terminal event. In the cancelled case no callback
/// fires for the missing terminal.
pub async fn dispatch(
    events: impl Stream<Item = SessionEvent>,
    mut callbacks: StreamCallbacks,
) -> Result<Completion, GenerateError> {
    let mut events = std::pin::pin!(events);
    while let Some(event) = events.next().await {
        callbacks.notify(&event);
        match event {
            SessionEvent::Fragment { .. } => {}
            SessionEvent::Completed(completion) => return Ok(completion),
            SessionEvent::Failed(err) => return Err(err),
        }
    }
    Err(GenerateError::Cancelled)
}

/// Per-session state: the decode buffer and the accumulated text.
///
/// Feed it chunks with [`push`](Self::push) and call
/// [`finish`](Self::finish) at end of stream. After a terminal event it
/// ignores further input.
#[derive(Debug)]
pub struct StreamAssembler {
    framer: LineFramer,
    policy: LinePolicy,
    /// Accumulated text across records.
    text: String,
    /// The model name from the stream.
    model: Option<String>,
    done_reason: Option<String>,
    usage: Option<TokenUsage>,
    closed: bool,
}

impl StreamAssembler {
    /// Start an empty session with the given malformed-line policy.
    pub fn new(policy: LinePolicy) -> Self {
        Self {
            framer: LineFramer::new(),
            policy,
            text: String::new(),
            model: None,
            done_reason: None,
            usage: None,
            closed: false,
        }
    }

    /// Accumulated text so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Process one transport chunk and return the events it produced.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SessionEvent> {
        if self.closed {
            return Vec::new();
        }
        let mut events = Vec::new();
        for line in self.framer.push(chunk) {
            if let Some(event) = self.process_line(&line) {
                let terminal = event.is_terminal();
                events.push(event);
                if terminal {
                    break;
                }
            }
        }
        events
    }

    /// Flush the carry-over as a final line and emit the completion.
    ///
    /// Yields nothing if the session already ended.
    pub fn finish(&mut self) -> Vec<SessionEvent> {
        if self.closed {
            return Vec::new();
        }
        self.closed = true;
        let mut events = Vec::new();
        if let Some(rest) = self.framer.finish() {
            if let Some(event) = self.process_line(&rest) {
                let terminal = event.is_terminal();
                events.push(event);
                if terminal {
                    return events;
                }
            }
        }

        tracing::debug!(
            model = self.model.as_deref().unwrap_or_default(),
            chars = self.text.chars().count(),
            "generation stream complete"
        );
        events.push(SessionEvent::Completed(Completion {
            text: std::mem::take(&mut self.text),
            model: self.model.take(),
            done_reason: self.done_reason.take(),
            usage: self.usage.take(),
        }));
        events
    }

    /// Process a single NDJSON line and return the event it produces, if any.
    fn process_line(&mut self, line: &[u8]) -> Option<SessionEvent> {
        let text = match std::str::from_utf8(line) {
            Ok(text) => text,
            Err(e) => {
                let lossy = String::from_utf8_lossy(line).into_owned();
                return self.malformed(&lossy, &e.to_string());
            }
        };

        if text.trim().is_empty() {
            return None;
        }

        let chunk: OllamaGenerateChunk = match serde_json::from_str(text) {
            Ok(chunk) => chunk,
            Err(e) => return self.malformed(text, &e.to_string()),
        };

        if let Some(model) = chunk.model.as_ref() {
            self.model = Some(model.clone());
        }
        if chunk.done {
            self.done_reason = chunk.done_reason.clone();
            self.usage = usage_of(&chunk);
        }

        if let Some(message) = chunk.error {
            tracing::warn!(error = %message, "generation service reported an error mid-stream");
            self.closed = true;
            return Some(SessionEvent::Failed(GenerateError::Stream(message)));
        }

        match chunk.response {
            Some(delta) if !delta.is_empty() => Some(self.append(delta)),
            _ => None,
        }
    }

    fn malformed(&mut self, line: &str, reason: &str) -> Option<SessionEvent> {
        match self.policy {
            LinePolicy::Discard => {
                tracing::warn!(reason, line, "discarding malformed NDJSON line");
                None
            }
            LinePolicy::Verbatim => {
                tracing::debug!(reason, "keeping non-JSON line verbatim");
                Some(self.append(line.to_string()))
            }
        }
    }

    /// Extend the accumulated text and snapshot it. The snapshot is a full
    /// copy; see [`SessionEvent::Fragment`].
    fn append(&mut self, delta: String) -> SessionEvent {
        self.text.push_str(&delta);
        SessionEvent::Fragment {
            delta,
            text: self.text.clone(),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
