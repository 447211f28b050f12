//! Consumer callbacks for streaming sessions.

use std::fmt;

use crate::error::GenerateError;
use crate::types::{Completion, SessionEvent};

type TextCallback = Box<dyn FnMut(&str) + Send>;
type FailureCallback = Box<dyn FnMut(&GenerateError) + Send>;

/// Optional callbacks invoked as a streaming session progresses.
///
/// Every slot may be left empty. `on_fragment` receives the accumulated text
/// so far (a cumulative snapshot, not the delta). Exactly one of
/// `on_complete` / `on_failure` fires per session, unless it was cancelled.
///
/// ```
/// use coursekit_types::StreamCallbacks;
///
/// let callbacks = StreamCallbacks::new()
///     .on_fragment(|text| print!("\r{text}"))
///     .on_complete(|text| println!("\ndone: {} chars", text.len()));
/// ```
#[derive(Default)]
pub struct StreamCallbacks {
    fragment: Option<TextCallback>,
    complete: Option<TextCallback>,
    failure: Option<FailureCallback>,
}

impl StreamCallbacks {
    /// No callbacks registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Called with the accumulated text each time a fragment arrives.
    #[must_use]
    pub fn on_fragment(mut self, f: impl FnMut(&str) + Send + 'static) -> Self {
        self.fragment = Some(Box::new(f));
        self
    }

    /// Called once with the final text when the stream ends normally.
    #[must_use]
    pub fn on_complete(mut self, f: impl FnMut(&str) + Send + 'static) -> Self {
        self.complete = Some(Box::new(f));
        self
    }

    /// Called once when the session fails.
    #[must_use]
    pub fn on_failure(mut self, f: impl FnMut(&GenerateError) + Send + 'static) -> Self {
        self.failure = Some(Box::new(f));
        self
    }

    /// Route one session event to the matching slot.
    pub fn notify(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::Fragment { text, .. } => self.fragment(text),
            SessionEvent::Completed(completion) => self.complete(completion),
            SessionEvent::Failed(err) => self.fail(err),
        }
    }

    fn fragment(&mut self, text: &str) {
        if let Some(f) = self.fragment.as_mut() {
            f(text);
        }
    }

    fn complete(&mut self, completion: &Completion) {
        if let Some(f) = self.complete.as_mut() {
            f(&completion.text);
        }
    }

    fn fail(&mut self, err: &GenerateError) {
        if let Some(f) = self.failure.as_mut() {
            f(err);
        }
    }
}

impl fmt::Debug for StreamCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamCallbacks")
            .field("on_fragment", &self.fragment.is_some())
            .field("on_complete", &self.complete.is_some())
            .field("on_failure", &self.failure.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn empty_callbacks_are_noops() {
        let mut callbacks = StreamCallbacks::new();
        callbacks.notify(&SessionEvent::Fragment {
            delta: "x".into(),
            text: "x".into(),
        });
        callbacks.notify(&SessionEvent::Completed(Completion::default()));
        callbacks.notify(&SessionEvent::Failed(GenerateError::Cancelled));
    }

    #[test]
    fn fragment_receives_cumulative_text() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut callbacks = StreamCallbacks::new().on_fragment(move |t| {
            sink.lock().expect("lock").push(t.to_string());
        });

        callbacks.notify(&SessionEvent::Fragment {
            delta: "Hi".into(),
            text: "Hi".into(),
        });
        callbacks.notify(&SessionEvent::Fragment {
            delta: " there".into(),
            text: "Hi there".into(),
        });

        assert_eq!(*seen.lock().expect("lock"), vec!["Hi", "Hi there"]);
    }

    #[test]
    fn terminal_events_route_to_their_slot() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let done = Arc::clone(&log);
        let failed = Arc::clone(&log);
        let mut callbacks = StreamCallbacks::new()
            .on_complete(move |t| done.lock().expect("lock").push(format!("complete:{t}")))
            .on_failure(move |e| failed.lock().expect("lock").push(format!("failure:{e}")));

        callbacks.notify(&SessionEvent::Completed(Completion {
            text: "ok".into(),
            ..Default::default()
        }));
        callbacks.notify(&SessionEvent::Failed(GenerateError::Stream("bad".into())));

        assert_eq!(
            *log.lock().expect("lock"),
            vec!["complete:ok", "failure:stream error: bad"]
        );
    }

    #[test]
    fn debug_shows_registered_slots() {
        let callbacks = StreamCallbacks::new().on_complete(|_| {});
        let debug = format!("{callbacks:?}");
        assert!(debug.contains("on_complete: true"));
        assert!(debug.contains("on_fragment: false"));
    }
}
