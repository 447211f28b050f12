#![no_main]

use coursekit_ollama::StreamAssembler;
use coursekit_types::{LinePolicy, SessionEvent};
use libfuzzer_sys::fuzz_target;

// First byte picks the policy and the chunk size; the rest is the stream.
fuzz_target!(|data: &[u8]| {
    let Some((&control, body)) = data.split_first() else {
        return;
    };
    let policy = if control & 1 == 0 {
        LinePolicy::Discard
    } else {
        LinePolicy::Verbatim
    };
    let chunk_size = usize::from(control >> 1).max(1);

    let mut state = StreamAssembler::new(policy);
    let mut events = Vec::new();
    for chunk in body.chunks(chunk_size) {
        events.extend(state.push(chunk));
    }
    events.extend(state.finish());

    let terminals = events.iter().filter(|e| e.is_terminal()).count();
    assert_eq!(terminals, 1);
    assert!(events.last().is_some_and(SessionEvent::is_terminal));
});
