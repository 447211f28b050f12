#![deny(missing_docs)]
//! Ollama generate API client for coursekit.
//!
//! This crate implements [`Generator`] for the
//! [Ollama generate API](https://github.com/ollama/ollama/blob/main/docs/api.md#generate-a-completion)
//! and assembles its NDJSON streams into display-ready text.
//!
//! # Usage
//!
//! ```no_run
//! use coursekit_ollama::{Ollama, StreamOptions};
//! use coursekit_types::{GenerateRequest, StreamCallbacks};
//!
//! # async fn run() -> Result<(), coursekit_types::GenerateError> {
//! let client = Ollama::new();
//! let callbacks = StreamCallbacks::new().on_fragment(|text| println!("{text}"));
//! let completion = client
//!     .generate_stream(&GenerateRequest::new("Summarise chapter 1"), StreamOptions::new(), callbacks)
//!     .await?;
//! println!("{}", completion.text);
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - Streaming sessions as callbacks or as a [`SessionEvent`] stream
//! - Byte-level line framing, so multi-byte characters split across chunks survive
//! - Per-call [`LinePolicy`] for lines that are not valid JSON
//! - Cancellation via [`CancellationToken`](tokio_util::sync::CancellationToken)
//! - `<think>` block removal on single-shot responses
//! - Rule-plus-model price suggestions

pub mod cleaner;
pub mod client;
pub mod config;
pub mod error;
pub mod framing;
pub mod mapping;
pub mod pricing;
pub mod streaming;
pub mod types;

pub use cleaner::{ResponseCleaner, clean_response};
pub use client::{Ollama, StreamOptions};
pub use config::OllamaConfig;
pub use framing::LineFramer;
pub use pricing::{PriceQuery, PriceSuggestion, extract_price, rule_based_price};
pub use streaming::{StreamAssembler, assemble, dispatch};

// Re-export coursekit-types for convenience
pub use coursekit_types::{
    Completion, GenerateError, GenerateRequest, Generator, LinePolicy, SessionEvent,
    StreamCallbacks,
};
