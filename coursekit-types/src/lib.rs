#![deny(missing_docs)]
//! Shared vocabulary for coursekit.
//!
//! The generation client in `coursekit-ollama` speaks these types: requests
//! and responses for the generate endpoint, the [`SessionEvent`]s a streaming
//! session produces, the [`StreamCallbacks`] consumers register, and the
//! [`GenerateError`] taxonomy, plus the [`Generator`] seam that single-shot
//! consumers are generic over.

pub mod callbacks;
pub mod error;
pub mod generator;
pub mod types;

pub use callbacks::*;
pub use error::*;
pub use generator::*;
pub use types::*;
