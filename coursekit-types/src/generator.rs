//! Generator trait for text-generation backends.
//!
//! Like the other async seams here, [`Generator`] uses RPITIT and is not
//! object-safe; consumers are generic over `G: Generator`.

use std::future::Future;

use crate::error::GenerateError;
use crate::types::{Completion, GenerateRequest};

/// A backend that turns a prompt into a finished, display-ready completion.
pub trait Generator: Send + Sync {
    /// Run a single-shot generation and return the cleaned result.
    fn generate(
        &self,
        request: GenerateRequest,
    ) -> impl Future<Output = Result<Completion, GenerateError>> + Send;
}
