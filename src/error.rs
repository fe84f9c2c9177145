//! Error taxonomy for the pipeline.
//!
//! The only seam with a typed error contract is the model adapter: the
//! retry controller needs to treat "transport failed" and "call succeeded
//! but produced nothing" uniformly without stringly-typed matching.
//! Everything else propagates `anyhow::Result` with context.

use async_openai::error::OpenAIError;
use thiserror::Error;

/// Failure of a single model invocation. Never retried at this layer;
/// recovery is the retry controller's job.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Transport, rate-limit, or validation failure from the provider.
    #[error("model API call failed (model: {model}): {source}")]
    Api {
        model: String,
        #[source]
        source: OpenAIError,
    },

    /// The call succeeded but returned no usable text.
    #[error("model returned an empty response (model: {model})")]
    EmptyResponse { model: String },
}

/// Exam catalog problems, detected at load time before any network call.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("exam {exam}: invalid page range [{start}, {end}) in section {section}")]
    InvalidRange {
        exam: String,
        section: usize,
        start: u32,
        end: u32,
    },

    #[error("exam {exam} has no sections")]
    NoSections { exam: String },

    #[error("duplicate exam name in catalog: {exam}")]
    DuplicateExam { exam: String },
}
