//! # irlbench
//!
//! Benchmarking pipeline for language models on Irish Leaving Certificate
//! exams, in four sequential stages, each a separate binary:
//!
//! 1. `extract_problems` - vision model turns scanned exam pages plus the
//!    marking-scheme pages into `Problem N / Answer N` text blocks.
//! 2. `generate_response` - the student model answers each extracted
//!    problem; answers land in a per-exam CSV.
//! 3. `generate_judgement` - the judge model grades each answer against
//!    the marking scheme and emits a JSON verdict.
//! 4. `run_analysis` - verdicts are aggregated into per-subject and
//!    per-language scores and language-fidelity statistics.
//!
//! ## Layering
//!
//! - `catalog` - which exams exist and how their page scans pair with the
//!   marking-scheme scans; validated before anything touches the network.
//! - `services` - the model adapter (one call, no retries) and the fixed
//!   prompt texts.
//! - `retry` - bounded retry-with-backoff around one invocation; terminal
//!   failure is a value, never a panic or abort.
//! - `pipeline` - the per-stage batch loops; each row's result (or a
//!   failure sentinel) is persisted before the next row starts.
//! - `analysis` - tolerant verdict decoding and score aggregation.

pub mod analysis;
pub mod catalog;
pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod records;
pub mod retry;
pub mod services;

pub use catalog::{ExamCatalog, ExamSpec, ImageRange, Language};
pub use config::Config;
pub use error::{AdapterError, CatalogError};
pub use records::{JudgementRow, ResponseRow, Verdict};
pub use retry::{with_retry, Outcome, RetryPolicy};
pub use services::{ModelAdapter, ResponseMode};
