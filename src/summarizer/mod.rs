//! # Summarization Module
//!
//! The summarizer module produces bounded-length summaries of raw input
//! text using a pretrained sequence-to-sequence model. It handles input
//! tokenization, constrained beam-search decoding, and output decoding.
//!
//! ## Key Components
//!
//! - `ModelBundle`: The tokenizer/model pair loaded from fetched files
//! - `SummarizerEngine`: Runs one summarization request end to end
//! - `BeamSearch`: The constrained decoding loop over model log-probs
//!
//! ## Architecture
//!
//! The transformer forward pass comes from `candle_transformers` and
//! tokenization from the `tokenizers` crate; this module owns only the
//! glue between them and the decoding loop. The engine wraps the model
//! in a `Mutex` because the forward pass needs `&mut` for its caches,
//! but the bundle is logically read-only after load.

use std::error::Error;
use std::fmt;

pub mod beam;
pub mod bundle;
pub mod engine;

pub use beam::{BeamSearch, StepScorer};
pub use bundle::{BundleInfo, ModelBundle};
pub use engine::SummarizerEngine;

/// Outcome of a successful generation pass.
///
/// An empty (after trimming) decode is a reportable outcome of its own,
/// not a failure: the model ran to completion but produced nothing usable.
#[derive(Debug, Clone, PartialEq)]
pub enum SummaryOutcome {
    /// A non-empty, whitespace-trimmed summary
    Summary(String),
    /// Generation completed but decoded to an empty string
    Empty,
}

/// Custom error types for summarization operations
#[derive(Debug)]
pub enum SummarizerError {
    /// Tokenizing the input or decoding the output failed
    Tokenization(String),
    /// The model forward pass or the decoding loop failed
    Generation(String),
}

/// Implements Display trait for SummarizerError for error reporting.
/// The full cause text is part of the message since it is surfaced
/// verbatim to the user.
impl fmt::Display for SummarizerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SummarizerError::Tokenization(msg) => write!(f, "Tokenization failed: {}", msg),
            SummarizerError::Generation(msg) => write!(f, "Generation failed: {}", msg),
        }
    }
}

/// Implements Error trait to allow SummarizerError to be used as a standard error type
impl Error for SummarizerError {}

/// Fixed decoding parameters for one summarization pass.
///
/// These mirror the generation settings in the configuration file and do
/// not change between requests.
#[derive(Debug, Clone)]
pub struct GenerationParams {
    /// Input token budget (truncate and pad to this length)
    pub max_input_tokens: usize,
    /// Maximum number of generated summary tokens
    pub max_summary_tokens: usize,
    /// EOS is masked until this many tokens have been generated
    pub min_summary_tokens: usize,
    /// Number of live beams
    pub beam_width: usize,
    /// Stop once `beam_width` hypotheses have finished
    pub early_stopping: bool,
    /// N-gram size that must not repeat in the output (0 disables)
    pub no_repeat_ngram: usize,
}

impl From<&crate::config::GenerationConfig> for GenerationParams {
    fn from(cfg: &crate::config::GenerationConfig) -> Self {
        Self {
            max_input_tokens: cfg.max_input_tokens,
            max_summary_tokens: cfg.max_summary_tokens,
            min_summary_tokens: cfg.min_summary_tokens,
            beam_width: cfg.beam_width,
            early_stopping: cfg.early_stopping,
            no_repeat_ngram: cfg.no_repeat_ngram,
        }
    }
}

/// The seam between the presentation layer and the inference service.
///
/// The engine implements this against the real model; tests drive the
/// submission flow with stub implementations.
pub trait Summarize: Send + Sync {
    /// Produces a summary outcome for the given raw input text.
    ///
    /// Callers are responsible for rejecting empty/whitespace-only input
    /// before invoking this; generation on empty input is undefined.
    fn summarize(&self, text: &str) -> Result<SummaryOutcome, SummarizerError>;
}
