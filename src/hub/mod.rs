//! # Hub Module
//!
//! Talks to the hosted model registry (HuggingFace Hub) in both
//! directions: fetching the pretrained model/tokenizer pair on startup
//! and publishing a local model directory as a one-shot operation.
//!
//! ## Key Components
//!
//! - `ModelProvider`: fetches and memoizes the loaded model bundle,
//!   at most one effective load per process
//! - `publish`: uploads a local directory to the registry entry
//!
//! Fetching goes through the `hf-hub` client (which handles caching and
//! auth); publishing posts an NDJSON commit directly with `reqwest`.

use std::error::Error;
use std::fmt;
use std::path::PathBuf;

pub mod provider;
pub mod publish;

pub use provider::ModelProvider;
pub use publish::publish;

/// Custom error types for registry operations
#[derive(Debug)]
pub enum HubError {
    /// The registry could not be reached, or rejected the request
    /// (network failure, bad credential, unknown identifier)
    ResourceUnavailable(String),
    /// A local input was unusable (missing directory, unreadable file)
    InvalidInput(String),
}

/// Implements Display trait for HubError for error reporting
impl fmt::Display for HubError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HubError::ResourceUnavailable(msg) => write!(f, "Registry unavailable: {}", msg),
            HubError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

/// Implements Error trait to allow HubError to be used as a standard error type
impl Error for HubError {}

/// Local paths of the files that make up a fetched model checkpoint
#[derive(Debug, Clone)]
pub struct ModelFiles {
    /// Model configuration (config.json)
    pub config: PathBuf,
    /// Serialized tokenizer (tokenizer.json)
    pub tokenizer: PathBuf,
    /// Model weights (model.safetensors)
    pub weights: PathBuf,
}
