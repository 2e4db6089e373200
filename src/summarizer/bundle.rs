use std::error::Error;
use std::fs;

use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use candle_transformers::models::t5;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokenizers::{PaddingParams, Tokenizer, TruncationParams};
use tracing::info;

use super::SummarizerError;
use crate::hub::ModelFiles;

/// Display/API metadata about a loaded bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleInfo {
    /// Registry identifier the bundle was fetched under
    pub registry_id: String,
    /// When the bundle finished loading
    pub loaded_at: DateTime<Utc>,
    /// Tokenizer vocabulary size (including added tokens)
    pub vocab_size: usize,
    /// Device the model runs on
    pub device: String,
}

/// The pretrained tokenizer/model pair plus its parsed configuration.
///
/// Created once per process by the model provider and read-only after
/// load; the engine serializes access because the forward pass needs
/// `&mut` for its internal state.
pub struct ModelBundle {
    pub tokenizer: Tokenizer,
    pub model: t5::T5ForConditionalGeneration,
    pub config: t5::Config,
    pub device: Device,
    pub info: BundleInfo,
}

impl ModelBundle {
    /// Loads a bundle from fetched checkpoint files.
    ///
    /// # Arguments
    ///
    /// * `files` - Local paths of config, tokenizer, and weights
    /// * `registry_id` - Registry identifier, kept for display
    /// * `max_input_tokens` - Truncation bound applied to the tokenizer
    pub fn load(
        files: &ModelFiles,
        registry_id: &str,
        max_input_tokens: usize,
    ) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let device = Device::Cpu;

        let config_text = fs::read_to_string(&files.config)?;
        let mut config: t5::Config = serde_json::from_str(&config_text)?;
        // The decoding loop re-feeds the full prefix every step, so the
        // model-side KV cache must stay off
        config.use_cache = false;

        let mut tokenizer = Tokenizer::from_file(&files.tokenizer)?;
        configure_tokenizer(&mut tokenizer, max_input_tokens)?;

        info!("Loading model weights from {}", files.weights.display());
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[files.weights.clone()], DType::F32, &device)?
        };
        let model = t5::T5ForConditionalGeneration::load(vb, &config)?;

        let info = BundleInfo {
            registry_id: registry_id.to_string(),
            loaded_at: Utc::now(),
            vocab_size: tokenizer.get_vocab_size(true),
            device: "cpu".to_string(),
        };

        Ok(Self {
            tokenizer,
            model,
            config,
            device,
            info,
        })
    }

    /// End-of-sequence token id used to terminate generation
    pub fn eos_token(&self) -> u32 {
        self.config.eos_token_id as u32
    }

    /// Decoder start prefix: the configured decoder start token, plus the
    /// forced BOS token when the tokenizer defines one (BART-style
    /// checkpoints; T5 tokenizers have no `<s>` and skip it).
    pub fn start_tokens(&self) -> Vec<u32> {
        let start = self
            .config
            .decoder_start_token_id
            .unwrap_or(self.config.pad_token_id) as u32;
        let mut tokens = vec![start];
        if let Some(bos) = self.tokenizer.token_to_id("<s>") {
            if bos != start {
                tokens.push(bos);
            }
        }
        tokens
    }
}

/// Applies the fixed input bounds to a tokenizer: truncate to the token
/// budget, pad to the longest sequence in the batch.
pub fn configure_tokenizer(
    tokenizer: &mut Tokenizer,
    max_input_tokens: usize,
) -> Result<(), SummarizerError> {
    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length: max_input_tokens,
            ..Default::default()
        }))
        .map_err(|e| SummarizerError::Tokenization(e.to_string()))?;
    tokenizer.with_padding(Some(PaddingParams::default()));
    Ok(())
}
