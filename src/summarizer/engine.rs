use std::sync::{Arc, Mutex};

use candle_core::{Device, Tensor, D};
use candle_transformers::models::t5;
use tokenizers::Tokenizer;
use tracing::{debug, info};

use super::beam::{BeamSearch, StepScorer};
use super::bundle::{BundleInfo, ModelBundle};
use super::{GenerationParams, SummaryOutcome, Summarize, SummarizerError};

/// Runs summarization requests against a loaded model bundle.
///
/// One request at a time: the bundle is locked for the duration of a
/// `summarize` call, which matches the synchronous per-submission flow
/// of the presentation layer.
pub struct SummarizerEngine {
    bundle: Arc<Mutex<ModelBundle>>,
    params: GenerationParams,
    info: BundleInfo,
}

impl SummarizerEngine {
    pub fn new(bundle: Arc<Mutex<ModelBundle>>, params: GenerationParams) -> Self {
        let info = bundle
            .lock()
            .map(|b| b.info.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().info.clone());
        Self {
            bundle,
            params,
            info,
        }
    }

    /// Metadata about the loaded bundle, for the API and terminal display
    pub fn info(&self) -> &BundleInfo {
        &self.info
    }
}

impl Summarize for SummarizerEngine {
    /// Tokenizes the input (truncated to the configured bound), runs the
    /// constrained beam search, and decodes the best hypothesis with
    /// special tokens stripped.
    fn summarize(&self, text: &str) -> Result<SummaryOutcome, SummarizerError> {
        let mut guard = self
            .bundle
            .lock()
            .map_err(|_| SummarizerError::Generation("model mutex poisoned".to_string()))?;
        let bundle = &mut *guard;

        let input_ids = encode_input(&bundle.tokenizer, text)?;
        debug!("Encoded input to {} tokens", input_ids.len());

        let eos_token = bundle.eos_token();
        let start_tokens = bundle.start_tokens();
        let device = bundle.device.clone();

        let input = Tensor::new(input_ids.as_slice(), &device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(generation_error)?;
        let encoder_output = bundle.model.encode(&input).map_err(generation_error)?;

        let mut scorer = ModelScorer {
            model: &mut bundle.model,
            encoder_output: &encoder_output,
            device: &device,
        };
        let search = BeamSearch::new(self.params.clone(), eos_token, start_tokens);
        let summary_ids = search.run(&mut scorer)?;
        info!("Generated {} summary tokens", summary_ids.len());

        let summary = bundle
            .tokenizer
            .decode(&summary_ids, true)
            .map_err(|e| SummarizerError::Tokenization(e.to_string()))?;

        let trimmed = summary.trim();
        if trimmed.is_empty() {
            Ok(SummaryOutcome::Empty)
        } else {
            Ok(SummaryOutcome::Summary(trimmed.to_string()))
        }
    }
}

/// Scores the next token by running the decoder over the full prefix.
/// The bundle disables the model's KV cache, so every call is
/// self-contained and beams can share one model.
struct ModelScorer<'a> {
    model: &'a mut t5::T5ForConditionalGeneration,
    encoder_output: &'a Tensor,
    device: &'a Device,
}

impl StepScorer for ModelScorer<'_> {
    fn log_probs(&mut self, prefix: &[u32]) -> Result<Vec<f32>, SummarizerError> {
        let decoder_ids = Tensor::new(prefix, self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(generation_error)?;
        let logits = self
            .model
            .decode(&decoder_ids, self.encoder_output)
            .map_err(generation_error)?;
        let logits = logits.squeeze(0).map_err(generation_error)?;
        let log_probs =
            candle_nn::ops::log_softmax(&logits, D::Minus1).map_err(generation_error)?;
        log_probs.to_vec1::<f32>().map_err(generation_error)
    }
}

fn generation_error(e: candle_core::Error) -> SummarizerError {
    SummarizerError::Generation(e.to_string())
}

/// Encodes raw text into input token ids, applying the truncation and
/// padding configured on the tokenizer at bundle load time.
pub fn encode_input(tokenizer: &Tokenizer, text: &str) -> Result<Vec<u32>, SummarizerError> {
    let encoding = tokenizer
        .encode(text, true)
        .map_err(|e| SummarizerError::Tokenization(e.to_string()))?;
    Ok(encoding.get_ids().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summarizer::bundle::configure_tokenizer;

    /// Minimal word-level tokenizer covering the pangram used below
    fn pangram_tokenizer() -> Tokenizer {
        let json = serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [],
            "normalizer": { "type": "Lowercase" },
            "pre_tokenizer": { "type": "Whitespace" },
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": {
                    "[UNK]": 0, "the": 1, "quick": 2, "brown": 3, "fox": 4,
                    "jumps": 5, "over": 6, "lazy": 7, "dog": 8, ".": 9
                },
                "unk_token": "[UNK]"
            }
        });
        Tokenizer::from_bytes(json.to_string().as_bytes()).unwrap()
    }

    #[test]
    fn test_encode_input_truncates_overlong_text_to_bound() {
        let mut tokenizer = pangram_tokenizer();
        configure_tokenizer(&mut tokenizer, 512).unwrap();

        // 60 repetitions x 10 tokens = 600 tokens, well past the bound
        let text = "The quick brown fox jumps over the lazy dog.".repeat(60);
        let ids = encode_input(&tokenizer, &text).unwrap();
        assert_eq!(ids.len(), 512);
    }

    #[test]
    fn test_encode_input_leaves_short_text_alone() {
        let mut tokenizer = pangram_tokenizer();
        configure_tokenizer(&mut tokenizer, 512).unwrap();

        let ids = encode_input(&tokenizer, "The quick brown fox jumps over the lazy dog.").unwrap();
        assert_eq!(ids.len(), 10);
        // No unknown tokens in the pangram
        assert!(ids.iter().all(|&id| id != 0));
    }
}
