use std::collections::HashSet;

use super::{GenerationParams, SummarizerError};

/// One decoding step: log-probabilities over the vocabulary for the next
/// token given the decoder prefix so far (including the start tokens).
///
/// The engine implements this on top of the model's decoder forward pass;
/// tests use deterministic tables.
pub trait StepScorer {
    fn log_probs(&mut self, prefix: &[u32]) -> Result<Vec<f32>, SummarizerError>;
}

/// A partial decoder hypothesis. `tokens` includes the start prefix,
/// `score` is the accumulated log-probability of the generated part.
#[derive(Debug, Clone)]
struct Hypothesis {
    tokens: Vec<u32>,
    score: f32,
}

/// A finished hypothesis: generated tokens (start prefix and EOS stripped)
/// and the length-normalized score used for final ranking.
#[derive(Debug, Clone)]
struct Finished {
    generated: Vec<u32>,
    normalized: f32,
}

/// Beam-search decoding with the fixed summarization constraints:
/// minimum length before EOS, maximum length, no-repeat n-grams, and
/// optional early stopping once enough hypotheses have finished.
pub struct BeamSearch {
    params: GenerationParams,
    /// End-of-sequence token id
    eos_token: u32,
    /// Decoder start tokens (decoder start id, plus the forced BOS token
    /// when the tokenizer defines one)
    start_tokens: Vec<u32>,
}

impl BeamSearch {
    pub fn new(params: GenerationParams, eos_token: u32, start_tokens: Vec<u32>) -> Self {
        Self {
            params,
            eos_token,
            start_tokens,
        }
    }

    /// Runs the decoding loop and returns the generated token ids of the
    /// best hypothesis, excluding the start prefix and EOS.
    pub fn run(&self, scorer: &mut dyn StepScorer) -> Result<Vec<u32>, SummarizerError> {
        let start_len = self.start_tokens.len();
        let mut beams = vec![Hypothesis {
            tokens: self.start_tokens.clone(),
            score: 0.0,
        }];
        let mut finished: Vec<Finished> = Vec::new();

        'steps: for _ in 0..self.params.max_summary_tokens {
            // Gather scored continuations across all live beams
            let mut candidates: Vec<(usize, u32, f32)> = Vec::new();

            for (beam_idx, beam) in beams.iter().enumerate() {
                let log_probs = scorer.log_probs(&beam.tokens)?;
                let generated = &beam.tokens[start_len..];
                let banned = banned_next_tokens(generated, self.params.no_repeat_ngram);
                let eos_allowed = generated.len() >= self.params.min_summary_tokens;

                // Keeping one extra candidate per beam guarantees enough
                // non-EOS continuations survive the merge below.
                let top = top_tokens(&log_probs, self.params.beam_width + 1, |token| {
                    if token == self.eos_token {
                        !eos_allowed
                    } else {
                        banned.contains(&token)
                    }
                });

                for (token, lp) in top {
                    candidates.push((beam_idx, token, beam.score + lp));
                }
            }

            if candidates.is_empty() {
                break;
            }
            candidates.sort_by(|a, b| b.2.total_cmp(&a.2));

            // Fill the next beam set from the best candidates, retiring
            // hypotheses that chose EOS
            let mut next_beams: Vec<Hypothesis> = Vec::new();
            for (beam_idx, token, score) in candidates {
                if token == self.eos_token {
                    let generated = beams[beam_idx].tokens[start_len..].to_vec();
                    // Length-normalized score; EOS counts toward the length
                    let normalized = score / (generated.len() + 1) as f32;
                    finished.push(Finished {
                        generated,
                        normalized,
                    });
                    if self.params.early_stopping && finished.len() >= self.params.beam_width {
                        break 'steps;
                    }
                } else if next_beams.len() < self.params.beam_width {
                    let mut tokens = beams[beam_idx].tokens.clone();
                    tokens.push(token);
                    next_beams.push(Hypothesis { tokens, score });
                }
                if next_beams.len() == self.params.beam_width {
                    break;
                }
            }

            if next_beams.is_empty() {
                break;
            }
            beams = next_beams;
        }

        // Hypotheses still alive at the length limit compete on the same
        // normalized footing
        for beam in beams {
            let generated = beam.tokens[start_len..].to_vec();
            if generated.is_empty() {
                continue;
            }
            let normalized = beam.score / generated.len() as f32;
            finished.push(Finished {
                generated,
                normalized,
            });
        }

        finished
            .into_iter()
            .max_by(|a, b| a.normalized.total_cmp(&b.normalized))
            .map(|f| f.generated)
            .ok_or_else(|| {
                SummarizerError::Generation("beam search produced no hypotheses".to_string())
            })
    }
}

/// Next tokens that would complete an n-gram already present in the
/// generated sequence. Empty when the constraint is disabled or the
/// sequence is still shorter than the n-gram prefix.
fn banned_next_tokens(generated: &[u32], ngram: usize) -> HashSet<u32> {
    let mut banned = HashSet::new();
    if ngram == 0 || generated.len() + 1 < ngram {
        return banned;
    }
    let prefix = &generated[generated.len() + 1 - ngram..];
    for window in generated.windows(ngram) {
        if &window[..ngram - 1] == prefix {
            banned.insert(window[ngram - 1]);
        }
    }
    banned
}

/// Top-k (token, log-prob) pairs by score, skipping masked tokens.
/// Linear scan with an insertion-sorted buffer; k is tiny.
fn top_tokens(log_probs: &[f32], k: usize, masked: impl Fn(u32) -> bool) -> Vec<(u32, f32)> {
    let mut top: Vec<(u32, f32)> = Vec::with_capacity(k + 1);
    for (id, &lp) in log_probs.iter().enumerate() {
        let token = id as u32;
        if masked(token) {
            continue;
        }
        let pos = top.partition_point(|&(_, s)| s >= lp);
        if pos < k {
            top.insert(pos, (token, lp));
            top.truncate(k);
        }
    }
    top
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scorer backed by a closure from decoder prefix to log-probs
    struct FnScorer<F: FnMut(&[u32]) -> Vec<f32>>(F);

    impl<F: FnMut(&[u32]) -> Vec<f32>> StepScorer for FnScorer<F> {
        fn log_probs(&mut self, prefix: &[u32]) -> Result<Vec<f32>, SummarizerError> {
            Ok((self.0)(prefix))
        }
    }

    /// Scorer that always fails, for error propagation tests
    struct FailingScorer;

    impl StepScorer for FailingScorer {
        fn log_probs(&mut self, _prefix: &[u32]) -> Result<Vec<f32>, SummarizerError> {
            Err(SummarizerError::Generation("scorer exploded".to_string()))
        }
    }

    fn params(min: usize, max: usize, beams: usize, ngram: usize) -> GenerationParams {
        GenerationParams {
            max_input_tokens: 512,
            max_summary_tokens: max,
            min_summary_tokens: min,
            beam_width: beams,
            early_stopping: true,
            no_repeat_ngram: ngram,
        }
    }

    #[test]
    fn test_eos_is_masked_until_min_length() {
        // EOS (id 2) is by far the best token at every step, but the
        // minimum length must hold it off for three tokens
        let mut scorer = FnScorer(|_: &[u32]| vec![-2.0, -3.0, -0.1]);
        let search = BeamSearch::new(params(3, 5, 1, 0), 2, vec![0]);
        let result = search.run(&mut scorer).unwrap();
        assert_eq!(result, vec![0, 0, 0]);
    }

    #[test]
    fn test_no_repeat_bigram_bans_seen_continuations() {
        // The scorer wants to alternate a,b forever; the bigram constraint
        // forces a detour through c and finally a,a
        let mut scorer = FnScorer(|prefix: &[u32]| match prefix.last() {
            Some(0) => vec![-1.5, -0.1, -0.7, -9.0],
            Some(1) => vec![-0.1, -1.5, -0.7, -9.0],
            Some(2) => vec![-0.1, -0.7, -1.5, -9.0],
            _ => vec![-0.1, -0.7, -1.2, -9.0],
        });
        let search = BeamSearch::new(params(0, 6, 1, 2), 3, vec![9]);
        let result = search.run(&mut scorer).unwrap();
        assert_eq!(result, vec![0, 1, 0, 2, 0, 0]);
    }

    #[test]
    fn test_beam_search_recovers_from_greedy_trap() {
        // Token a (0.67) beats b (0.41) at the first step, but everything
        // after a is poor while b finishes cleanly. Greedy would take a;
        // two beams find the better overall hypothesis through b.
        let mut scorer = FnScorer(|prefix: &[u32]| match prefix.last() {
            Some(0) => vec![-3.0, -3.0, -2.0],
            Some(1) => vec![-4.0, -4.0, -0.1],
            _ => vec![-0.4, -0.9, -9.0],
        });
        let search = BeamSearch::new(params(0, 3, 2, 0), 2, vec![7]);
        let result = search.run(&mut scorer).unwrap();
        assert_eq!(result, vec![1]);
    }

    #[test]
    fn test_generation_stops_at_max_tokens() {
        // EOS never becomes attractive, so the length limit is the only stop
        let mut scorer = FnScorer(|_: &[u32]| vec![-0.5, -0.6, -20.0]);
        let search = BeamSearch::new(params(0, 8, 1, 0), 2, vec![0]);
        let result = search.run(&mut scorer).unwrap();
        assert_eq!(result.len(), 8);
    }

    #[test]
    fn test_start_prefix_is_fed_to_scorer_but_not_emitted() {
        let mut first_prefix: Option<Vec<u32>> = None;
        let mut scorer = FnScorer(|prefix: &[u32]| {
            if first_prefix.is_none() {
                first_prefix = Some(prefix.to_vec());
            }
            vec![-0.1, -1.0, -9.0]
        });
        let search = BeamSearch::new(params(0, 2, 1, 0), 2, vec![7, 8]);
        let result = search.run(&mut scorer).unwrap();
        assert_eq!(result, vec![0, 0]);
        assert_eq!(first_prefix, Some(vec![7, 8]));
    }

    #[test]
    fn test_scorer_error_propagates() {
        let search = BeamSearch::new(params(0, 4, 2, 0), 2, vec![0]);
        let err = search.run(&mut FailingScorer).unwrap_err();
        assert!(err.to_string().contains("scorer exploded"));
    }

    #[test]
    fn test_banned_next_tokens_matches_prior_ngrams() {
        // After [5, 6, 5] the pending bigram prefix is [5]; (5, 6) has been
        // seen, so 6 is banned
        let banned = banned_next_tokens(&[5, 6, 5], 2);
        assert!(banned.contains(&6));
        assert_eq!(banned.len(), 1);

        // Disabled constraint bans nothing
        assert!(banned_next_tokens(&[5, 6, 5], 0).is_empty());

        // Unigram mode bans every previously emitted token
        let banned = banned_next_tokens(&[5, 6, 5], 1);
        assert!(banned.contains(&5) && banned.contains(&6));
    }
}
