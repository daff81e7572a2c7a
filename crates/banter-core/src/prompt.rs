//! Prompt assembly: utterance clipping, length hint, speaker markers.

use crate::error::TurnError;
use banter_types::{TokenId, Tokenizer, clip_chars};
use std::sync::Arc;

/// Hard cap on an incoming utterance, in characters. Longer input is
/// silently clipped, not rejected.
pub const MAX_UTTERANCE_CHARS: usize = 256;

/// Discretized length hint the generative model was conditioned on.
///
/// The thresholds are a fixed contract with the model's training data —
/// any other bucketing produces markers it has never seen.
pub fn length_hint(token_count: usize) -> char {
    if token_count <= 15 {
        '1'
    } else if token_count <= 50 {
        '2'
    } else if token_count <= 256 {
        '3'
    } else {
        '-'
    }
}

/// Formats an utterance into model-ready prompt tokens.
///
/// Pure with respect to session state: the caller passes the current
/// context tape in and gets the extended prompt back.
pub struct PromptBuilder {
    tokenizer: Arc<dyn Tokenizer>,
}

impl PromptBuilder {
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self { tokenizer }
    }

    /// Build the prompt for one turn: clip the utterance, compute its
    /// length hint, wrap it with speaker/length/turn markers, and append
    /// the encoded result to the existing context tokens.
    pub async fn build(
        &self,
        context: &[TokenId],
        utterance: &str,
    ) -> Result<Vec<TokenId>, TurnError> {
        let clipped = clip_chars(utterance, MAX_UTTERANCE_CHARS);
        let utterance_tokens = self
            .tokenizer
            .encode(clipped)
            .await
            .map_err(TurnError::Prompt)?;
        let hint = length_hint(utterance_tokens.len());

        let eos = &self.tokenizer.special_tokens().eos_text;
        let wrapped = format!("|0|{hint}|{clipped}{eos}|1|1|");
        let wrapped_tokens = self
            .tokenizer
            .encode(&wrapped)
            .await
            .map_err(TurnError::Prompt)?;

        let mut prompt = Vec::with_capacity(context.len() + wrapped_tokens.len());
        prompt.extend_from_slice(context);
        prompt.extend(wrapped_tokens);
        Ok(prompt)
    }
}
