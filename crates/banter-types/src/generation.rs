//! Data model for candidate generation and selection.

use serde::{Deserialize, Serialize};

/// A vocabulary id produced by the tokenizer.
pub type TokenId = u32;

/// Sampling parameters for one generation call.
///
/// The defaults are the values the dialogue model was tuned against;
/// overriding them is possible through configuration but rarely useful.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Hard cap on the total token tape (prompt + continuation).
    pub max_length: u32,
    /// Top-k sampling cutoff.
    pub top_k: u32,
    /// Nucleus sampling threshold.
    pub top_p: f32,
    /// Softmax temperature.
    pub temperature: f32,
    /// Disallow repeating any n-gram of this size.
    pub no_repeat_ngram: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            max_length: 2048,
            top_k: 50,
            top_p: 0.9,
            temperature: 0.6,
            no_repeat_ngram: 3,
        }
    }
}

/// Special token ids the generator consumes verbatim, plus the
/// end-of-sequence marker in text form (it is interpolated into the
/// wrapped prompt before encoding).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialTokens {
    pub eos_id: TokenId,
    pub mask_id: TokenId,
    pub pad_id: TokenId,
    pub unk_id: TokenId,
    pub eos_text: String,
}

/// An immutable request for one candidate continuation.
///
/// Also the wire body sent to the model sidecar's generate endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: Vec<TokenId>,
    pub sampling: SamplingConfig,
    pub special: SpecialTokens,
}

/// One sampled continuation under consideration.
///
/// `tokens` is the full updated context (prompt + continuation), `text`
/// the decoded continuation only. Candidates live for a single turn.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub tokens: Vec<TokenId>,
    pub text: String,
    pub score: Option<f32>,
}

/// The winning candidate for a turn, written back into the session.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionResult {
    pub tokens: Vec<TokenId>,
    pub text: String,
}
