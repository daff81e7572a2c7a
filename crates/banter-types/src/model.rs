//! Collaborator traits for the model sidecar.

use crate::{GenerationRequest, ModelError, SpecialTokens, TokenId};
use std::future::Future;
use std::pin::Pin;

/// A boxed future returned by the collaborator traits.
pub type ModelFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ModelError>> + Send + 'a>>;

/// Text/token conversion backed by the dialogue model's tokenizer.
///
/// Dyn-compatible so the orchestrator works with `Arc<dyn Tokenizer>`.
pub trait Tokenizer: Send + Sync {
    /// Encode text into vocabulary ids.
    fn encode<'a>(&'a self, text: &'a str) -> ModelFuture<'a, Vec<TokenId>>;

    /// Decode vocabulary ids into text, optionally dropping special tokens.
    fn decode<'a>(&'a self, tokens: &'a [TokenId], skip_special: bool) -> ModelFuture<'a, String>;

    /// The fixed special tokens of the loaded vocabulary.
    fn special_tokens(&self) -> &SpecialTokens;
}

/// A generative dialogue model. One call yields one sampled continuation.
pub trait Generator: Send + Sync {
    /// Sample a single continuation for the request's prompt. Returns the
    /// full token tape (prompt + continuation).
    fn generate<'a>(&'a self, request: &'a GenerationRequest) -> ModelFuture<'a, Vec<TokenId>>;
}

/// Binary classifier flagging text the bot must not say.
pub trait ContentFilter: Send + Sync {
    fn has_disallowed_content<'a>(&'a self, text: &'a str) -> ModelFuture<'a, bool>;
}

/// Ordinal quality score for a candidate reply. Higher is better.
pub trait QualityRanker: Send + Sync {
    fn score<'a>(&'a self, text: &'a str) -> ModelFuture<'a, f32>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn traits_are_dyn_compatible() {
        // Compile-time check: every collaborator can be used as a trait object.
        fn _accept(
            _t: &dyn Tokenizer,
            _g: &dyn Generator,
            _f: &dyn ContentFilter,
            _r: &dyn QualityRanker,
        ) {
        }
    }

    #[test]
    fn arc_handles_are_send_sync() {
        fn _assert_send_sync<T: Send + Sync>() {}
        _assert_send_sync::<Arc<dyn Tokenizer>>();
        _assert_send_sync::<Arc<dyn Generator>>();
        _assert_send_sync::<Arc<dyn ContentFilter>>();
        _assert_send_sync::<Arc<dyn QualityRanker>>();
    }
}
