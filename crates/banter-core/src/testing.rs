//! Fake collaborators for unit tests.
//!
//! The fake tokenizer maps each character to its codepoint, so token
//! counts equal character counts and decoding is the identity — enough
//! to exercise every selection path deterministically.

use banter_types::{
    ContentFilter, GenerationRequest, Generator, ModelError, ModelFuture, QualityRanker,
    SpecialTokens, TokenId, Tokenizer,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Ids at or above this are "special" and never map back to a char.
const SPECIAL_BASE: TokenId = 0x0011_0000;

pub(crate) fn special_tokens() -> SpecialTokens {
    SpecialTokens {
        eos_id: SPECIAL_BASE,
        mask_id: SPECIAL_BASE + 1,
        pad_id: SPECIAL_BASE + 2,
        unk_id: SPECIAL_BASE + 3,
        eos_text: "<eos>".into(),
    }
}

/// Encode text the way [`FakeTokenizer`] does.
pub(crate) fn encode_chars(text: &str) -> Vec<TokenId> {
    text.chars().map(|c| c as TokenId).collect()
}

pub(crate) struct FakeTokenizer {
    special: SpecialTokens,
}

impl FakeTokenizer {
    pub(crate) fn new() -> Self {
        Self {
            special: special_tokens(),
        }
    }
}

impl Tokenizer for FakeTokenizer {
    fn encode<'a>(&'a self, text: &'a str) -> ModelFuture<'a, Vec<TokenId>> {
        Box::pin(async move { Ok(encode_chars(text)) })
    }

    fn decode<'a>(&'a self, tokens: &'a [TokenId], skip_special: bool) -> ModelFuture<'a, String> {
        Box::pin(async move {
            Ok(tokens
                .iter()
                .filter(|&&t| !(skip_special && t >= SPECIAL_BASE))
                .filter_map(|&t| char::from_u32(t))
                .collect())
        })
    }

    fn special_tokens(&self) -> &SpecialTokens {
        &self.special
    }
}

/// Replays a script of continuations (or errors), one per generate call.
pub(crate) struct FakeGenerator {
    script: Mutex<VecDeque<Result<String, ModelError>>>,
}

impl FakeGenerator {
    pub(crate) fn with_replies(replies: &[&str]) -> Self {
        Self::with_script(replies.iter().map(|r| Ok(r.to_string())).collect())
    }

    pub(crate) fn with_script(script: Vec<Result<String, ModelError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
        }
    }
}

impl Generator for FakeGenerator {
    fn generate<'a>(&'a self, request: &'a GenerationRequest) -> ModelFuture<'a, Vec<TokenId>> {
        Box::pin(async move {
            let next = self.script.lock().unwrap().pop_front();
            match next {
                Some(Ok(text)) => {
                    let mut tape = request.prompt.clone();
                    tape.extend(encode_chars(&text));
                    Ok(tape)
                }
                Some(Err(err)) => Err(err),
                None => Err(ModelError::Server {
                    status: 500,
                    message: "generation script exhausted".into(),
                }),
            }
        })
    }
}

/// A generator whose calls never complete — for timeout tests.
pub(crate) struct StalledGenerator;

impl Generator for StalledGenerator {
    fn generate<'a>(&'a self, _request: &'a GenerationRequest) -> ModelFuture<'a, Vec<TokenId>> {
        Box::pin(std::future::pending())
    }
}

/// Flags any text containing one of the blocked substrings.
pub(crate) struct FakeFilter {
    blocked: Vec<String>,
    fail: bool,
}

impl FakeFilter {
    pub(crate) fn blocking(blocked: &[&str]) -> Self {
        Self {
            blocked: blocked.iter().map(|s| s.to_string()).collect(),
            fail: false,
        }
    }

    pub(crate) fn permissive() -> Self {
        Self::blocking(&[])
    }

    pub(crate) fn failing() -> Self {
        Self {
            blocked: Vec::new(),
            fail: true,
        }
    }
}

impl ContentFilter for FakeFilter {
    fn has_disallowed_content<'a>(&'a self, text: &'a str) -> ModelFuture<'a, bool> {
        Box::pin(async move {
            if self.fail {
                return Err(ModelError::Server {
                    status: 503,
                    message: "filter down".into(),
                });
            }
            Ok(self.blocked.iter().any(|b| text.contains(b)))
        })
    }
}

/// Scores from a fixed table; unknown text scores its length.
pub(crate) struct FakeRanker {
    scores: HashMap<String, f32>,
    fail_on: Vec<String>,
}

impl FakeRanker {
    pub(crate) fn by_length() -> Self {
        Self::with_scores(&[])
    }

    pub(crate) fn with_scores(scores: &[(&str, f32)]) -> Self {
        Self {
            scores: scores
                .iter()
                .map(|(text, score)| (text.to_string(), *score))
                .collect(),
            fail_on: Vec::new(),
        }
    }

    pub(crate) fn failing_on(mut self, text: &str) -> Self {
        self.fail_on.push(text.to_string());
        self
    }
}

impl QualityRanker for FakeRanker {
    fn score<'a>(&'a self, text: &'a str) -> ModelFuture<'a, f32> {
        Box::pin(async move {
            if self.fail_on.iter().any(|t| t == text) {
                return Err(ModelError::Server {
                    status: 503,
                    message: "ranker down".into(),
                });
            }
            Ok(self
                .scores
                .get(text)
                .copied()
                .unwrap_or(text.chars().count() as f32))
        })
    }
}
