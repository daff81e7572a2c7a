//! End-to-end turn flow through a real `Session` with fake collaborators.
//!
//! Covers the selection pipeline (generate → filter → rank → pick),
//! the fallback answer, and sliding-window eviction across turns.

use banter_core::{ModelHandles, Session, SessionSettings};
use banter_types::{
    ContentFilter, GenerationRequest, Generator, ModelError, ModelFuture, QualityRanker,
    SamplingConfig, SpecialTokens, TokenId, Tokenizer,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const DEFAULT_ANSWER: &str = "You've lost me. Try again?";

fn chars(text: &str) -> Vec<TokenId> {
    text.chars().map(|c| c as TokenId).collect()
}

fn text_of(tokens: &[TokenId]) -> String {
    tokens.iter().filter_map(|&t| char::from_u32(t)).collect()
}

/// Character-codepoint tokenizer: counts are char counts, decode is the
/// identity.
struct CharTokenizer {
    special: SpecialTokens,
}

impl CharTokenizer {
    fn new() -> Self {
        Self {
            special: SpecialTokens {
                eos_id: 0x0011_0000,
                mask_id: 0x0011_0001,
                pad_id: 0x0011_0002,
                unk_id: 0x0011_0003,
                eos_text: "<eos>".into(),
            },
        }
    }
}

impl Tokenizer for CharTokenizer {
    fn encode<'a>(&'a self, text: &'a str) -> ModelFuture<'a, Vec<TokenId>> {
        Box::pin(async move { Ok(chars(text)) })
    }

    fn decode<'a>(&'a self, tokens: &'a [TokenId], _skip_special: bool) -> ModelFuture<'a, String> {
        Box::pin(async move { Ok(text_of(tokens)) })
    }

    fn special_tokens(&self) -> &SpecialTokens {
        &self.special
    }
}

/// Replays scripted continuations in order, one per generation call.
struct ScriptedGenerator {
    replies: Mutex<VecDeque<String>>,
}

impl ScriptedGenerator {
    fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
        }
    }
}

impl Generator for ScriptedGenerator {
    fn generate<'a>(&'a self, request: &'a GenerationRequest) -> ModelFuture<'a, Vec<TokenId>> {
        Box::pin(async move {
            let next = self.replies.lock().unwrap().pop_front();
            match next {
                Some(text) => {
                    let mut tape = request.prompt.clone();
                    tape.extend(chars(&text));
                    Ok(tape)
                }
                None => Err(ModelError::Server {
                    status: 500,
                    message: "no more scripted replies".into(),
                }),
            }
        })
    }
}

/// Flags texts containing "banned".
struct SubstringFilter;

impl ContentFilter for SubstringFilter {
    fn has_disallowed_content<'a>(&'a self, text: &'a str) -> ModelFuture<'a, bool> {
        Box::pin(async move { Ok(text.contains("banned")) })
    }
}

/// Scores the trailing digit of the text, so scripts control ranking.
struct DigitRanker;

impl QualityRanker for DigitRanker {
    fn score<'a>(&'a self, text: &'a str) -> ModelFuture<'a, f32> {
        Box::pin(async move {
            let score = text
                .chars()
                .last()
                .and_then(|c| c.to_digit(10))
                .unwrap_or(0);
            Ok(score as f32)
        })
    }
}

fn build_session(replies: &[&str], window_size: usize, candidate_count: usize) -> Session {
    let handles = ModelHandles {
        tokenizer: Arc::new(CharTokenizer::new()),
        generator: Arc::new(ScriptedGenerator::new(replies)),
        filter: Arc::new(SubstringFilter),
        ranker: Arc::new(DigitRanker),
    };
    let settings = SessionSettings {
        window_size,
        candidate_count,
        filter_enabled: true,
        sampling: SamplingConfig::default(),
        default_answer: DEFAULT_ANSWER.into(),
        generation_timeout: Duration::from_secs(5),
    };
    Session::new(42, handles, settings)
}

/// Five draws, three flagged: only the two clean ones are ranked and
/// the better of those wins — even though a flagged draw scores higher.
#[tokio::test]
async fn filtered_draws_never_win() {
    let mut session = build_session(
        &["banned 9", "clean 3", "banned 8", "clean 5", "banned 7"],
        6,
        5,
    );
    let reply = session.process_turn("say something").await.unwrap();
    assert_eq!(reply, "clean 5");
}

/// Five draws, all flagged: the canned default answer is the reply and
/// it lands in the context like any other winner.
#[tokio::test]
async fn all_flagged_uses_default_answer() {
    let mut session = build_session(
        &["banned 1", "banned 2", "banned 3", "banned 4", "banned 5"],
        6,
        5,
    );
    let reply = session.process_turn("provoke me").await.unwrap();
    assert_eq!(reply, DEFAULT_ANSWER);

    let tape = text_of(session.window().tokens());
    assert!(tape.ends_with(DEFAULT_ANSWER), "tape: {tape}");
    assert_eq!(session.window().turn_count(), 1);
    assert_eq!(
        session.window().token_len(),
        session.window().turn_sizes().iter().sum::<usize>()
    );
}

/// Disabling the filter lets a flagged draw win on score alone.
#[tokio::test]
async fn toggled_off_filter_admits_flagged_draws() {
    let mut session = build_session(&["banned 9", "clean 3"], 6, 2);
    session.toggle_filter();
    let reply = session.process_turn("anything").await.unwrap();
    assert_eq!(reply, "banned 9");
}

/// Three turns through a two-turn window: the first turn is evicted,
/// the ledger keeps exactly the last two entries, and the invariant
/// between ledger and tape holds.
#[tokio::test]
async fn third_turn_evicts_first() {
    let mut session = build_session(&["alpha 1", "bravo 2", "charlie 3"], 2, 1);

    session.process_turn("one").await.unwrap();
    session.process_turn("two").await.unwrap();
    assert_eq!(session.window().turn_count(), 2);
    let sizes_after_two: Vec<usize> = session.window().turn_sizes().iter().copied().collect();

    session.process_turn("three").await.unwrap();
    assert_eq!(session.window().turn_count(), 2);
    assert_eq!(
        session.window().token_len(),
        session.window().turn_sizes().iter().sum::<usize>()
    );

    // The retained entries are the second and third turns' sizes.
    let sizes: Vec<usize> = session.window().turn_sizes().iter().copied().collect();
    assert_eq!(sizes[0], sizes_after_two[1]);

    let tape = text_of(session.window().tokens());
    assert!(!tape.contains("one"), "tape: {tape}");
    assert!(!tape.contains("alpha"), "tape: {tape}");
    assert!(tape.contains("two"), "tape: {tape}");
    assert!(tape.contains("charlie 3"), "tape: {tape}");
}

/// A restart mid-conversation wipes the context; the next turn starts
/// from an empty tape.
#[tokio::test]
async fn restart_starts_over() {
    let mut session = build_session(&["alpha 1", "bravo 2"], 6, 1);
    session.process_turn("hello").await.unwrap();
    session.restart();
    assert!(session.window().is_empty());

    session.process_turn("fresh").await.unwrap();
    let tape = text_of(session.window().tokens());
    assert!(tape.starts_with("|0|1|fresh"), "tape: {tape}");
    assert!(!tape.contains("alpha"), "tape: {tape}");
}
