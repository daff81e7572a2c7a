//! Candidate generation, filtering, ranking, and winner selection.

use crate::error::TurnError;
use crate::session::ModelHandles;
use banter_types::{
    Candidate, GenerationRequest, ModelError, SamplingConfig, SelectionResult, TokenId,
};
use std::time::Duration;
use tokio::time::timeout;

/// Drives one turn's selection: sample N candidates, drop the
/// unacceptable ones, rank the rest, pick the best or fall back.
pub struct ResponseSelector {
    handles: ModelHandles,
    sampling: SamplingConfig,
    default_answer: String,
    generation_timeout: Duration,
}

impl ResponseSelector {
    pub fn new(
        handles: ModelHandles,
        sampling: SamplingConfig,
        default_answer: String,
        generation_timeout: Duration,
    ) -> Self {
        Self {
            handles,
            sampling,
            default_answer,
            generation_timeout,
        }
    }

    /// Select a reply for `prompt`.
    ///
    /// Candidates are `candidate_count` independent draws — each call
    /// samples fresh from the model, so draws are i.i.d. and not
    /// guaranteed distinct. A draw that errors or times out is dropped
    /// and the turn continues; only if every draw fails does the turn
    /// fail. If filtering and ranking leave nothing, the configured
    /// default answer is the winner, exempt from both.
    pub async fn select(
        &self,
        prompt: &[TokenId],
        candidate_count: usize,
        filter_enabled: bool,
    ) -> Result<SelectionResult, TurnError> {
        let request = GenerationRequest {
            prompt: prompt.to_vec(),
            sampling: self.sampling,
            special: self.handles.tokenizer.special_tokens().clone(),
        };

        let mut candidates = Vec::with_capacity(candidate_count);
        let mut last_failure = None;
        for attempt in 0..candidate_count {
            match self.generate_one(&request).await {
                Ok(candidate) => candidates.push(candidate),
                Err(err) => {
                    tracing::warn!("generation attempt {attempt} failed: {err}");
                    last_failure = Some(err);
                }
            }
        }

        // Every draw erroring is a malfunction, distinct from "no draw
        // survived selection" below.
        if candidates.is_empty() {
            if let Some(source) = last_failure {
                return Err(TurnError::GenerationFailed {
                    attempts: candidate_count,
                    source,
                });
            }
        }

        let mut scored = Vec::with_capacity(candidates.len());
        for mut candidate in candidates {
            if filter_enabled {
                match self
                    .handles
                    .filter
                    .has_disallowed_content(&candidate.text)
                    .await
                {
                    Ok(false) => {}
                    Ok(true) => {
                        tracing::debug!(text = %candidate.text, "content filter rejected candidate");
                        continue;
                    }
                    Err(err) => {
                        // A filter we cannot ask is a filter that said no.
                        tracing::warn!("content filter failed, dropping candidate: {err}");
                        continue;
                    }
                }
            }

            match self.handles.ranker.score(&candidate.text).await {
                Ok(score) => {
                    candidate.score = Some(score);
                    scored.push(candidate);
                }
                Err(err) => {
                    tracing::warn!("quality ranker failed, dropping candidate: {err}");
                }
            }
        }

        // Ascending stable sort; the winner is the last element. Among
        // equal top scores the most recently generated draw wins.
        scored.sort_by(|a, b| {
            a.score
                .unwrap_or(f32::NEG_INFINITY)
                .total_cmp(&b.score.unwrap_or(f32::NEG_INFINITY))
        });

        match scored.pop() {
            Some(winner) => Ok(SelectionResult {
                tokens: winner.tokens,
                text: winner.text,
            }),
            None => self.fallback(prompt).await,
        }
    }

    /// One independent draw: generate, validate the tape, decode the
    /// continuation.
    async fn generate_one(&self, request: &GenerationRequest) -> Result<Candidate, ModelError> {
        let generated = timeout(
            self.generation_timeout,
            self.handles.generator.generate(request),
        )
        .await;
        let tokens = match generated {
            Ok(result) => result?,
            Err(_) => return Err(ModelError::Timeout),
        };

        if tokens.len() < request.prompt.len() {
            return Err(ModelError::Decode(format!(
                "token tape shorter than prompt ({} < {})",
                tokens.len(),
                request.prompt.len()
            )));
        }

        let text = self
            .handles
            .tokenizer
            .decode(&tokens[request.prompt.len()..], true)
            .await?;
        Ok(Candidate {
            tokens,
            text,
            score: None,
        })
    }

    /// The canned answer for when nothing survived selection. Trusted,
    /// operator-configured text: it skips the filter and the ranker.
    async fn fallback(&self, prompt: &[TokenId]) -> Result<SelectionResult, TurnError> {
        tracing::info!("no candidate survived selection, using the default answer");
        let answer_tokens = self
            .handles
            .tokenizer
            .encode(&self.default_answer)
            .await
            .map_err(TurnError::Fallback)?;
        let mut tokens = Vec::with_capacity(prompt.len() + answer_tokens.len());
        tokens.extend_from_slice(prompt);
        tokens.extend(answer_tokens);
        Ok(SelectionResult {
            tokens,
            text: self.default_answer.clone(),
        })
    }
}
