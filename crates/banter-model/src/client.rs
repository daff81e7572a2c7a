//! Sidecar HTTP client implementing the collaborator traits.

use std::time::Duration;

use banter_types::{
    ContentFilter, GenerationRequest, Generator, ModelError, ModelFuture, QualityRanker,
    SpecialTokens, TokenId, Tokenizer,
};
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::retry::{RetryConfig, calculate_delay, is_retryable};
use crate::wire::{
    ClassifyRequest, DecodeRequest, DecodeResponse, EncodeRequest, EncodeResponse,
    GenerateResponse, QualityResponse, ToxicityResponse,
};

/// Client for the model sidecar's JSON API.
///
/// Special tokens are fetched once at connect time and cached — they are
/// a fixed property of the loaded vocabulary.
#[derive(Clone)]
pub struct ModelClient {
    http: reqwest::Client,
    base_url: String,
    retry_config: RetryConfig,
    special: SpecialTokens,
}

impl ModelClient {
    /// Connect to the sidecar at `base_url` and fetch its special tokens.
    pub async fn connect(base_url: impl Into<String>) -> Result<Self, ModelError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ModelError::Network(e.to_string()))?;
        let base_url = base_url.into();
        let special = fetch_special_tokens(&http, &base_url).await?;
        tracing::debug!(eos_id = special.eos_id, "connected to model sidecar");

        Ok(Self {
            http,
            base_url,
            retry_config: RetryConfig::default(),
            special,
        })
    }

    /// Set the retry configuration for transient errors (429, 529, 5xx, network).
    pub fn with_retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    /// POST a JSON body and parse a JSON response, retrying transient errors.
    async fn post_json<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, ModelError> {
        let url = format!("{}{}", self.base_url, path);
        let payload = serde_json::to_string(body).map_err(|e| ModelError::BadRequest {
            message: format!("Failed to serialize request: {e}"),
        })?;

        for attempt in 0..=self.retry_config.max_retries {
            tracing::debug!(
                "POST {url} (attempt {}/{})",
                attempt + 1,
                self.retry_config.max_retries + 1
            );

            let result = self
                .http
                .post(&url)
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(payload.clone())
                .send()
                .await;

            match result {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response
                            .json::<R>()
                            .await
                            .map_err(|e| ModelError::Decode(e.to_string()));
                    }

                    let body_text = response.text().await.unwrap_or_default();
                    let err = classify_error(status.as_u16(), &body_text);

                    if !is_retryable(&err) || attempt == self.retry_config.max_retries {
                        return Err(err);
                    }

                    let delay = calculate_delay(&self.retry_config, attempt);
                    tracing::warn!(
                        "Retryable sidecar error (attempt {}/{}): {err}. Retrying in {delay}ms...",
                        attempt + 1,
                        self.retry_config.max_retries,
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
                Err(e) => {
                    let err = if e.is_timeout() {
                        ModelError::Timeout
                    } else {
                        ModelError::Network(e.to_string())
                    };

                    if attempt == self.retry_config.max_retries {
                        return Err(err);
                    }

                    let delay = calculate_delay(&self.retry_config, attempt);
                    tracing::warn!(
                        "Retryable network error (attempt {}/{}): {err}. Retrying in {delay}ms...",
                        attempt + 1,
                        self.retry_config.max_retries,
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
            }
        }

        // Unreachable: the loop always returns on the last attempt
        unreachable!("retry loop should have returned")
    }
}

impl Tokenizer for ModelClient {
    fn encode<'a>(&'a self, text: &'a str) -> ModelFuture<'a, Vec<TokenId>> {
        Box::pin(async move {
            let response: EncodeResponse =
                self.post_json("/v1/encode", &EncodeRequest { text }).await?;
            Ok(response.tokens)
        })
    }

    fn decode<'a>(&'a self, tokens: &'a [TokenId], skip_special: bool) -> ModelFuture<'a, String> {
        Box::pin(async move {
            let response: DecodeResponse = self
                .post_json(
                    "/v1/decode",
                    &DecodeRequest {
                        tokens,
                        skip_special_tokens: skip_special,
                    },
                )
                .await?;
            Ok(response.text)
        })
    }

    fn special_tokens(&self) -> &SpecialTokens {
        &self.special
    }
}

impl Generator for ModelClient {
    fn generate<'a>(&'a self, request: &'a GenerationRequest) -> ModelFuture<'a, Vec<TokenId>> {
        Box::pin(async move {
            let response: GenerateResponse = self.post_json("/v1/generate", request).await?;
            Ok(response.tokens)
        })
    }
}

impl ContentFilter for ModelClient {
    fn has_disallowed_content<'a>(&'a self, text: &'a str) -> ModelFuture<'a, bool> {
        Box::pin(async move {
            let response: ToxicityResponse = self
                .post_json("/v1/toxicity", &ClassifyRequest { text })
                .await?;
            Ok(response.flagged)
        })
    }
}

impl QualityRanker for ModelClient {
    fn score<'a>(&'a self, text: &'a str) -> ModelFuture<'a, f32> {
        Box::pin(async move {
            let response: QualityResponse = self
                .post_json("/v1/quality", &ClassifyRequest { text })
                .await?;
            Ok(response.score)
        })
    }
}

/// Fetch the sidecar's special-token table.
async fn fetch_special_tokens(
    http: &reqwest::Client,
    base_url: &str,
) -> Result<SpecialTokens, ModelError> {
    let url = format!("{base_url}/v1/special_tokens");
    let response = http
        .get(&url)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                ModelError::Timeout
            } else {
                ModelError::Network(e.to_string())
            }
        })?;

    let status = response.status();
    if !status.is_success() {
        let body_text = response.text().await.unwrap_or_default();
        return Err(classify_error(status.as_u16(), &body_text));
    }

    response
        .json::<SpecialTokens>()
        .await
        .map_err(|e| ModelError::Decode(e.to_string()))
}

/// Classify an HTTP error response into a typed ModelError.
fn classify_error(status: u16, body: &str) -> ModelError {
    // Try to parse as JSON error response
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        error: Option<ErrorDetail>,
    }
    #[derive(serde::Deserialize)]
    struct ErrorDetail {
        message: Option<String>,
    }

    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .and_then(|e| e.message)
        .unwrap_or_else(|| body.to_string());

    match status {
        400 => ModelError::BadRequest { message },
        429 => ModelError::RateLimited {
            retry_after_ms: None,
        },
        529 => ModelError::Overloaded,
        _ => ModelError::Server { status, message },
    }
}
