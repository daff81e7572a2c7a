//! Bot API HTTP client.

use std::time::Duration;

use banter_types::TransportError;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::types::{ApiResponse, GetUpdatesRequest, SendMessageRequest, Update};

/// The default Bot API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://api.telegram.org";

/// Extra slack on top of the long-poll timeout before the HTTP call
/// itself is abandoned.
const POLL_GRACE_SECS: u64 = 10;

/// Client for the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl TelegramClient {
    /// Create a client authenticated by the bot access token.
    pub fn new(token: impl Into<String>) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(Self {
            http,
            base_url: DEFAULT_API_BASE_URL.to_string(),
            token: token.into(),
        })
    }

    /// Point the client at a different API server (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Long-poll for updates after `offset`, waiting up to `timeout_secs`.
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TransportError> {
        let request = GetUpdatesRequest {
            offset,
            timeout: timeout_secs,
        };
        let updates = self
            .call("getUpdates", &request, Some(timeout_secs + POLL_GRACE_SECS))
            .await?;
        Ok(updates)
    }

    /// Send a plain-text reply into a chat.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TransportError> {
        // The result (the sent Message) is not interesting here.
        let _sent: serde_json::Value = self
            .call("sendMessage", &SendMessageRequest { chat_id, text }, None)
            .await?;
        Ok(())
    }

    /// POST one Bot API method and unwrap its response envelope.
    async fn call<B: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
        timeout_secs: Option<u64>,
    ) -> Result<R, TransportError> {
        // The token is part of the URL; log only the method name.
        tracing::debug!("Bot API call: {method}");
        let url = format!("{}/bot{}/{}", self.base_url, self.token, method);

        let mut request = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .json(body);
        if let Some(secs) = timeout_secs {
            request = request.timeout(Duration::from_secs(secs));
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        let envelope: ApiResponse<R> = response
            .json()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))?;

        if !envelope.ok {
            return Err(TransportError::Api {
                code: envelope.error_code.unwrap_or(0),
                description: envelope
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            });
        }
        envelope
            .result
            .ok_or_else(|| TransportError::Decode("ok response without result".to_string()))
    }
}
