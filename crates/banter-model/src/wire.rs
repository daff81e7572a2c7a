//! Wire types for the sidecar's JSON endpoints.

use banter_types::TokenId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct EncodeRequest<'a> {
    pub text: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EncodeResponse {
    pub tokens: Vec<TokenId>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DecodeRequest<'a> {
    pub tokens: &'a [TokenId],
    pub skip_special_tokens: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DecodeResponse {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateResponse {
    pub tokens: Vec<TokenId>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ClassifyRequest<'a> {
    pub text: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ToxicityResponse {
    pub flagged: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QualityResponse {
    pub score: f32,
}
