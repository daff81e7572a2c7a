//! HTTP client for the model sidecar serving Banter's collaborators.
//!
//! One sidecar process hosts the dialogue model, its tokenizer, and the
//! two classifiers; this crate exposes them through the trait seams in
//! `banter-types` so the core never knows it is talking over HTTP.

mod client;
mod retry;
mod wire;

pub use client::ModelClient;
pub use retry::RetryConfig;
