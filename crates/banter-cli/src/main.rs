//! Banter — a reply-selection chat bot for generative dialogue models.

mod worker;

use anyhow::{Context, Result};
use banter_config::{BanterConfig, CliOverrides};
use banter_core::{ModelHandles, SessionRegistry, SessionSettings};
use banter_model::ModelClient;
use banter_telegram::TelegramClient;
use clap::Parser;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "banter", version, about = "A reply-selection chat bot")]
struct Cli {
    /// Bot access token (overrides BANTER_BOT_TOKEN)
    #[arg(long)]
    bot_token: Option<String>,

    /// Model sidecar base URL (overrides BANTER_MODEL_URL)
    #[arg(long)]
    model_url: Option<String>,

    /// Process a single utterance locally and print the reply (no transport)
    #[arg(short, long)]
    once: Option<String>,

    /// Enable verbose/debug logging
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(io::stderr)
        .init();

    let config = BanterConfig::load(CliOverrides {
        bot_token: cli.bot_token,
        model_base_url: cli.model_url,
    })
    .map_err(|e| anyhow::anyhow!("{e}"))?;

    let model = Arc::new(
        ModelClient::connect(config.model_base_url.clone())
            .await
            .with_context(|| {
                format!(
                    "Failed to connect to model sidecar at {}",
                    config.model_base_url
                )
            })?,
    );
    let handles = ModelHandles {
        tokenizer: model.clone(),
        generator: model.clone(),
        filter: model.clone(),
        ranker: model,
    };

    let settings = SessionSettings {
        window_size: config.window_size,
        candidate_count: config.candidate_count,
        filter_enabled: true,
        sampling: config.sampling,
        default_answer: config.default_answer.clone(),
        generation_timeout: Duration::from_millis(config.generation_timeout_ms),
    };
    let registry = Arc::new(SessionRegistry::new(handles, settings));

    if let Some(utterance) = cli.once {
        // Local mode: one turn against a scratch session, reply to stdout.
        let session = registry.get_or_create(0).await;
        let reply = session.lock().await.respond(&utterance).await?;
        println!("{reply}");
        return Ok(());
    }

    let transport =
        TelegramClient::new(config.bot_token.clone()).map_err(|e| anyhow::anyhow!("{e}"))?;

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown requested");
            shutdown.cancel();
        }
    });

    worker::run(transport, registry, &config, cancel).await
}
