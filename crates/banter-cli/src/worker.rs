//! Update-dispatch loop: long-poll the transport, route each message to
//! its chat's session, send back the reply.

use anyhow::Result;
use banter_config::BanterConfig;
use banter_core::{SessionRegistry, strip_mention};
use banter_telegram::TelegramClient;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

/// Reply for a turn that failed outright. Distinct from the configured
/// default answer so users can tell a malfunction from "no good reply".
pub const APOLOGY_REPLY: &str =
    "Ugh, something broke on my end. Give me a minute and try again.";

/// Pause after a failed poll before asking the transport again.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(3);

/// Run the long-poll loop until `cancel` fires.
///
/// Each update is handled on its own task; the per-chat session mutex
/// serializes turns within a chat, and the semaphore caps how many
/// turns hit the model backend at once.
pub async fn run(
    transport: TelegramClient,
    registry: Arc<SessionRegistry>,
    config: &BanterConfig,
    cancel: CancellationToken,
) -> Result<()> {
    let turn_permits = Arc::new(Semaphore::new(config.max_concurrent_turns));
    let bot_name = config.bot_name.clone().unwrap_or_default();
    let mut offset = 0i64;

    tracing::info!("listening for updates");
    loop {
        let updates = tokio::select! {
            _ = cancel.cancelled() => break,
            polled = transport.get_updates(offset, config.poll_timeout_secs) => match polled {
                Ok(updates) => updates,
                Err(err) => {
                    tracing::error!("update poll failed: {err}");
                    tokio::time::sleep(POLL_RETRY_DELAY).await;
                    continue;
                }
            },
        };

        for update in updates {
            offset = advance_offset(offset, update.update_id);
            let Some(message) = update.message else {
                continue;
            };
            let Some(text) = message.text else {
                continue;
            };
            let chat_id = message.chat.id;

            let transport = transport.clone();
            let registry = registry.clone();
            let permits = turn_permits.clone();
            let bot_name = bot_name.clone();
            tokio::spawn(async move {
                let Ok(_permit) = permits.acquire().await else {
                    return;
                };
                let session = registry.get_or_create(chat_id).await;
                let reply = {
                    let mut session = session.lock().await;
                    match session.respond(strip_mention(&text, &bot_name)).await {
                        Ok(reply) => reply,
                        Err(err) => {
                            tracing::error!(chat_id, "turn failed: {err}");
                            APOLOGY_REPLY.to_string()
                        }
                    }
                };
                if let Err(err) = transport.send_message(chat_id, &reply).await {
                    tracing::error!(chat_id, "failed to send reply: {err}");
                }
            });
        }
    }

    tracing::info!("worker stopped");
    Ok(())
}

/// Acknowledge an update: the next poll must start past it.
fn advance_offset(offset: i64, update_id: i64) -> i64 {
    offset.max(update_id + 1)
}
