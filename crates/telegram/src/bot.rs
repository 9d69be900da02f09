//! Long-polling update loop.

use std::sync::Arc;

use {
    secrecy::ExposeSecret,
    teloxide::{
        ApiError, RequestError,
        prelude::*,
        types::{AllowedUpdate, BotCommand, UpdateKind},
    },
    tokio_util::sync::CancellationToken,
    tracing::{debug, error, info, warn},
};

use bookferry_config::TelegramSettings;

use crate::{error::Result, handlers, handlers::HandlerContext};

/// Build a bot with a client timeout longer than the long-polling timeout
/// (30s) so the HTTP client doesn't abort the request before Telegram
/// responds.
pub fn build_bot(settings: &TelegramSettings) -> Result<Bot> {
    let client = teloxide::net::default_reqwest_settings()
        .timeout(std::time::Duration::from_secs(45))
        .build()?;
    Ok(Bot::with_client(settings.token.expose_secret(), client))
}

/// Start polling for updates.
///
/// Verifies credentials, clears any leftover webhook, registers the slash
/// commands, then spawns a background task that processes updates until the
/// returned `CancellationToken` is cancelled.
pub async fn start_polling(ctx: Arc<HandlerContext>) -> anyhow::Result<CancellationToken> {
    let bot = ctx.bot.clone();

    let me = bot.get_me().await?;
    bot.delete_webhook().send().await?;

    let commands = vec![
        BotCommand::new("start", "Show what this bot accepts"),
        BotCommand::new("help", "Show what this bot accepts"),
    ];
    if let Err(e) = bot.set_my_commands(commands).await {
        warn!("failed to register bot commands: {e}");
    }

    info!(username = ?me.username, "telegram bot connected (webhook cleared)");

    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();

    tokio::spawn(async move {
        info!("starting telegram polling loop");
        let mut offset: i32 = 0;

        loop {
            if cancel_clone.is_cancelled() {
                info!("telegram polling stopped");
                break;
            }

            let result = bot
                .get_updates()
                .offset(offset)
                .timeout(30)
                .allowed_updates(vec![AllowedUpdate::Message])
                .await;

            match result {
                Ok(updates) => {
                    debug!(count = updates.len(), "got telegram updates");
                    for update in updates {
                        offset = update.id.as_offset();
                        match update.kind {
                            UpdateKind::Message(msg) => {
                                debug!(chat_id = msg.chat.id.0, "received telegram message");
                                if let Err(e) = handlers::handle_message(msg, &ctx).await {
                                    error!(error = %e, "error handling telegram message");
                                }
                            },
                            other => {
                                debug!("ignoring non-message update: {other:?}");
                            },
                        }
                    }
                },
                Err(e) => {
                    // Another instance polling with the same token: stop
                    // rather than fight over updates.
                    if matches!(&e, RequestError::Api(ApiError::TerminatedByOtherGetUpdates)) {
                        error!(
                            "another bot instance is already running with this token, stopping"
                        );
                        cancel_clone.cancel();
                        break;
                    }

                    warn!(error = %e, "telegram getUpdates failed");
                    tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                },
            }
        }
    });

    Ok(cancel)
}
