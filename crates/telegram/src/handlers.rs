//! Inbound update handling: commands and document submissions.

use std::sync::Arc;

use {
    teloxide::{
        prelude::*,
        types::{MediaKind, MessageKind, UpdateKind},
    },
    tracing::{debug, info},
};

use bookferry_pipeline::{
    pipeline::{IncomingFile, IngestionPipeline},
    ratelimit::MAX_FILES_PER_HOUR,
    validate::{MAX_FILE_SIZE_BYTES, allowed_extensions_list},
};

use crate::outbound::ChatReplier;

/// Shared context for both the polling loop and the webhook listener.
pub struct HandlerContext {
    pub bot: Bot,
    pub pipeline: Arc<IngestionPipeline>,
}

/// Dispatch one raw update. Only message updates are consumed.
pub async fn handle_update(update: Update, ctx: &HandlerContext) -> anyhow::Result<()> {
    match update.kind {
        UpdateKind::Message(msg) => handle_message(msg, ctx).await,
        other => {
            debug!("ignoring non-message update: {other:?}");
            Ok(())
        },
    }
}

/// Handle a single inbound Telegram message.
///
/// `/start` and `/help` reply with the usage text; a document submission is
/// handed to the ingestion pipeline; everything else is ignored.
pub async fn handle_message(msg: Message, ctx: &HandlerContext) -> anyhow::Result<()> {
    let chat_id = msg.chat.id;

    if let Some(text) = msg.text() {
        let cmd = text.trim();
        if cmd.starts_with("/start") || cmd.starts_with("/help") {
            ctx.bot.send_message(chat_id, help_text()).await?;
            return Ok(());
        }
    }

    let Some(document) = extract_document(&msg) else {
        debug!(chat_id = chat_id.0, "ignoring non-document message");
        return Ok(());
    };
    let Some(user) = msg.from.as_ref() else {
        debug!(chat_id = chat_id.0, "ignoring document without a sender");
        return Ok(());
    };

    let incoming = IncomingFile {
        identity: user.id.0.to_string(),
        filename: document
            .file_name
            .clone()
            .unwrap_or_else(|| "book".to_string()),
        declared_size: document.file_size,
        file_ref: document.file_id,
    };

    info!(
        identity = incoming.identity,
        filename = incoming.filename,
        declared_size = ?incoming.declared_size,
        "document received"
    );

    let replier = ChatReplier::new(ctx.bot.clone(), chat_id);
    let outcome = ctx.pipeline.ingest(&incoming, &replier).await;
    debug!(identity = incoming.identity, ?outcome, "pipeline run finished");
    Ok(())
}

/// Usage text for `/start` and `/help`, built from the pipeline constants.
pub fn help_text() -> String {
    format!(
        "Hi! Send me a book file, and I'll forward it to your PocketBook.\n\n\
         What to know:\n\
         \u{2022} Allowed formats: {}\n\
         \u{2022} Max file size: {} MB\n\
         \u{2022} Rate limit: up to {} files per hour per user\n\
         \u{2022} Make sure your PocketBook email is set in the bot configuration.",
        allowed_extensions_list(),
        MAX_FILE_SIZE_BYTES / (1024 * 1024),
        MAX_FILES_PER_HOUR,
    )
}

/// Document metadata relevant to the pipeline.
struct DocumentInfo {
    file_id: String,
    file_name: Option<String>,
    file_size: Option<u64>,
}

/// Extract document metadata from a message, if it carries one.
fn extract_document(msg: &Message) -> Option<DocumentInfo> {
    match &msg.kind {
        MessageKind::Common(common) => match &common.media_kind {
            MediaKind::Document(d) => Some(DocumentInfo {
                file_id: d.document.file.id.clone(),
                file_name: d.document.file_name.clone(),
                // The Bot API does not always report a size; zero means
                // "not declared", which the validator lets through.
                file_size: (d.document.file.size > 0).then(|| u64::from(d.document.file.size)),
            }),
            _ => None,
        },
        _ => None,
    }
}
