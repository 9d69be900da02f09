//! Telegram transport front-end for bookferry.
//!
//! Receives document uploads via the teloxide Bot API (either a long-poll
//! loop or an inbound-webhook HTTP listener) and hands each one to the
//! ingestion pipeline. Also implements the pipeline's `FileSource` (Bot API
//! file download) and `Notifier` (chat reply) seams.

pub mod bot;
pub mod error;
pub mod handlers;
pub mod outbound;
pub mod source;
pub mod webhook;

pub use {
    bot::{build_bot, start_polling},
    handlers::HandlerContext,
    outbound::ChatReplier,
    source::TelegramFileSource,
};
