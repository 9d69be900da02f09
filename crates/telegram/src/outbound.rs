//! Plain-text replies back to the submitting chat.

use {
    async_trait::async_trait,
    teloxide::{prelude::*, types::ChatId},
};

use bookferry_pipeline::notify::Notifier;

/// A notifier bound to the chat a submission came from.
///
/// Replies are advisory: the pipeline logs and swallows send failures, so
/// this type never retries.
pub struct ChatReplier {
    bot: Bot,
    chat_id: ChatId,
}

impl ChatReplier {
    #[must_use]
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }
}

#[async_trait]
impl Notifier for ChatReplier {
    async fn notify(&self, text: &str) -> anyhow::Result<()> {
        self.bot.send_message(self.chat_id, text).await?;
        Ok(())
    }
}
