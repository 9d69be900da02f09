//! Bot API file downloads into local transient storage.

use std::{path::Path, time::Duration};

use {
    async_trait::async_trait,
    futures::StreamExt,
    teloxide::prelude::*,
    tokio::io::AsyncWriteExt,
    tracing::debug,
};

use bookferry_pipeline::transfer::{FileSource, TransferError};

use crate::error::Result;

/// Resolves Telegram file IDs and streams the bytes to disk.
///
/// Retrying is the pipeline's job; one `fetch` call is a single attempt.
pub struct TelegramFileSource {
    bot: Bot,
    http: reqwest::Client,
}

impl TelegramFileSource {
    /// `fetch_timeout` bounds one whole download attempt so a stuck
    /// transfer cannot occupy its retry slot indefinitely.
    pub fn new(bot: Bot, fetch_timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(fetch_timeout).build()?;
        Ok(Self { bot, http })
    }
}

#[async_trait]
impl FileSource for TelegramFileSource {
    async fn fetch(&self, file_ref: &str, dest: &Path) -> std::result::Result<(), TransferError> {
        let file = self
            .bot
            .get_file(file_ref)
            .await
            .map_err(|e| TransferError::new("resolve file reference", e))?;

        // Bot API file URL: https://api.telegram.org/file/bot<token>/<path>
        let url = format!(
            "https://api.telegram.org/file/bot{}/{}",
            self.bot.token(),
            file.path
        );

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| TransferError::new("request file", e))?;
        if !response.status().is_success() {
            return Err(TransferError::message(format!(
                "file download failed: HTTP {}",
                response.status()
            )));
        }

        // Stream to disk chunk by chunk; a 25 MiB book never needs to sit
        // in memory whole.
        let mut out = tokio::fs::File::create(dest)
            .await
            .map_err(|e| TransferError::new("create local file", e))?;
        let mut stream = response.bytes_stream();
        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| TransferError::new("read file stream", e))?;
            out.write_all(&chunk)
                .await
                .map_err(|e| TransferError::new("write local file", e))?;
            written += chunk.len() as u64;
        }
        out.flush()
            .await
            .map_err(|e| TransferError::new("flush local file", e))?;

        debug!(file_ref, bytes = written, dest = %dest.display(), "file downloaded");
        Ok(())
    }
}
