//! Best-effort user acknowledgements.

use async_trait::async_trait;

/// Sends a plain-text reply to the submitter through the transport.
///
/// Acknowledgements are advisory: the pipeline never retries them and a
/// failed send only produces a warning log.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, text: &str) -> anyhow::Result<()>;
}
