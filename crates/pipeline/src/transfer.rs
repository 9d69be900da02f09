//! The file-fetch seam between the pipeline and the chat transport.

use std::path::Path;

use {async_trait::async_trait, thiserror::Error};

/// A transfer from the transport into local transient storage failed.
#[derive(Debug, Error)]
#[error("{context}: {source}")]
pub struct TransferError {
    context: String,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl TransferError {
    #[must_use]
    pub fn new(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            context: context.into(),
            source: Box::new(source),
        }
    }

    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            context: message.into(),
            source: "transfer failed".into(),
        }
    }
}

/// Resolves a transport-side file reference and streams its bytes to a
/// local path.
///
/// Implementations do not retry; the pipeline wraps every call in
/// [`run_with_retry`](crate::retry::run_with_retry). The underlying HTTP
/// client must carry a finite timeout so a stuck fetch cannot occupy its
/// retry slot forever.
#[async_trait]
pub trait FileSource: Send + Sync {
    async fn fetch(&self, file_ref: &str, dest: &Path) -> Result<(), TransferError>;
}
