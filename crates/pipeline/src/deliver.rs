//! The mail-delivery seam between the pipeline and the SMTP relay.

use std::path::Path;

use {async_trait::async_trait, thiserror::Error};

/// Submitting a message to the mail relay failed.
#[derive(Debug, Error)]
#[error("{context}: {source}")]
pub struct DeliveryError {
    context: String,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl DeliveryError {
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
}

/// Packages a local file as a mail attachment and submits it to the fixed
/// destination mailbox.
///
/// Mail submission is synchronous network I/O by nature; implementations
/// must run it off the cooperative scheduler (a worker thread whose handle
/// is awaited) so concurrent pipeline runs are never stalled.
/// Implementations do not retry; the pipeline wraps every call in
/// [`run_with_retry`](crate::retry::run_with_retry).
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn deliver(&self, file_path: &Path, display_filename: &str)
    -> Result<(), DeliveryError>;
}
