//! Orchestration of one submission from inbound event to terminal state.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    sync::Arc,
};

use tracing::{error, info, warn};

use crate::{
    deliver::Mailer,
    error::RejectReason,
    notify::Notifier,
    ratelimit::RateLimiter,
    retry::{RetryPolicy, run_with_retry},
    transfer::FileSource,
    validate,
};

/// One inbound document event, as handed over by the transport layer.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    /// Stable per-user identifier from the transport.
    pub identity: String,
    /// Original filename, also used as the attachment display name.
    pub filename: String,
    /// Size as reported by the transport, when it reports one.
    pub declared_size: Option<u64>,
    /// Transport-side file handle resolved by the [`FileSource`].
    pub file_ref: String,
}

/// Terminal state of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Refused by policy before any network transfer.
    Rejected(RejectReason),
    /// Transferred, delivered and cleaned up.
    Delivered,
    /// Transfer or delivery exhausted its retry budget.
    Failed,
}

/// Orchestrates validate → rate-limit → transfer → dispatch → cleanup for
/// each incoming document.
///
/// Everything a run touches is local to that run except the [`RateLimiter`]
/// window map. Transient files live in a per-run unique directory under
/// `download_dir`, so identically-named submissions from different users
/// never collide; the directory is removed on every exit path past the
/// point it was created.
pub struct IngestionPipeline {
    allowlist: HashSet<String>,
    limiter: RateLimiter,
    retry: RetryPolicy,
    download_dir: PathBuf,
    source: Arc<dyn FileSource>,
    mailer: Arc<dyn Mailer>,
}

impl IngestionPipeline {
    pub fn new(
        allowlist: impl IntoIterator<Item = String>,
        download_dir: impl Into<PathBuf>,
        source: Arc<dyn FileSource>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            allowlist: allowlist.into_iter().collect(),
            limiter: RateLimiter::new(),
            retry: RetryPolicy::default(),
            download_dir: download_dir.into(),
            source,
            mailer,
        }
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Run one submission to a terminal state.
    ///
    /// Never returns early without an acknowledgement: every terminal state
    /// sends exactly one best-effort reply through `notify`, and no error
    /// escapes past this boundary.
    pub async fn ingest(&self, file: &IncomingFile, notify: &dyn Notifier) -> Outcome {
        if let Some(reason) = self.policy_check(file) {
            info!(
                identity = file.identity,
                filename = file.filename,
                %reason,
                "submission rejected"
            );
            self.send(notify, &reason.user_message()).await;
            return Outcome::Rejected(reason);
        }

        // Per-run staging directory: unique path, removed on drop whatever
        // happens past this point.
        let staging = match tempfile::tempdir_in(&self.download_dir) {
            Ok(dir) => dir,
            Err(e) => {
                error!(
                    identity = file.identity,
                    error = %e,
                    "failed to create staging directory"
                );
                self.send(notify, GENERIC_FAILURE_MSG).await;
                return Outcome::Failed;
            },
        };
        let local_path = staging.path().join(local_name(&file.filename));

        let fetched = run_with_retry("download file", &self.retry, || {
            self.source.fetch(&file.file_ref, &local_path)
        })
        .await;
        if let Err(e) = fetched {
            error!(
                identity = file.identity,
                filename = file.filename,
                error = %e,
                "file download failed after retries"
            );
            drop(staging);
            self.send(notify, GENERIC_FAILURE_MSG).await;
            return Outcome::Failed;
        }

        self.send(
            notify,
            &format!(
                "File {} downloaded. Sending it to your PocketBook (this may take a moment)...",
                file.filename
            ),
        )
        .await;

        let delivered = run_with_retry("send email", &self.retry, || {
            self.mailer.deliver(&local_path, &file.filename)
        })
        .await;

        // Cleanup is unconditional once a local file exists, success or not.
        drop(staging);

        match delivered {
            Ok(()) => {
                info!(
                    identity = file.identity,
                    filename = file.filename,
                    "book delivered"
                );
                self.send(notify, SUCCESS_MSG).await;
                Outcome::Delivered
            },
            Err(e) => {
                // The underlying relay/auth detail stays in the logs; the
                // user only sees the generic message.
                error!(
                    identity = file.identity,
                    filename = file.filename,
                    error = %e,
                    "mail delivery failed after retries"
                );
                self.send(notify, GENERIC_FAILURE_MSG).await;
                Outcome::Failed
            },
        }
    }

    /// Validation and quota checks, strictly before any network transfer.
    fn policy_check(&self, file: &IncomingFile) -> Option<RejectReason> {
        if !self.allowlist.contains(&file.identity) {
            return Some(RejectReason::NotAllowed);
        }
        if !validate::is_allowed_extension(&file.filename) {
            return Some(RejectReason::UnsupportedExtension);
        }
        if validate::exceeds_size(file.declared_size) {
            return Some(RejectReason::TooLarge);
        }
        if self.limiter.check_and_record_now(&file.identity) {
            return Some(RejectReason::RateLimited);
        }
        None
    }

    async fn send(&self, notify: &dyn Notifier, text: &str) {
        if let Err(e) = notify.notify(text).await {
            warn!(error = %e, "failed to send acknowledgement");
        }
    }
}

const SUCCESS_MSG: &str = "The book has been successfully sent to your PocketBook!";
const GENERIC_FAILURE_MSG: &str = "An error occurred while sending the book. Please try again.";

/// Reduce a transport-supplied filename to its final path component.
/// The name is attacker-controlled and must not traverse out of the
/// staging directory.
fn local_name(filename: &str) -> String {
    Path::new(filename)
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| "book".to_string())
}
