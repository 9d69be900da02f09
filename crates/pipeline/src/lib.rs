//! Document ingestion and delivery pipeline for bookferry.
//!
//! One [`IngestionPipeline`] run takes a user-submitted file through
//! validation, rate limiting, a retried download into transient storage and
//! a retried mail delivery, then removes the local bytes regardless of how
//! the run ended. The transport (Telegram) and the mail relay are reached
//! through the [`FileSource`] and [`Mailer`] seams so the core stays free
//! of teloxide and SMTP types.

pub mod deliver;
pub mod error;
pub mod notify;
pub mod pipeline;
pub mod ratelimit;
pub mod retry;
pub mod transfer;
pub mod validate;

pub use {
    deliver::{DeliveryError, Mailer},
    error::RejectReason,
    notify::Notifier,
    pipeline::{IncomingFile, IngestionPipeline, Outcome},
    ratelimit::RateLimiter,
    retry::{RetryPolicy, run_with_retry},
    transfer::{FileSource, TransferError},
};
