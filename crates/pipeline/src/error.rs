//! Policy rejection reasons.
//!
//! Transient I/O failures live next to their seams
//! ([`TransferError`](crate::transfer::TransferError),
//! [`DeliveryError`](crate::deliver::DeliveryError)); this module covers the
//! other half of the taxonomy: refusals decided before any network transfer,
//! never retried and never allocating a resource.

use crate::{
    ratelimit::MAX_FILES_PER_HOUR,
    validate::{MAX_FILE_SIZE_BYTES, allowed_extensions_list},
};

/// Why a submission was refused before any bytes were requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// The sender identity is not on the allow-list.
    NotAllowed,
    /// The filename's extension is not in the accepted set.
    UnsupportedExtension,
    /// The declared size exceeds the ceiling.
    TooLarge,
    /// The sender exhausted the hourly quota.
    RateLimited,
}

impl RejectReason {
    /// The plain-text reply sent back to the submitter.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotAllowed => "You are not allowed to send files to this bot.".to_string(),
            Self::UnsupportedExtension => format!(
                "Unsupported file type. Allowed: {}",
                allowed_extensions_list()
            ),
            Self::TooLarge => format!(
                "File is too large. Max size is {} MB.",
                MAX_FILE_SIZE_BYTES / (1024 * 1024)
            ),
            Self::RateLimited => format!(
                "Rate limit exceeded. Please wait before sending more files (max {MAX_FILES_PER_HOUR} per hour)."
            ),
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAllowed => write!(f, "sender not on allow-list"),
            Self::UnsupportedExtension => write!(f, "unsupported file extension"),
            Self::TooLarge => write!(f, "declared size over limit"),
            Self::RateLimited => write!(f, "hourly quota exhausted"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_messages_name_the_concrete_limits() {
        assert!(
            RejectReason::UnsupportedExtension
                .user_message()
                .contains("epub, fb2, mobi, pdf, txt")
        );
        assert!(RejectReason::TooLarge.user_message().contains("25 MB"));
        assert!(RejectReason::RateLimited.user_message().contains("10 per hour"));
    }
}
