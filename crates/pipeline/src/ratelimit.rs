//! Sliding-window per-identity submission quota.

use std::{
    collections::HashMap,
    sync::Mutex,
    time::{SystemTime, UNIX_EPOCH},
};

/// Maximum accepted submissions per identity within [`RATE_WINDOW_SECS`].
pub const MAX_FILES_PER_HOUR: usize = 10;

/// Length of the trailing rate window, in seconds.
pub const RATE_WINDOW_SECS: u64 = 3600;

/// Process-wide submission history, keyed by identity.
///
/// Each identity owns an ordered list of epoch-second timestamps inside the
/// trailing window; entries older than the window are purged lazily on each
/// check. The map lives for the life of the process and is never persisted,
/// so rate limits reset on restart. The mutex is `std::sync` because every
/// operation is a synchronous map update, never held across `.await` points;
/// it also serializes near-simultaneous checks for the same identity so two
/// concurrent submissions cannot both observe spare capacity.
pub struct RateLimiter {
    windows: Mutex<HashMap<String, Vec<u64>>>,
}

impl RateLimiter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Returns `true` if `identity` is currently rate-limited.
    ///
    /// When quota remains, `now` is recorded as a new submission and `false`
    /// is returned. A limited call records nothing, so being refused does
    /// not extend the window.
    pub fn check_and_record(&self, identity: &str, now: u64) -> bool {
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());
        let window = windows.entry(identity.to_string()).or_default();

        let cutoff = now.saturating_sub(RATE_WINDOW_SECS);
        window.retain(|&ts| ts >= cutoff);

        if window.len() >= MAX_FILES_PER_HOUR {
            return true;
        }
        window.push(now);
        false
    }

    /// [`check_and_record`](Self::check_and_record) against the wall clock.
    pub fn check_and_record_now(&self, identity: &str) -> bool {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        self.check_and_record(identity, now)
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_submission_is_not_limited() {
        let limiter = RateLimiter::new();
        assert!(!limiter.check_and_record("alice", 1000));
    }

    #[test]
    fn quota_exhausts_after_max_files() {
        let limiter = RateLimiter::new();
        for i in 0..MAX_FILES_PER_HOUR {
            assert!(
                !limiter.check_and_record("alice", 1000 + i as u64),
                "submission {i} should be under quota"
            );
        }
        assert!(limiter.check_and_record("alice", 2000));
        // A limited call must not extend the window: retrying at the same
        // instant stays limited, and the window still frees up on schedule.
        assert!(limiter.check_and_record("alice", 2000));
    }

    #[test]
    fn old_entries_are_purged_after_window() {
        let limiter = RateLimiter::new();
        for i in 0..MAX_FILES_PER_HOUR {
            assert!(!limiter.check_and_record("alice", 1000 + i as u64));
        }
        assert!(limiter.check_and_record("alice", 1100));

        // 3601s after the newest entry the full quota is restored.
        let later = 1000 + (MAX_FILES_PER_HOUR as u64 - 1) + RATE_WINDOW_SECS + 1;
        for i in 0..MAX_FILES_PER_HOUR {
            assert!(
                !limiter.check_and_record("alice", later + i as u64),
                "submission {i} should be under quota after the window passed"
            );
        }
    }

    #[test]
    fn identities_do_not_interfere() {
        let limiter = RateLimiter::new();
        for _ in 0..MAX_FILES_PER_HOUR {
            assert!(!limiter.check_and_record("alice", 1000));
        }
        assert!(limiter.check_and_record("alice", 1000));
        assert!(!limiter.check_and_record("bob", 1000));
    }
}
