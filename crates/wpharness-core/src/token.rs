//! Uniqueness tokens embedded in generated field values.
//!
//! The server's duplicate-comment detector compares author, email and
//! comment text, so every generated case carries a token that no other case
//! in the run shares.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A run-unique value derived from wall-clock milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UniquenessToken(u64);

impl UniquenessToken {
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for UniquenessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Source of strictly increasing tokens.
pub trait TokenSource: Send + Sync {
    /// Return a token greater than every token previously returned.
    fn next_token(&self) -> UniquenessToken;
}

/// Tokens from the system clock, bumped past the last issued value when the
/// clock has not advanced (or stepped backwards) between calls.
#[derive(Debug, Default)]
pub struct ClockTokenSource {
    last: AtomicU64,
}

impl ClockTokenSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn now_millis() -> u64 {
        u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
    }
}

impl TokenSource for ClockTokenSource {
    fn next_token(&self) -> UniquenessToken {
        let now = Self::now_millis();
        let previous = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last.saturating_add(1)))
            })
            .unwrap_or(now);
        UniquenessToken(now.max(previous.saturating_add(1)))
    }
}

/// Deterministic tokens counting up from a seed.
#[derive(Debug)]
pub struct SequenceTokenSource {
    next: AtomicU64,
}

impl SequenceTokenSource {
    #[must_use]
    pub const fn starting_at(seed: u64) -> Self {
        Self {
            next: AtomicU64::new(seed),
        }
    }
}

impl TokenSource for SequenceTokenSource {
    fn next_token(&self) -> UniquenessToken {
        UniquenessToken(self.next.fetch_add(1, Ordering::SeqCst))
    }
}
