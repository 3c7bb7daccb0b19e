//! Cooperative cancellation: an explicit token plus an optional run deadline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Something long-running work can poll between units of work
/// (between files while building, between paths while evaluating).
pub trait Cancellable {
    /// Check if the work should stop.
    fn is_cancelled(&self) -> bool;

    /// Request cancellation.
    fn cancel(&self);
}

/// Wall-clock limit for a whole analysis run.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
    budget: Duration,
}

impl Deadline {
    /// A deadline `budget` from now.
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
            budget,
        }
    }

    /// Build from a millisecond budget, as stored in config.
    pub fn from_millis(ms: u64) -> Self {
        Self::after(Duration::from_millis(ms))
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.at
    }

    /// The original budget in milliseconds.
    pub fn budget_ms(&self) -> u64 {
        self.budget.as_millis() as u64
    }
}

/// Shared cancellation token wrapping an `AtomicBool`.
///
/// Clones share the flag. An attached deadline trips the token once it
/// expires, so callers only ever poll `is_cancelled()`.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Deadline>,
}

impl CancellationToken {
    /// Create a new cancellation token (not cancelled, no deadline).
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: None,
        }
    }

    /// Create a token that cancels itself when `deadline` expires.
    pub fn with_deadline(deadline: Deadline) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Some(deadline),
        }
    }

    /// The attached deadline, if any.
    pub fn deadline(&self) -> Option<Deadline> {
        self.deadline
    }

    /// True when the deadline (not an explicit `cancel`) stopped the work.
    pub fn deadline_exceeded(&self) -> bool {
        self.deadline.is_some_and(|d| d.is_expired())
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl Cancellable for CancellationToken {
    fn is_cancelled(&self) -> bool {
        if self.cancelled.load(Ordering::Relaxed) {
            return true;
        }
        if self.deadline_exceeded() {
            self.cancelled.store(true, Ordering::Relaxed);
            return true;
        }
        false
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn expired_deadline_cancels() {
        let token = CancellationToken::with_deadline(Deadline::after(Duration::ZERO));
        assert!(token.is_cancelled());
        assert!(token.deadline_exceeded());
    }

    #[test]
    fn distant_deadline_does_not_cancel() {
        let token = CancellationToken::with_deadline(Deadline::from_millis(60_000));
        assert!(!token.is_cancelled());
        assert_eq!(token.deadline().map(|d| d.budget_ms()), Some(60_000));
    }
}
