//! Cooperative cancellation for long construction loops.
//!
//! Build loops check a shared cancel flag once per iteration and, when
//! cancelled, simply stop - leaving everything built so far in place for
//! inspection. There is no rollback; callers learn how much finished
//! through their progress callback.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A shared cancel flag.
///
/// ## Rust Lesson #25: Arc & Atomics
///
/// `Arc<AtomicBool>` is the smallest unit of thread-safe shared state:
/// `Arc` makes the flag cheaply clonable across threads, and the atomic
/// lets both sides read/write it without a mutex. No locks, no data
/// races - the compiler won't let you share a plain `bool` like this!
///
/// Clone it into whatever thread drives the build; call `cancel()` from
/// anywhere. Checking is a relaxed atomic load, cheap enough for every
/// iteration of a placement or wiring loop.
#[derive(Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_uncancelled() {
        assert!(!CancelToken::new().is_cancelled());
    }

    #[test]
    fn clones_share_the_flag() {
        let token = CancelToken::new();
        let other = token.clone();
        other.cancel();
        assert!(token.is_cancelled());
    }
}
