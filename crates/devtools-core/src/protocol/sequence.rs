//! Thread-safe request id counter.
//!
//! # Why ids? (for beginners)
//!
//! Every command sent to a debugging target carries an integer `id`.  The
//! target echoes that id in its reply, which is how the client knows which
//! reply belongs to which command: replies and unsolicited events share the
//! same socket, and the id is the only correlation key.
//!
//! The counter starts at 0 and hands out strictly increasing values.  An id is
//! consumed even if the command later fails (send error, protocol error,
//! timeout), so ids are never reused within one session.
//!
//! # Thread safety
//!
//! The counter uses `AtomicU64`, so it can be shared behind an `Arc` without a
//! lock.  Two callers racing on [`RequestIdCounter::next`] always receive
//! different values.

use std::sync::atomic::{AtomicU64, Ordering};

/// A monotonically increasing source of request ids.
///
/// # Examples
///
/// ```rust
/// use devtools_core::protocol::RequestIdCounter;
///
/// let ids = RequestIdCounter::new();
/// assert_eq!(ids.next(), 0);
/// assert_eq!(ids.next(), 1);
/// assert_eq!(ids.peek(), 2);
/// ```
#[derive(Debug)]
pub struct RequestIdCounter {
    inner: AtomicU64,
}

impl RequestIdCounter {
    /// Creates a new counter starting at 0.
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Creates a counter whose first id is `first`.
    pub fn starting_at(first: u64) -> Self {
        Self {
            inner: AtomicU64::new(first),
        }
    }

    /// Returns the next id and advances the counter.
    ///
    /// `Relaxed` ordering is enough: the value is only used as a correlation
    /// key and never to publish other memory.
    pub fn next(&self) -> u64 {
        self.inner.fetch_add(1, Ordering::Relaxed)
    }

    /// Returns the id the next call to [`next`](Self::next) will hand out.
    pub fn peek(&self) -> u64 {
        self.inner.load(Ordering::Relaxed)
    }
}

impl Default for RequestIdCounter {
    fn default() -> Self {
        Self::new()
    }
}
