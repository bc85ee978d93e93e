//! Wall-clock sources for the statistics engine.

use crate::event::Seconds;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// A source of "now" in whole seconds.
///
/// Expected to be monotonically non-decreasing within a session. The engine
/// tolerates violations by saturating, it never panics on them.
pub trait Clock: Send {
    /// The current time.
    fn now(&self) -> Seconds;
}

/// Seconds since the Unix epoch from [`SystemTime`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Seconds {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(elapsed) => elapsed.as_secs(),
            Err(e) => {
                log::warn!("system clock is before the Unix epoch: {}", e);
                0
            }
        }
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same time, so a test or a replay can hold one handle and
/// give another to the engine.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock reading `start`.
    pub fn new(start: Seconds) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start)),
        }
    }

    /// Jump to `now`.
    pub fn set(&self, now: Seconds) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Move forward by `secs` and return the new time.
    pub fn advance(&self, secs: Seconds) -> Seconds {
        self.now.fetch_add(secs, Ordering::SeqCst) + secs
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Seconds {
        self.now.load(Ordering::SeqCst)
    }
}
