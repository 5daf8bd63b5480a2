//! Drift-resistant elapsed-time counter.
//!
//! The clock never increments per tick. It stores an anchor timestamp plus an
//! accumulated total and recomputes the delta from the wall clock on every
//! read, so a throttled or backgrounded poll loop cannot accumulate error.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of wall-clock time in epoch milliseconds.
pub trait TimeSource: Send + Sync {
    fn now_ms(&self) -> u64;
}

/// Production time source backed by the system clock.
#[derive(Debug, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Manually advanced time source for deterministic tests.
#[derive(Debug, Default)]
pub struct ManualTimeSource {
    now_ms: AtomicU64,
}

impl ManualTimeSource {
    pub fn new(start_ms: u64) -> Self {
        Self { now_ms: AtomicU64::new(start_ms) }
    }

    pub fn advance_ms(&self, delta: u64) {
        self.now_ms.fetch_add(delta, Ordering::SeqCst);
    }

    pub fn advance_secs(&self, delta: u64) {
        self.advance_ms(delta * 1000);
    }
}

impl TimeSource for ManualTimeSource {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

/// Anchor-based elapsed counter.
///
/// Invariant: `running_since_ms` is `Some` iff the clock is running.
pub struct Clock {
    time: Arc<dyn TimeSource>,
    accumulated_seconds: u32,
    running_since_ms: Option<u64>,
}

impl std::fmt::Debug for Clock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clock")
            .field("accumulated_seconds", &self.accumulated_seconds)
            .field("running", &self.running_since_ms.is_some())
            .finish()
    }
}

impl Clock {
    pub fn new(time: Arc<dyn TimeSource>) -> Self {
        Self { time, accumulated_seconds: 0, running_since_ms: None }
    }

    /// Clock driven by the system wall clock.
    pub fn system() -> Self {
        Self::new(Arc::new(SystemTimeSource))
    }

    pub fn is_running(&self) -> bool {
        self.running_since_ms.is_some()
    }

    /// Stamp the running anchor. No-op when already running.
    pub fn start(&mut self) {
        if self.running_since_ms.is_none() {
            self.running_since_ms = Some(self.time.now_ms());
        }
    }

    /// Fold the running span into the accumulated total and stop.
    /// No-op when not running.
    ///
    /// The fold happens before the anchor is cleared so a concurrent read can
    /// never observe a stale running anchor with already-folded time.
    pub fn pause(&mut self) {
        if let Some(anchor_ms) = self.running_since_ms {
            let now_ms = self.time.now_ms();
            self.accumulated_seconds = self
                .accumulated_seconds
                .saturating_add((now_ms.saturating_sub(anchor_ms) / 1000) as u32);
            self.running_since_ms = None;
        }
    }

    /// Pause and saturate the accumulated total to `max_seconds`.
    ///
    /// Used by the half timer to land exactly on the half boundary instead of
    /// carrying the tick overshoot into the stored state.
    pub(crate) fn pause_clamped(&mut self, max_seconds: u32) {
        self.pause();
        self.accumulated_seconds = self.accumulated_seconds.min(max_seconds);
    }

    /// Zero the counter and clear the anchor, regardless of running state.
    pub fn reset(&mut self) {
        self.accumulated_seconds = 0;
        self.running_since_ms = None;
    }

    /// Whole seconds elapsed while running. Pure read.
    pub fn elapsed_seconds(&self) -> u32 {
        match self.running_since_ms {
            Some(anchor_ms) => {
                let now_ms = self.time.now_ms();
                self.accumulated_seconds
                    .saturating_add((now_ms.saturating_sub(anchor_ms) / 1000) as u32)
            }
            None => self.accumulated_seconds,
        }
    }
}
