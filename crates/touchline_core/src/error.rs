use thiserror::Error;

use crate::session::goal_timeline::Side;
use crate::session::half_timer::Half;

/// Synchronous, immediately-actionable errors raised by the live session
/// components. These always reject the call without mutating state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("invalid half duration: {seconds}s (allowed 1..=5400)")]
    InvalidHalfDuration { seconds: u32 },

    #[error("half duration cannot change while the timer is running")]
    TimerRunning,

    #[error("the {half:?} half has already ended")]
    TimeUp { half: Half },

    #[error("second half can only start once the first half is over")]
    SecondHalfNotReady,

    #[error("goal timeline full for {side:?} ({capacity} goals)")]
    CapacityExceeded { side: Side, capacity: usize },

    #[error("no goal entry at index {index} for {side:?}")]
    GoalIndexOutOfRange { side: Side, index: usize },

    #[error("goal entry is locked for this session")]
    GoalEntryLocked,
}

/// Errors from the durable local cache file.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Errors surfaced by `SyncEngine` operations. Remote failures are not here:
/// they are carried inside the operation outcomes so the caller always gets
/// the locally-applied result alongside the surfaced store error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("no record with id {id}")]
    NotFound { id: String },
}

/// Errors from the CSV / JSON export surface.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
