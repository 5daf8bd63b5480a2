//! Abstract remote store and its error taxonomy.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{GamePatch, GameRecord};

/// Retry policy class for store failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryClass {
    Retryable,
    Permanent,
}

/// Classified failures from a [`GameStore`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Network-level failure; the remote may come back.
    #[error("remote store unreachable: {0}")]
    Unavailable(String),

    #[error("remote request timed out")]
    Timeout,

    #[error("remote store rate limited the request")]
    RateLimited,

    /// Fails fast, never retried.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("remote store has no record with id {id}")]
    NotFound { id: String },

    /// The remote understood and refused; retrying cannot help.
    #[error("remote store rejected the request: {0}")]
    Rejected(String),
}

impl StoreError {
    pub fn retry_class(&self) -> RetryClass {
        match self {
            StoreError::Unavailable(_) | StoreError::Timeout | StoreError::RateLimited => {
                RetryClass::Retryable
            }
            StoreError::PermissionDenied(_)
            | StoreError::NotFound { .. }
            | StoreError::Rejected(_) => RetryClass::Permanent,
        }
    }
}

const MAX_BACKOFF_MS: u64 = 8_000;
const MAX_BACKOFF_EXPONENT: u32 = 8;

/// Exponential backoff with a cap. `attempt` counts completed attempts, so
/// the first retry waits `base_ms`.
pub fn backoff_delay(attempt: u32, base_ms: u64) -> Duration {
    let exponent = attempt.min(MAX_BACKOFF_EXPONENT);
    Duration::from_millis(base_ms.saturating_mul(1 << exponent).min(MAX_BACKOFF_MS))
}

/// Abstract remote collaborator holding the durable copy of game records.
/// All operations are scoped by an opaque caller-supplied identifier and may
/// fail with a classified [`StoreError`].
#[async_trait]
pub trait GameStore: Send + Sync {
    /// Persist a new record and return the stored copy with a
    /// remote-assigned id.
    async fn save(&self, scope: &str, record: GameRecord) -> Result<GameRecord, StoreError>;

    async fn load_all(&self, scope: &str) -> Result<Vec<GameRecord>, StoreError>;

    /// Apply a patch to an existing record and return the stored result.
    async fn update(
        &self,
        scope: &str,
        id: &str,
        patch: &GamePatch,
    ) -> Result<GameRecord, StoreError>;

    async fn delete(&self, scope: &str, id: &str) -> Result<(), StoreError>;

    /// Bulk delete every record in the scope.
    async fn clear_all(&self, scope: &str) -> Result<(), StoreError>;
}
