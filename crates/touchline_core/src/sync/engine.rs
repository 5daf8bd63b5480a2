//! Reconciles committed game records against the remote store with a local
//! fallback.
//!
//! The engine is the only writer of the local cache, and its `&mut self`
//! methods give same-record operations a total order in the single-threaded
//! model: an edit issued while a save is in flight cannot start until the
//! save resolves and the record has an id.
//!
//! Failure semantics: remote unavailability never blocks creating, editing or
//! deleting games. It only changes the record's sync state and rides along in
//! the operation outcome so the caller can report it.

use std::path::Path;
use std::sync::Arc;

use tokio::time::sleep;
use uuid::Uuid;

use super::cache::LocalCache;
use super::store::{backoff_delay, GameStore, RetryClass, StoreError};
use crate::config::RetryPolicy;
use crate::error::SyncError;
use crate::models::{GamePatch, GameRecord, SyncState};

/// Result of [`SyncEngine::save`]. The record is always stored somewhere;
/// `degraded` carries the store error when it only reached the local cache.
#[derive(Debug)]
pub struct SaveOutcome {
    pub record: GameRecord,
    pub degraded: Option<StoreError>,
}

/// Result of [`SyncEngine::load`]. `stale` is set when the remote could not
/// be reached and `records` is the unchanged local cache.
#[derive(Debug)]
pub struct LoadOutcome {
    pub records: Vec<GameRecord>,
    pub stale: Option<StoreError>,
}

/// Result of an update or delete. The local cache always reflects the user's
/// intent; `remote_error` reports a remote mutation that did not land.
#[derive(Debug)]
pub struct MutateOutcome {
    /// The record after the mutation; `None` for deletes.
    pub record: Option<GameRecord>,
    pub remote_error: Option<StoreError>,
}

#[derive(Debug)]
pub struct ClearOutcome {
    pub remote_error: Option<StoreError>,
}

/// Result of [`SyncEngine::sync_pending`].
#[derive(Debug, Default)]
pub struct SyncReport {
    pub pushed: usize,
    pub failed: Vec<(String, StoreError)>,
}

pub struct SyncEngine {
    store: Arc<dyn GameStore>,
    cache: LocalCache,
    scope: String,
    online: bool,
    retry: RetryPolicy,
}

impl SyncEngine {
    pub fn new(
        store: Arc<dyn GameStore>,
        cache_dir: impl AsRef<Path>,
        scope: impl Into<String>,
        retry: RetryPolicy,
    ) -> Self {
        let scope = scope.into();
        let cache = LocalCache::open(cache_dir.as_ref(), scope.clone());
        Self { store, cache, scope, online: true, retry }
    }

    /// The canonical in-memory list of committed records.
    pub fn records(&self) -> &[GameRecord] {
        self.cache.records()
    }

    pub fn get(&self, id: &str) -> Option<&GameRecord> {
        self.cache.get(id)
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    /// Persist a newly committed record. Bounded retry against the remote;
    /// on exhaustion or a permanent error the record is kept local-only with
    /// a generated id. Never loses the record.
    pub async fn save(&mut self, mut record: GameRecord) -> SaveOutcome {
        match self.remote_save(&record).await {
            Ok(mut stored) => {
                stored.sync_state = SyncState::Synced;
                self.cache_upsert(stored.clone());
                log::info!("saved game {} to remote store", stored.id);
                SaveOutcome { record: stored, degraded: None }
            }
            Err(err) => {
                if record.id.is_empty() {
                    record.id = format!("local-{}", Uuid::new_v4());
                }
                record.sync_state = SyncState::LocalOnly;
                self.cache_upsert(record.clone());
                log::warn!("save degraded to local-only ({}): {}", record.id, err);
                SaveOutcome { record, degraded: Some(err) }
            }
        }
    }

    /// Refresh from the remote. When reachable the remote list replaces the
    /// cache, except that local-only records not yet pushed are retained so
    /// an authoritative refresh can never drop unsynced data.
    pub async fn load(&mut self) -> LoadOutcome {
        let remote = if self.online {
            self.store.load_all(&self.scope).await
        } else {
            Err(StoreError::Unavailable("offline".to_string()))
        };

        match remote {
            Ok(mut records) => {
                for record in &mut records {
                    record.sync_state = SyncState::Synced;
                }
                let pending: Vec<GameRecord> = self
                    .cache
                    .records()
                    .iter()
                    .filter(|r| r.is_local_only() && !records.iter().any(|m| m.id == r.id))
                    .cloned()
                    .collect();
                records.extend(pending);
                if let Err(err) = self.cache.replace_all(records.clone()) {
                    log::warn!("cache refresh persist failed: {}", err);
                }
                LoadOutcome { records, stale: None }
            }
            Err(err) => {
                log::warn!("remote load failed, serving local cache: {}", err);
                LoadOutcome { records: self.cache.records().to_vec(), stale: Some(err) }
            }
        }
    }

    /// Edit an existing record. Local-only records mutate only the cache;
    /// remote-backed records attempt the remote first, then the cache is
    /// updated regardless so it reflects user intent.
    pub async fn update(&mut self, id: &str, patch: &GamePatch) -> Result<MutateOutcome, SyncError> {
        let existing = self
            .cache
            .get(id)
            .cloned()
            .ok_or_else(|| SyncError::NotFound { id: id.to_string() })?;

        if existing.is_local_only() {
            let mut record = existing;
            patch.apply_to(&mut record);
            self.cache_upsert(record.clone());
            return Ok(MutateOutcome { record: Some(record), remote_error: None });
        }

        let remote = if self.online {
            self.store.update(&self.scope, id, patch).await
        } else {
            Err(StoreError::Unavailable("offline".to_string()))
        };

        match remote {
            Ok(mut stored) => {
                stored.sync_state = SyncState::Synced;
                self.cache_upsert(stored.clone());
                Ok(MutateOutcome { record: Some(stored), remote_error: None })
            }
            Err(err) => {
                let mut record = existing;
                patch.apply_to(&mut record);
                self.cache_upsert(record.clone());
                log::warn!("remote update of {} failed, cache mirrored anyway: {}", id, err);
                Ok(MutateOutcome { record: Some(record), remote_error: Some(err) })
            }
        }
    }

    /// Delete a record. Same mirroring rule as [`Self::update`]: the cache
    /// entry is removed even when the remote delete fails.
    pub async fn delete(&mut self, id: &str) -> Result<MutateOutcome, SyncError> {
        let existing = self
            .cache
            .get(id)
            .cloned()
            .ok_or_else(|| SyncError::NotFound { id: id.to_string() })?;

        let remote_error = if existing.is_local_only() {
            None
        } else {
            let remote = if self.online {
                self.store.delete(&self.scope, id).await
            } else {
                Err(StoreError::Unavailable("offline".to_string()))
            };
            remote.err()
        };

        if let Err(err) = self.cache.remove(id) {
            log::warn!("cache removal persist failed for {}: {}", id, err);
        }
        if let Some(err) = &remote_error {
            log::warn!("remote delete of {} failed, cache removed anyway: {}", id, err);
        }
        Ok(MutateOutcome { record: None, remote_error })
    }

    /// Delete everything in the scope. Explicit user intent wins: the local
    /// cache is cleared even when the remote bulk delete fails; the failure
    /// is reported, not retried.
    pub async fn clear_all(&mut self) -> ClearOutcome {
        let remote = if self.online {
            self.store.clear_all(&self.scope).await
        } else {
            Err(StoreError::Unavailable("offline".to_string()))
        };
        if let Err(err) = self.cache.clear() {
            log::warn!("cache clear failed: {}", err);
        }
        ClearOutcome { remote_error: remote.err() }
    }

    /// Push local-only records to the remote. Successful pushes swap the
    /// generated local id for the remote-assigned one, so a later `load`
    /// cannot duplicate them.
    pub async fn sync_pending(&mut self) -> SyncReport {
        let pending: Vec<GameRecord> =
            self.cache.records().iter().filter(|r| r.is_local_only()).cloned().collect();

        let mut report = SyncReport::default();
        for mut record in pending {
            let local_id = std::mem::take(&mut record.id);
            match self.remote_save(&record).await {
                Ok(mut stored) => {
                    stored.sync_state = SyncState::Synced;
                    if let Err(err) = self.cache.remove(&local_id) {
                        log::warn!("cache cleanup persist failed for {}: {}", local_id, err);
                    }
                    self.cache_upsert(stored);
                    report.pushed += 1;
                }
                Err(err) => {
                    report.failed.push((local_id, err));
                }
            }
        }
        if report.pushed > 0 {
            log::info!("pushed {} pending records to remote store", report.pushed);
        }
        report
    }

    /// Network-status input. Coming back online triggers an automatic
    /// refresh; consumers never poll.
    pub async fn set_online(&mut self, online: bool) -> Option<LoadOutcome> {
        let was_online = self.online;
        self.online = online;
        if online && !was_online {
            log::info!("back online, refreshing game history");
            Some(self.load().await)
        } else {
            None
        }
    }

    async fn remote_save(&self, record: &GameRecord) -> Result<GameRecord, StoreError> {
        if !self.online {
            return Err(StoreError::Unavailable("offline".to_string()));
        }
        let mut attempt = 0;
        loop {
            match self.store.save(&self.scope, record.clone()).await {
                Ok(stored) => return Ok(stored),
                Err(err) => {
                    attempt += 1;
                    if err.retry_class() != RetryClass::Retryable
                        || attempt >= self.retry.max_attempts
                    {
                        return Err(err);
                    }
                    let delay = backoff_delay(attempt - 1, self.retry.base_delay_ms);
                    log::debug!(
                        "remote save attempt {} failed ({}), retrying in {:?}",
                        attempt,
                        err,
                        delay
                    );
                    sleep(delay).await;
                }
            }
        }
    }

    fn cache_upsert(&mut self, record: GameRecord) {
        // Persist failures are logged, not propagated: the in-memory list is
        // still correct and the next successful write rewrites the file.
        if let Err(err) = self.cache.upsert(record) {
            log::warn!("cache persist failed: {}", err);
        }
    }
}
