//! In-memory [`GameStore`] used by tests and offline previews.
//!
//! Failures are scripted: queue a `StoreError` and the next operation
//! consumes it instead of touching the data. Queue several to simulate a
//! sustained outage across a retry loop.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::store::{GameStore, StoreError};
use crate::models::{GamePatch, GameRecord, SyncState};

#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, Vec<GameRecord>>>,
    failures: Mutex<VecDeque<StoreError>>,
    next_id: AtomicU64,
    ops: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a failure for the next operation.
    pub fn push_failure(&self, error: StoreError) {
        self.failures.lock().unwrap().push_back(error);
    }

    /// Queue the same failure `count` times.
    pub fn push_failures(&self, error: StoreError, count: usize) {
        let mut failures = self.failures.lock().unwrap();
        for _ in 0..count {
            failures.push_back(error.clone());
        }
    }

    pub fn record_count(&self, scope: &str) -> usize {
        self.records.lock().unwrap().get(scope).map_or(0, Vec::len)
    }

    /// Operations attempted so far, scripted failures included.
    pub fn op_count(&self) -> u64 {
        self.ops.load(Ordering::SeqCst)
    }

    fn take_failure(&self) -> Option<StoreError> {
        self.ops.fetch_add(1, Ordering::SeqCst);
        self.failures.lock().unwrap().pop_front()
    }

    fn assign_id(&self) -> String {
        format!("srv-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

#[async_trait]
impl GameStore for MemoryStore {
    async fn save(&self, scope: &str, mut record: GameRecord) -> Result<GameRecord, StoreError> {
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        record.id = self.assign_id();
        record.sync_state = SyncState::Synced;
        let mut records = self.records.lock().unwrap();
        records.entry(scope.to_string()).or_default().push(record.clone());
        Ok(record)
    }

    async fn load_all(&self, scope: &str) -> Result<Vec<GameRecord>, StoreError> {
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        Ok(self.records.lock().unwrap().get(scope).cloned().unwrap_or_default())
    }

    async fn update(
        &self,
        scope: &str,
        id: &str,
        patch: &GamePatch,
    ) -> Result<GameRecord, StoreError> {
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        let mut records = self.records.lock().unwrap();
        let scoped = records.get_mut(scope).ok_or(StoreError::NotFound { id: id.to_string() })?;
        let record = scoped
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound { id: id.to_string() })?;
        patch.apply_to(record);
        Ok(record.clone())
    }

    async fn delete(&self, scope: &str, id: &str) -> Result<(), StoreError> {
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        let mut records = self.records.lock().unwrap();
        let scoped = records.get_mut(scope).ok_or(StoreError::NotFound { id: id.to_string() })?;
        let index = scoped
            .iter()
            .position(|r| r.id == id)
            .ok_or(StoreError::NotFound { id: id.to_string() })?;
        scoped.remove(index);
        Ok(())
    }

    async fn clear_all(&self, scope: &str) -> Result<(), StoreError> {
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        self.records.lock().unwrap().remove(scope);
        Ok(())
    }
}
