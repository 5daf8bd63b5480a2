//! Durable local fallback cache: one JSON file per scope.
//!
//! Writes are atomic (temp file, fsync, rename) so a crash mid-write leaves
//! either the old list or the new one, never a torn file. A missing or
//! corrupt file degrades to an empty list; the cache must always be usable.

use std::fs::{remove_file, rename, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::error::CacheError;
use crate::models::GameRecord;

pub struct LocalCache {
    dir: PathBuf,
    scope: String,
    records: Vec<GameRecord>,
}

impl LocalCache {
    /// Open the cache for a scope, loading any existing file.
    pub fn open(dir: impl Into<PathBuf>, scope: impl Into<String>) -> Self {
        let dir = dir.into();
        let scope = scope.into();
        let records = match Self::read_file(&Self::file_path_for(&dir, &scope)) {
            Ok(records) => records,
            Err(err) => {
                log::warn!("local cache for scope {} unreadable, starting empty: {}", scope, err);
                Vec::new()
            }
        };
        Self { dir, scope, records }
    }

    fn file_path_for(dir: &Path, scope: &str) -> PathBuf {
        // Scope tokens are opaque; keep the file name shell-safe.
        let safe: String = scope
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        dir.join(format!("games_{}.json", safe))
    }

    fn file_path(&self) -> PathBuf {
        Self::file_path_for(&self.dir, &self.scope)
    }

    fn read_file(path: &Path) -> Result<Vec<GameRecord>, CacheError> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let mut file = File::open(path)?;
        let mut data = String::new();
        file.read_to_string(&mut data)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn records(&self) -> &[GameRecord] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&GameRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Atomic replace-all, used when the remote list is authoritative.
    pub fn replace_all(&mut self, records: Vec<GameRecord>) -> Result<(), CacheError> {
        self.records = records;
        self.persist()
    }

    /// Insert or overwrite by id.
    pub fn upsert(&mut self, record: GameRecord) -> Result<(), CacheError> {
        match self.records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
        self.persist()
    }

    pub fn remove(&mut self, id: &str) -> Result<Option<GameRecord>, CacheError> {
        let index = self.records.iter().position(|r| r.id == id);
        let removed = index.map(|i| self.records.remove(i));
        if removed.is_some() {
            self.persist()?;
        }
        Ok(removed)
    }

    pub fn clear(&mut self) -> Result<(), CacheError> {
        self.records.clear();
        let path = self.file_path();
        if path.exists() {
            remove_file(&path)?;
        }
        Ok(())
    }

    fn persist(&self) -> Result<(), CacheError> {
        let path = self.file_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(&self.records)?;

        let temp_path = path.with_extension("tmp");
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(&data)?;
            file.flush()?;
            file.sync_all()?;
        }
        rename(&temp_path, &path)?;

        log::debug!("persisted {} records for scope {}", self.records.len(), self.scope);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_fixtures::sample_record;
    use tempfile::TempDir;

    fn record_with_id(id: &str) -> GameRecord {
        let mut record = sample_record();
        record.id = id.to_string();
        record
    }

    #[test]
    fn roundtrip_through_disk() {
        let dir = TempDir::new().unwrap();
        {
            let mut cache = LocalCache::open(dir.path(), "pin-1234");
            cache.upsert(record_with_id("a")).unwrap();
            cache.upsert(record_with_id("b")).unwrap();
        }
        let cache = LocalCache::open(dir.path(), "pin-1234");
        assert_eq!(cache.records().len(), 2);
        assert!(cache.get("a").is_some());
    }

    #[test]
    fn scopes_are_isolated() {
        let dir = TempDir::new().unwrap();
        let mut first = LocalCache::open(dir.path(), "pin-1");
        first.upsert(record_with_id("a")).unwrap();

        let second = LocalCache::open(dir.path(), "pin-2");
        assert!(second.records().is_empty());
    }

    #[test]
    fn upsert_overwrites_by_id() {
        let dir = TempDir::new().unwrap();
        let mut cache = LocalCache::open(dir.path(), "pin");
        cache.upsert(record_with_id("a")).unwrap();

        let mut edited = record_with_id("a");
        edited.opponent = "Changed".to_string();
        cache.upsert(edited).unwrap();

        assert_eq!(cache.records().len(), 1);
        assert_eq!(cache.get("a").unwrap().opponent, "Changed");
    }

    #[test]
    fn replace_all_is_authoritative() {
        let dir = TempDir::new().unwrap();
        let mut cache = LocalCache::open(dir.path(), "pin");
        cache.upsert(record_with_id("old")).unwrap();
        cache.replace_all(vec![record_with_id("new")]).unwrap();
        assert!(cache.get("old").is_none());
        assert!(cache.get("new").is_some());

        // No leftover temp file from the atomic write.
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn remove_returns_the_record() {
        let dir = TempDir::new().unwrap();
        let mut cache = LocalCache::open(dir.path(), "pin");
        cache.upsert(record_with_id("a")).unwrap();
        let removed = cache.remove("a").unwrap();
        assert_eq!(removed.unwrap().id, "a");
        assert!(cache.remove("a").unwrap().is_none());
    }

    #[test]
    fn corrupt_file_degrades_to_empty() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("games_pin.json"), b"not json").unwrap();
        let cache = LocalCache::open(dir.path(), "pin");
        assert!(cache.records().is_empty());
    }

    #[test]
    fn clear_removes_file() {
        let dir = TempDir::new().unwrap();
        let mut cache = LocalCache::open(dir.path(), "pin");
        cache.upsert(record_with_id("a")).unwrap();
        cache.clear().unwrap();
        assert!(cache.records().is_empty());
        assert!(!dir.path().join("games_pin.json").exists());
    }
}
