//! Key-value persistence boundary with file locking.
//!
//! The workout log is kept as a single JSON array under the `workouts` key.
//! [`FileStorage`] writes each key to its own file atomically; [`MemoryStorage`]
//! is an in-process stand-in with an optional quota.

use crate::store::{WorkoutSnapshot, WorkoutStore};
use crate::{Error, Result};
use fs2::FileExt;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Key under which the workout snapshot is persisted
pub const WORKOUTS_KEY: &str = "workouts";

/// String key-value storage, shaped like a browser's local storage
pub trait KeyValueStorage {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// File-backed storage: one `<key>.json` file per key
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file holding `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    fn read_locked(path: &Path) -> Result<String> {
        let file = File::open(path)?;
        // Acquire shared lock for reading
        file.lock_shared()?;

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut contents) {
            let _ = file.unlock();
            return Err(e.into());
        }

        file.unlock()?;
        Ok(contents)
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let contents = Self::read_locked(&path)
            .map_err(|e| Error::Persistence(format!("reading {:?}: {}", path, e)))?;
        Ok(Some(contents))
    }

    /// Atomically writes the value by:
    /// 1. Writing to a temp file in the same directory
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        let write = || -> Result<()> {
            std::fs::create_dir_all(&self.dir)?;

            let temp = NamedTempFile::new_in(&self.dir)?;
            // Exclusive lock serializes concurrent writers
            temp.as_file().lock_exclusive()?;

            {
                let mut writer = std::io::BufWriter::new(temp.as_file());
                writer.write_all(value.as_bytes())?;
                writer.flush()?;
            }

            temp.as_file().sync_all()?;
            temp.as_file().unlock()?;

            temp.persist(&path).map_err(|e| Error::Io(e.error))?;
            Ok(())
        };

        write().map_err(|e| Error::Persistence(format!("writing {:?}: {}", path, e)))?;
        tracing::debug!("Saved {} to {:?}", key, path);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!("Removed {:?}", path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Persistence(format!("removing {:?}: {}", path, e))),
        }
    }
}

/// In-memory storage with an optional total size quota in bytes
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: HashMap::new(),
            quota: Some(quota),
        }
    }

    fn used_without(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if let Some(quota) = self.quota {
            let needed = self.used_without(key) + key.len() + value.len();
            if needed > quota {
                return Err(Error::Persistence(format!(
                    "quota exceeded: {} bytes needed, {} available",
                    needed, quota
                )));
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Write the store snapshot under [`WORKOUTS_KEY`]
pub fn save_workouts<S: KeyValueStorage + ?Sized>(storage: &mut S, store: &WorkoutStore) -> Result<()> {
    // Compact JSON, same as a browser would stringify it
    let contents = serde_json::to_string(&store.serialize())?;
    storage.set(WORKOUTS_KEY, &contents)?;
    tracing::debug!("Persisted {} workouts", store.len());
    Ok(())
}

/// Read the persisted snapshot, if any
///
/// Returns an empty list if nothing is stored. A value that is not a JSON
/// array is logged and treated as empty; individual entries that fail to
/// parse are skipped with a warning.
pub fn load_workouts<S: KeyValueStorage + ?Sized>(storage: &S) -> Result<Vec<WorkoutSnapshot>> {
    let Some(contents) = storage.get(WORKOUTS_KEY)? else {
        tracing::info!("No persisted workouts found");
        return Ok(Vec::new());
    };

    let entries = match serde_json::from_str::<Vec<serde_json::Value>>(&contents) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Failed to parse persisted workouts: {}. Starting empty.", e);
            return Ok(Vec::new());
        }
    };

    let mut snapshots = Vec::with_capacity(entries.len());
    for (i, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<WorkoutSnapshot>(entry) {
            Ok(snapshot) => snapshots.push(snapshot),
            Err(e) => {
                tracing::warn!("Failed to parse persisted workout at index {}: {}", i, e);
            }
        }
    }

    tracing::debug!("Loaded {} persisted workouts", snapshots.len());
    Ok(snapshots)
}

/// Remove the persisted snapshot
pub fn clear_workouts<S: KeyValueStorage + ?Sized>(storage: &mut S) -> Result<()> {
    storage.remove(WORKOUTS_KEY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{create_cycling, create_running, Coordinates};

    fn sample_store() -> WorkoutStore {
        let mut store = WorkoutStore::new();
        store
            .add(create_running(Coordinates::new(39.0, -12.0), 5.2, 24.0, 178.0))
            .unwrap();
        store
            .add(create_cycling(Coordinates::new(39.0, -12.0), 27.0, 95.0, 523.0))
            .unwrap();
        store
    }

    #[test]
    fn test_file_storage_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(temp_dir.path());

        let store = sample_store();
        save_workouts(&mut storage, &store).unwrap();
        assert!(storage.path_for(WORKOUTS_KEY).exists());

        let mut restored = WorkoutStore::new();
        restored.restore(load_workouts(&storage).unwrap());
        assert_eq!(restored.all(), store.all());
    }

    #[test]
    fn test_file_storage_missing_key() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(temp_dir.path().join("not_yet_created"));

        assert_eq!(storage.get(WORKOUTS_KEY).unwrap(), None);
        assert!(load_workouts(&storage).unwrap().is_empty());
    }

    #[test]
    fn test_file_storage_remove() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(temp_dir.path());

        save_workouts(&mut storage, &sample_store()).unwrap();
        clear_workouts(&mut storage).unwrap();
        assert!(!storage.path_for(WORKOUTS_KEY).exists());

        // Removing again is fine
        clear_workouts(&mut storage).unwrap();
    }

    #[test]
    fn test_atomic_save_leaves_no_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(temp_dir.path());

        save_workouts(&mut storage, &sample_store()).unwrap();
        save_workouts(&mut storage, &sample_store()).unwrap();

        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "workouts.json")
            .collect();
        assert!(
            extras.is_empty(),
            "Expected only workouts.json, found extras: {:?}",
            extras
        );
    }

    #[test]
    fn test_corrupted_value_loads_empty() {
        let mut storage = MemoryStorage::new();
        storage.set(WORKOUTS_KEY, "{ invalid json }").unwrap();

        assert!(load_workouts(&storage).unwrap().is_empty());
    }

    #[test]
    fn test_bad_entries_are_skipped() {
        let mut storage = MemoryStorage::new();
        let mut entries: Vec<serde_json::Value> =
            serde_json::from_str(&serde_json::to_string(&sample_store().serialize()).unwrap())
                .unwrap();
        entries.insert(0, serde_json::json!({ "type": "swimming", "id": "1" }));
        entries.push(serde_json::json!({ "no": "type" }));
        storage
            .set(WORKOUTS_KEY, &serde_json::to_string(&entries).unwrap())
            .unwrap();

        let snapshots = load_workouts(&storage).unwrap();
        assert_eq!(snapshots.len(), 2);
    }

    #[test]
    fn test_memory_quota_exceeded() {
        let mut storage = MemoryStorage::with_quota(64);
        let err = save_workouts(&mut storage, &sample_store()).unwrap_err();
        assert!(matches!(err, Error::Persistence(_)));
        assert_eq!(storage.get(WORKOUTS_KEY).unwrap(), None);
    }

    #[test]
    fn test_memory_quota_counts_replaced_value_once() {
        let mut storage = MemoryStorage::with_quota(20);
        storage.set("k", "0123456789").unwrap();
        storage.set("k", "9876543210").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("9876543210"));
    }
}
