//! Local snapshot storage for the appliance collection.

use appliance_common::error::ApplianceError;
use appliance_common::models::Appliance;
use appliance_common::services::LocalCache;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Snapshot kept as one JSON array on disk.
///
/// Writes go to a sibling temp file which is then renamed over the target,
/// so a reader never sees a half-written snapshot.
#[derive(Debug, Clone)]
pub struct FileCache {
    path: PathBuf,
}

impl FileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "appliances.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl LocalCache for FileCache {
    fn load_snapshot(&self) -> Result<Option<Vec<Appliance>>, ApplianceError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No local snapshot at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let appliances: Vec<Appliance> = serde_json::from_slice(&raw).map_err(|e| {
            warn!("Local snapshot at {} is unreadable: {}", self.path.display(), e);
            ApplianceError::CacheError(format!("Corrupt snapshot: {}", e))
        })?;
        debug!(
            "Loaded {} appliances from {}",
            appliances.len(),
            self.path.display()
        );
        Ok(Some(appliances))
    }

    fn store_snapshot(&self, appliances: &[Appliance]) -> Result<(), ApplianceError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let encoded = serde_json::to_vec_pretty(appliances)?;
        let temp = self.temp_path();
        {
            let mut file = fs::File::create(&temp)?;
            file.write_all(&encoded)?;
            file.sync_all()?;
        }
        fs::rename(&temp, &self.path)?;

        debug!(
            "Stored {} appliances to {}",
            appliances.len(),
            self.path.display()
        );
        Ok(())
    }

    fn clear(&self) -> Result<(), ApplianceError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process snapshot, for tests and embedders without a filesystem.
#[derive(Debug, Default)]
pub struct MemoryCache {
    snapshot: Mutex<Option<Vec<Appliance>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache that already holds `appliances`.
    pub fn with_snapshot(appliances: Vec<Appliance>) -> Self {
        Self {
            snapshot: Mutex::new(Some(appliances)),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Vec<Appliance>>> {
        self.snapshot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl LocalCache for MemoryCache {
    fn load_snapshot(&self) -> Result<Option<Vec<Appliance>>, ApplianceError> {
        Ok(self.lock().clone())
    }

    fn store_snapshot(&self, appliances: &[Appliance]) -> Result<(), ApplianceError> {
        *self.lock() = Some(appliances.to_vec());
        Ok(())
    }

    fn clear(&self) -> Result<(), ApplianceError> {
        *self.lock() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample_data::generate_sample_appliances;
    use chrono::{TimeZone, Utc};

    fn sample() -> Vec<Appliance> {
        generate_sample_appliances(Utc.with_ymd_and_hms(2025, 6, 15, 9, 0, 0).unwrap())
    }

    #[test]
    fn test_file_cache_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path().join("nested").join("appliances.json"));

        assert_eq!(cache.load_snapshot().unwrap(), None);

        let appliances = sample();
        cache.store_snapshot(&appliances).unwrap();
        assert_eq!(cache.load_snapshot().unwrap(), Some(appliances));
        assert!(!cache.temp_path().exists());
    }

    #[test]
    fn test_file_cache_overwrites_whole_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path().join("appliances.json"));

        cache.store_snapshot(&sample()).unwrap();
        let single = vec![sample().remove(0)];
        cache.store_snapshot(&single).unwrap();

        assert_eq!(cache.load_snapshot().unwrap(), Some(single));
    }

    #[test]
    fn test_file_cache_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path().join("appliances.json"));

        cache.clear().unwrap();
        cache.store_snapshot(&sample()).unwrap();
        cache.clear().unwrap();
        assert_eq!(cache.load_snapshot().unwrap(), None);
    }

    #[test]
    fn test_file_cache_corrupt_snapshot_is_cache_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("appliances.json");
        fs::write(&path, b"{ not json").unwrap();

        let err = FileCache::new(&path).load_snapshot().unwrap_err();
        assert!(matches!(err, ApplianceError::CacheError(_)));
    }

    #[test]
    fn test_memory_cache() {
        let cache = MemoryCache::new();
        assert_eq!(cache.load_snapshot().unwrap(), None);

        cache.store_snapshot(&[]).unwrap();
        assert_eq!(cache.load_snapshot().unwrap(), Some(Vec::new()));

        cache.clear().unwrap();
        assert_eq!(cache.load_snapshot().unwrap(), None);
    }
}
