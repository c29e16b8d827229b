//! Single-slot local cache shared by the logger and the dashboard.

use crate::errors::CacheError;
use crate::models::ActivityRecord;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::{fs, sync::Mutex};
use tracing::{debug, error};

/// Key under which the last submitted record is stored.
pub const LAST_ACTIVITY_KEY: &str = "lastActivity";

#[async_trait]
pub trait ActivityCache: Send + Sync {
    async fn get_last_activity(&self) -> Option<ActivityRecord>;

    async fn set_last_activity(&self, record: &ActivityRecord) -> Result<(), CacheError>;
}

/// JSON key-value file on disk. Only [`LAST_ACTIVITY_KEY`] is used; other keys
/// found in the file are preserved on write.
#[derive(Clone)]
pub struct FileActivityCache {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl FileActivityCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ActivityCache for FileActivityCache {
    async fn get_last_activity(&self) -> Option<ActivityRecord> {
        let mut entries = load_entries(&self.path).await;
        let value = entries.remove(LAST_ACTIVITY_KEY)?;
        match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(err) => {
                error!("failed to parse cached activity: {err}");
                None
            }
        }
    }

    async fn set_last_activity(&self, record: &ActivityRecord) -> Result<(), CacheError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = load_entries(&self.path).await;
        entries.insert(LAST_ACTIVITY_KEY.to_string(), serde_json::to_value(record)?);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let payload = serde_json::to_vec_pretty(&Value::Object(entries))?;
        fs::write(&self.path, payload).await?;
        debug!(path = %self.path.display(), "cached last activity");
        Ok(())
    }
}

async fn load_entries(path: &Path) -> Map<String, Value> {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(entries) => entries,
            Err(err) => {
                error!("failed to parse cache file: {err}");
                Map::new()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Map::new(),
        Err(err) => {
            error!("failed to read cache file: {err}");
            Map::new()
        }
    }
}

/// In-process slot, useful when embedding the screens without a disk.
#[derive(Clone, Default)]
pub struct MemoryActivityCache {
    slot: Arc<std::sync::Mutex<Option<ActivityRecord>>>,
}

impl MemoryActivityCache {
    pub fn with_record(record: ActivityRecord) -> Self {
        Self {
            slot: Arc::new(std::sync::Mutex::new(Some(record))),
        }
    }
}

#[async_trait]
impl ActivityCache for MemoryActivityCache {
    async fn get_last_activity(&self) -> Option<ActivityRecord> {
        self.slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    async fn set_last_activity(&self, record: &ActivityRecord) -> Result<(), CacheError> {
        *self
            .slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BackfillPolicy, CategoryFields, TransportMode};

    fn temp_cache_path(name: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!(
            "carbon_tracker_{name}_{}_{nanos}",
            std::process::id()
        ));
        path.push("cache.json");
        path
    }

    fn transport_record(distance: f64) -> ActivityRecord {
        ActivityRecord::from_submission(
            &CategoryFields::Transport {
                mode: TransportMode::Bus,
                distance,
            },
            BackfillPolicy::SingleCategoryDemo,
        )
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty_slot() {
        let cache = FileActivityCache::new(temp_cache_path("missing"));
        assert_eq!(cache.get_last_activity().await, None);
    }

    #[tokio::test]
    async fn write_overwrites_single_slot() {
        let path = temp_cache_path("overwrite");
        let cache = FileActivityCache::new(&path);

        cache.set_last_activity(&transport_record(3.0)).await.unwrap();
        cache.set_last_activity(&transport_record(9.0)).await.unwrap();

        let stored = cache.get_last_activity().await.unwrap();
        assert_eq!(stored.distance, 9.0);

        let raw: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        let object = raw.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert!(object.contains_key(LAST_ACTIVITY_KEY));
    }

    #[tokio::test]
    async fn corrupt_file_reads_as_empty_and_is_replaced_on_write() {
        let path = temp_cache_path("corrupt");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"{not json").unwrap();

        let cache = FileActivityCache::new(&path);
        assert_eq!(cache.get_last_activity().await, None);

        cache.set_last_activity(&transport_record(1.0)).await.unwrap();
        assert_eq!(cache.get_last_activity().await, Some(transport_record(1.0)));
    }

    #[tokio::test]
    async fn unrelated_keys_survive_writes() {
        let path = temp_cache_path("keys");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, br#"{"theme":"dark"}"#).unwrap();

        let cache = FileActivityCache::new(&path);
        cache.set_last_activity(&transport_record(2.0)).await.unwrap();

        let raw: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["theme"], "dark");
        assert_eq!(raw[LAST_ACTIVITY_KEY]["transport_mode"], "bus");
    }

    #[tokio::test]
    async fn memory_cache_round_trips() {
        let cache = MemoryActivityCache::default();
        assert_eq!(cache.get_last_activity().await, None);
        cache.set_last_activity(&transport_record(4.0)).await.unwrap();
        assert_eq!(cache.get_last_activity().await, Some(transport_record(4.0)));
    }
}
