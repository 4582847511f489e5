//! Persisted device choices
//!
//! One entry per device kind, `{ "lastDeviceId": "..." }`, keyed by
//! [`DeviceKind::store_key`]. A missing entry means "use the system default".

use crate::controls::device::DeviceKind;
use crate::{CompanionError, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Client-local key-value store for the last chosen device per kind
pub trait DeviceChoiceStore: Send + Sync {
    fn load(&self, kind: DeviceKind) -> Option<String>;

    fn save(&self, kind: DeviceKind, device_id: &str) -> Result<()>;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedDeviceChoice {
    last_device_id: String,
}

type ChoiceMap = BTreeMap<String, PersistedDeviceChoice>;

/// In-memory store, used when choices should not outlive the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<ChoiceMap>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DeviceChoiceStore for MemoryStore {
    fn load(&self, kind: DeviceKind) -> Option<String> {
        self.entries
            .read()
            .get(kind.store_key())
            .map(|c| c.last_device_id.clone())
    }

    fn save(&self, kind: DeviceKind, device_id: &str) -> Result<()> {
        self.entries.write().insert(
            kind.store_key().to_string(),
            PersistedDeviceChoice {
                last_device_id: device_id.to_string(),
            },
        );
        Ok(())
    }
}

/// JSON file store; the whole map is rewritten on every save
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: RwLock<ChoiceMap>,
}

impl JsonFileStore {
    /// Open the store at `path`; a missing or unreadable file starts empty
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<ChoiceMap>(&content) {
                Ok(map) => map,
                Err(e) => {
                    warn!("Ignoring corrupt device store {}: {}", path.display(), e);
                    ChoiceMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => ChoiceMap::new(),
            Err(e) => {
                warn!("Failed to read device store {}: {}", path.display(), e);
                ChoiceMap::new()
            }
        };
        debug!("Opened device store {} ({} entries)", path.display(), entries.len());

        Self {
            path,
            entries: RwLock::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &ChoiceMap) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| CompanionError::StoreError(e.to_string()))?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl DeviceChoiceStore for JsonFileStore {
    fn load(&self, kind: DeviceKind) -> Option<String> {
        self.entries
            .read()
            .get(kind.store_key())
            .map(|c| c.last_device_id.clone())
    }

    fn save(&self, kind: DeviceKind, device_id: &str) -> Result<()> {
        let mut entries = self.entries.write();
        entries.insert(
            kind.store_key().to_string(),
            PersistedDeviceChoice {
                last_device_id: device_id.to_string(),
            },
        );
        self.flush(&entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("companion-store-{}", Uuid::new_v4()))
            .join("devices.json")
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert_eq!(store.load(DeviceKind::Microphone), None);

        store.save(DeviceKind::Microphone, "mic-1").unwrap();
        store.save(DeviceKind::Microphone, "mic-2").unwrap();
        assert_eq!(store.load(DeviceKind::Microphone), Some("mic-2".to_string()));
        assert_eq!(store.load(DeviceKind::Camera), None);
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let path = temp_path();

        let store = JsonFileStore::open(&path);
        store.save(DeviceKind::Camera, "cam-usb").unwrap();

        let reopened = JsonFileStore::open(&path);
        assert_eq!(reopened.load(DeviceKind::Camera), Some("cam-usb".to_string()));

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_file_store_layout() {
        let path = temp_path();
        let store = JsonFileStore::open(&path);
        store.save(DeviceKind::Microphone, "mic-1").unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["microphone"]["lastDeviceId"], "mic-1");

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let path = temp_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not json").unwrap();

        let store = JsonFileStore::open(&path);
        assert_eq!(store.load(DeviceKind::Microphone), None);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
