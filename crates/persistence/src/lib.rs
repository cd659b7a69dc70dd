#![deny(warnings)]

//! Persistence layer: an opaque key-value snapshot store and the two JSON
//! records that round-trip through it.
//!
//! Reads are tolerant: missing or corrupt data falls back to defaults with a
//! warning, never an error. Writes are best-effort; a failed save must not
//! stop the simulation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Storage key of the primary save record.
pub const SAVE_KEY: &str = "grindBeanGameData";

/// Storage key of the streak record.
pub const STREAK_KEY: &str = "grindBeanStreakData";

/// Errors surfaced by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("read failed: {0}")]
    Read(String),
    #[error("write failed: {0}")]
    Write(String),
}

/// An opaque key-value store of JSON documents.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn put(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// One JSON file per key under a directory.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| StoreError::Read(e.to_string()))
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root).map_err(|e| StoreError::Write(e.to_string()))?;
        fs::write(self.path_for(key), value).map_err(|e| StoreError::Write(e.to_string()))
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(path).map_err(|e| StoreError::Write(e.to_string()))?;
        }
        Ok(())
    }
}

/// In-memory store for tests.
#[derive(Default)]
pub struct MemoryStore {
    map: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.map.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.map.remove(key);
        Ok(())
    }
}

/// The primary save record. Field names stay camelCase so save files from
/// earlier releases keep loading.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SaveRecord {
    pub last_online_time: i64,
    pub seconds_passed: u64,
    pub total_earnings: f64,
    pub cash: f64,
    pub prestige_level: u32,
    pub prestige_points: u32,
}

impl Default for SaveRecord {
    fn default() -> Self {
        Self {
            last_online_time: 0,
            seconds_passed: 0,
            total_earnings: 0.0,
            cash: 4.0,
            prestige_level: 1,
            prestige_points: 0,
        }
    }
}

/// One calendar day in the persisted streak history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakHistoryRecord {
    pub date: i64,
    pub claimed: bool,
}

/// The streak record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StreakRecord {
    pub current_streak: u32,
    pub last_streak_claim: Option<i64>,
    pub streak_history: Vec<StreakHistoryRecord>,
    pub streak_protection: u32,
}

impl Default for StreakRecord {
    fn default() -> Self {
        Self {
            current_streak: 0,
            last_streak_claim: None,
            streak_history: Vec::new(),
            streak_protection: 1,
        }
    }
}

fn load_or_default<T: Default + for<'de> Deserialize<'de>>(store: &dyn KvStore, key: &str) -> T {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(e) => {
            warn!(key, error = %e, "save read failed, using defaults");
            return T::default();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(key, error = %e, "corrupt save record, using defaults");
            T::default()
        }
    }
}

fn store_json<T: Serialize>(store: &mut dyn KvStore, key: &str, value: &T) -> Result<(), StoreError> {
    let json = serde_json::to_string(value).map_err(|e| StoreError::Write(e.to_string()))?;
    store.put(key, &json)
}

/// Load the primary save record; defaults on missing or corrupt data.
pub fn load_save(store: &dyn KvStore) -> SaveRecord {
    load_or_default(store, SAVE_KEY)
}

/// Load the streak record; defaults on missing or corrupt data.
pub fn load_streak(store: &dyn KvStore) -> StreakRecord {
    load_or_default(store, STREAK_KEY)
}

/// Write the primary save record.
pub fn store_save(store: &mut dyn KvStore, record: &SaveRecord) -> Result<(), StoreError> {
    store_json(store, SAVE_KEY, record)
}

/// Write the streak record.
pub fn store_streak(store: &mut dyn KvStore, record: &StreakRecord) -> Result<(), StoreError> {
    store_json(store, STREAK_KEY, record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn save_record_roundtrip() {
        let mut store = MemoryStore::new();
        let record = SaveRecord {
            last_online_time: 1_700_000_000_000,
            seconds_passed: 3_600,
            total_earnings: 2.5e9,
            cash: 123_456.78,
            prestige_level: 3,
            prestige_points: 2,
        };
        store_save(&mut store, &record).unwrap();
        assert_eq!(load_save(&store), record);
    }

    #[test]
    fn streak_record_roundtrip() {
        let mut store = MemoryStore::new();
        let record = StreakRecord {
            current_streak: 12,
            last_streak_claim: Some(1_700_000_000_000),
            streak_history: vec![
                StreakHistoryRecord {
                    date: 1_699_913_600_000,
                    claimed: true,
                },
                StreakHistoryRecord {
                    date: 1_700_000_000_000,
                    claimed: false,
                },
            ],
            streak_protection: 2,
        };
        store_streak(&mut store, &record).unwrap();
        assert_eq!(load_streak(&store), record);
    }

    #[test]
    fn missing_data_falls_back_to_defaults() {
        let store = MemoryStore::new();
        assert_eq!(load_save(&store), SaveRecord::default());
        assert_eq!(load_streak(&store), StreakRecord::default());
    }

    #[test]
    fn corrupt_data_falls_back_to_defaults() {
        let mut store = MemoryStore::new();
        store.put(SAVE_KEY, "{not json").unwrap();
        store.put(STREAK_KEY, "[3, 4]").unwrap();
        assert_eq!(load_save(&store), SaveRecord::default());
        assert_eq!(load_streak(&store), StreakRecord::default());
    }

    #[test]
    fn partial_record_fills_missing_fields() {
        let mut store = MemoryStore::new();
        store.put(SAVE_KEY, r#"{"cash": 99.0, "prestigeLevel": 4}"#).unwrap();
        let record = load_save(&store);
        assert_eq!(record.cash, 99.0);
        assert_eq!(record.prestige_level, 4);
        assert_eq!(record.seconds_passed, 0);
        assert_eq!(record.prestige_points, 0);
    }

    #[test]
    fn record_json_uses_camel_case() {
        let json = serde_json::to_string(&SaveRecord::default()).unwrap();
        assert!(json.contains("lastOnlineTime"));
        assert!(json.contains("totalEarnings"));
        assert!(json.contains("prestigePoints"));
        let json = serde_json::to_string(&StreakRecord::default()).unwrap();
        assert!(json.contains("currentStreak"));
        assert!(json.contains("streakProtection"));
    }

    #[test]
    fn file_store_roundtrip_and_remove() {
        let dir = std::env::temp_dir().join("bean-tycoon-store-test");
        let _ = fs::remove_dir_all(&dir);
        let mut store = FileStore::new(&dir);
        assert!(store.get("absent").unwrap().is_none());
        store.put("k", "{\"a\":1}").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("{\"a\":1}"));
        store.remove("k").unwrap();
        assert!(store.get("k").unwrap().is_none());
        let _ = fs::remove_dir_all(&dir);
    }

    proptest! {
        #[test]
        fn save_record_survives_any_values(cash in 0.0f64..1e30,
                                           earnings in 0.0f64..1e30,
                                           level in 1u32..1_000,
                                           points in 0u32..1_000) {
            let mut store = MemoryStore::new();
            let record = SaveRecord {
                last_online_time: 1,
                seconds_passed: 2,
                total_earnings: earnings,
                cash,
                prestige_level: level,
                prestige_points: points,
            };
            store_save(&mut store, &record).unwrap();
            prop_assert_eq!(load_save(&store), record);
        }
    }
}
