//! File-backed key/value store for user preferences and offline data.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Key holding the selected display currency.
pub const PREFERRED_CURRENCY_KEY: &str = "preferred-currency";

const OFFLINE_PREFIX: &str = "offline-data-";
const STORE_FILE: &str = "store.json";

/// A timestamped offline payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfflineEntry {
    pub data: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

/// An offline payload read back with its staleness.
#[derive(Debug, Clone, PartialEq)]
pub struct OfflineData<T> {
    pub data: T,
    pub saved_at: DateTime<Utc>,
    /// `true` once the entry is older than the requested stale time.
    pub stale: bool,
}

/// JSON object persisted to `store.json` in a data directory.
///
/// Every mutation rewrites the file atomically.
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
    values: BTreeMap<String, serde_json::Value>,
}

impl LocalStore {
    /// Opens the store in `dir`, starting empty when the file is missing.
    ///
    /// A corrupt file is logged and replaced on the next write.
    ///
    /// # Errors
    ///
    /// Returns an error if the existing file cannot be read.
    pub fn open(dir: &Path) -> Result<Self> {
        let path = dir.join(STORE_FILE);
        let values = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                log::warn!("Ignoring unreadable store {}: {e}", path.display());
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, values })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.values.get(key)
    }

    /// Stores `value` under `key` and saves.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be serialized or the file
    /// cannot be written.
    pub fn set<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        self.values.insert(key.to_string(), serde_json::to_value(value)?);
        self.save()
    }

    /// Removes `key`, saving only when something was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn remove(&mut self, key: &str) -> Result<bool> {
        if self.values.remove(key).is_none() {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    #[must_use]
    pub fn preferred_currency(&self) -> Option<&str> {
        self.get(PREFERRED_CURRENCY_KEY).and_then(serde_json::Value::as_str)
    }

    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn set_preferred_currency(&mut self, code: &str) -> Result<()> {
        self.set(PREFERRED_CURRENCY_KEY, &code.to_ascii_uppercase())
    }

    /// Saves `data` under `offline-data-{key}` stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns an error if `data` cannot be serialized or the file cannot be
    /// written.
    pub fn put_offline_data<T: Serialize>(&mut self, key: &str, data: &T) -> Result<()> {
        self.put_offline_data_at(key, data, Utc::now())
    }

    fn put_offline_data_at<T: Serialize>(
        &mut self,
        key: &str,
        data: &T,
        timestamp: DateTime<Utc>,
    ) -> Result<()> {
        let entry = OfflineEntry {
            data: serde_json::to_value(data)?,
            timestamp,
        };
        self.set(&format!("{OFFLINE_PREFIX}{key}"), &entry)
    }

    /// Reads offline data, flagging it stale once older than `stale_after`.
    ///
    /// Entries that no longer deserialize as `T` are treated as absent.
    #[must_use]
    pub fn offline_data<T: DeserializeOwned>(
        &self,
        key: &str,
        stale_after: Duration,
    ) -> Option<OfflineData<T>> {
        self.offline_data_at(key, stale_after, Utc::now())
    }

    fn offline_data_at<T: DeserializeOwned>(
        &self,
        key: &str,
        stale_after: Duration,
        now: DateTime<Utc>,
    ) -> Option<OfflineData<T>> {
        let raw = self.get(&format!("{OFFLINE_PREFIX}{key}"))?;
        let entry: OfflineEntry = match serde_json::from_value(raw.clone()) {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Discarding malformed offline entry {key}: {e}");
                return None;
            }
        };
        let data = serde_json::from_value(entry.data).ok()?;
        Some(OfflineData {
            data,
            saved_at: entry.timestamp,
            stale: now - entry.timestamp > stale_after,
        })
    }

    /// Keys of all stored offline entries, without the prefix.
    pub fn offline_keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().filter_map(|k| k.strip_prefix(OFFLINE_PREFIX))
    }

    /// Writes the store to disk atomically (write tmp + rename).
    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, serde_json::to_string_pretty(&self.values)?)?;
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = LocalStore::open(&dir.path().join("nested")).unwrap();
        assert!(store.get("anything").is_none());
        assert!(store.preferred_currency().is_none());
    }

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut store = LocalStore::open(dir.path()).unwrap();
        store.set_preferred_currency("sar").unwrap();
        store.set("visits", &3).unwrap();
        assert!(!dir.path().join("store.json.tmp").exists());

        let reopened = LocalStore::open(dir.path()).unwrap();
        assert_eq!(reopened.preferred_currency(), Some("SAR"));
        assert_eq!(reopened.get("visits"), Some(&json!(3)));
    }

    #[test]
    fn remove_reports_presence() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut store = LocalStore::open(dir.path()).unwrap();
        store.set("k", &"v").unwrap();
        assert!(store.remove("k").unwrap());
        assert!(!store.remove("k").unwrap());
        assert!(LocalStore::open(dir.path()).unwrap().get("k").is_none());
    }

    #[test]
    fn corrupt_file_is_ignored() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("store.json"), "{not json").unwrap();
        let mut store = LocalStore::open(dir.path()).unwrap();
        assert!(store.get("k").is_none());
        store.set("k", &true).unwrap();
        assert_eq!(LocalStore::open(dir.path()).unwrap().get("k"), Some(&json!(true)));
    }

    #[test]
    fn offline_data_goes_stale() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut store = LocalStore::open(dir.path()).unwrap();
        let saved = Utc::now() - Duration::minutes(10);
        store
            .put_offline_data_at("plans", &vec!["six-month", "twelve-month"], saved)
            .unwrap();
        assert!(store.get("offline-data-plans").is_some());

        let fresh: OfflineData<Vec<String>> = store
            .offline_data_at("plans", Duration::minutes(30), Utc::now())
            .unwrap();
        assert!(!fresh.stale);
        assert_eq!(fresh.data, vec!["six-month", "twelve-month"]);
        assert_eq!(fresh.saved_at, saved);

        let stale: OfflineData<Vec<String>> = store
            .offline_data_at("plans", Duration::minutes(5), Utc::now())
            .unwrap();
        assert!(stale.stale);
    }

    #[test]
    fn offline_data_type_mismatch_is_absent() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut store = LocalStore::open(dir.path()).unwrap();
        store.put_offline_data("count", &"not a number").unwrap();
        assert!(store.offline_data::<u32>("count", Duration::hours(1)).is_none());
        assert!(store.offline_data::<u32>("missing", Duration::hours(1)).is_none());
        assert_eq!(store.offline_keys().collect::<Vec<_>>(), vec!["count"]);
    }
}
