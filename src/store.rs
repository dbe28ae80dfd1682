// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::{CurrencyRate, RatesSnapshot};

/// Key the snapshot is stored under
pub const STORAGE_KEY: &str = "dzd-converter-rates-v1";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// String key/value storage, the equivalent of a browser's local storage
pub trait Storage {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Stores each key as `<key>.json` inside a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;
        fs::write(&path, value).map_err(|source| StoreError::Io { path, source })
    }
}

#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    items: std::collections::HashMap<String, String>,
}

#[cfg(test)]
impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Load the snapshot stored under `key`.
///
/// Never fails: a missing, unreadable or malformed document gives the default
/// snapshot.
pub fn load_rates<S: Storage + ?Sized>(storage: &S, key: &str) -> RatesSnapshot {
    let raw = match storage.get_item(key) {
        Ok(Some(raw)) if !raw.is_empty() => raw,
        Ok(_) => {
            log::debug!("No stored rates under {}, using defaults", key);
            return RatesSnapshot::default();
        }
        Err(e) => {
            log::warn!("Could not read stored rates: {}", e);
            return RatesSnapshot::default();
        }
    };

    match parse_snapshot(&raw) {
        Some(snapshot) => snapshot,
        None => {
            log::warn!("Stored rates under {} are malformed, using defaults", key);
            RatesSnapshot::default()
        }
    }
}

/// Persist the whole snapshot under `key`
pub fn save_rates<S: Storage + ?Sized>(
    storage: &mut S,
    key: &str,
    snapshot: &RatesSnapshot,
) -> Result<()> {
    let json = serde_json::to_string(snapshot)?;
    storage.set_item(key, &json)?;
    log::info!("Saved {} custom currencies under {}", snapshot.custom.len(), key);
    Ok(())
}

/// Lenient parse: both base rates must be finite numbers, `custom` falls back
/// to an empty list and entries of the wrong shape are skipped.
fn parse_snapshot(raw: &str) -> Option<RatesSnapshot> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let base_eur_to_dzd = finite_number(value.get("baseEurToDzd"))?;
    let base_usd_to_dzd = finite_number(value.get("baseUsdToDzd"))?;

    let custom = match value.get("custom") {
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(|entry| match CurrencyRate::deserialize(entry) {
                Ok(rate) => Some(rate),
                Err(e) => {
                    log::warn!("Skipping stored currency {}: {}", entry, e);
                    None
                }
            })
            .collect(),
        _ => Vec::new(),
    };

    Some(RatesSnapshot {
        base_eur_to_dzd,
        base_usd_to_dzd,
        custom,
    })
}

fn finite_number(value: Option<&Value>) -> Option<f64> {
    value.and_then(Value::as_f64).filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Anchor;
    use tempfile::tempdir;

    fn stored(raw: &str) -> MemoryStorage {
        let mut storage = MemoryStorage::new();
        storage.set_item(STORAGE_KEY, raw).unwrap();
        storage
    }

    #[test]
    fn test_missing_key_gives_defaults() {
        let storage = MemoryStorage::new();
        assert_eq!(load_rates(&storage, STORAGE_KEY), RatesSnapshot::default());
        assert_eq!(load_rates(&stored(""), STORAGE_KEY), RatesSnapshot::default());
    }

    #[test]
    fn test_malformed_json_gives_defaults() {
        for raw in [
            "{not json",
            "[]",
            "null",
            "42",
            r#"{"baseUsdToDzd":135,"custom":[]}"#,
            r#"{"baseEurToDzd":"145","baseUsdToDzd":135,"custom":[]}"#,
            r#"{"baseEurToDzd":null,"baseUsdToDzd":135}"#,
        ] {
            assert_eq!(
                load_rates(&stored(raw), STORAGE_KEY),
                RatesSnapshot::default(),
                "input: {}",
                raw
            );
        }
    }

    #[test]
    fn test_custom_not_an_array_is_empty() {
        let snapshot = load_rates(
            &stored(r#"{"baseEurToDzd":150,"baseUsdToDzd":140,"custom":"GBP"}"#),
            STORAGE_KEY,
        );
        assert_eq!(snapshot.base_eur_to_dzd, 150.0);
        assert_eq!(snapshot.base_usd_to_dzd, 140.0);
        assert!(snapshot.custom.is_empty());

        let snapshot = load_rates(&stored(r#"{"baseEurToDzd":150,"baseUsdToDzd":140}"#), STORAGE_KEY);
        assert!(snapshot.custom.is_empty());
    }

    #[test]
    fn test_bad_custom_entries_are_skipped() {
        let raw = r#"{
            "baseEurToDzd": 150,
            "baseUsdToDzd": 140,
            "custom": [
                {"code": "GBP", "anchor": "EUR", "perAnchor": 1.2},
                {"code": "XYZ", "anchor": "JPY", "perAnchor": 1.0},
                {"code": "CHF"},
                {"code": "CAD", "anchor": "USD", "perAnchor": 0.7}
            ]
        }"#;
        let snapshot = load_rates(&stored(raw), STORAGE_KEY);
        assert_eq!(
            snapshot.custom,
            vec![
                CurrencyRate::new("GBP", Anchor::Eur, 1.2),
                CurrencyRate::new("CAD", Anchor::Usd, 0.7),
            ]
        );
    }

    #[test]
    fn test_save_then_load_in_file_storage() {
        let dir = tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().join("nested"));

        let mut snapshot = RatesSnapshot::default();
        snapshot.base_eur_to_dzd = 250.5;
        snapshot.custom.push(CurrencyRate::new("CHF", Anchor::Eur, 1.05));
        save_rates(&mut storage, STORAGE_KEY, &snapshot).unwrap();

        let path = storage.path_for(STORAGE_KEY).unwrap();
        assert!(path.ends_with("dzd-converter-rates-v1.json"));
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"baseEurToDzd\":250.5"));

        assert_eq!(load_rates(&storage, STORAGE_KEY), snapshot);
    }

    #[test]
    fn test_edited_non_finite_rates_survive_save() {
        use crate::editor::{RatesDraft, RowPatch};

        let mut storage = MemoryStorage::new();
        let mut draft = RatesDraft::new(RatesSnapshot::default());
        draft.add_currency(Some(CurrencyRate::new("CHF", Anchor::Eur, f64::INFINITY)));
        draft.set_base(Some(f64::NAN), None);
        draft
            .update_row(0, RowPatch { per_anchor: Some(f64::NAN), ..Default::default() })
            .unwrap();
        save_rates(&mut storage, STORAGE_KEY, draft.snapshot()).unwrap();

        let raw = storage.get_item(STORAGE_KEY).unwrap().unwrap();
        assert!(!raw.contains("null"));

        let loaded = load_rates(&storage, STORAGE_KEY);
        assert_eq!(loaded.base_eur_to_dzd, 0.0);
        assert_eq!(loaded.base_usd_to_dzd, 135.0);
        let codes: Vec<&str> = loaded.custom.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["GBP", "CAD", "TRY", "CHF"]);
        assert_eq!(loaded.custom[0].per_anchor, 0.0);
        assert_eq!(loaded.custom[3].per_anchor, 0.0);
    }

    #[test]
    fn test_save_replaces_whole_document() {
        let mut storage = MemoryStorage::new();
        save_rates(&mut storage, STORAGE_KEY, &RatesSnapshot::default()).unwrap();

        let snapshot = RatesSnapshot {
            base_eur_to_dzd: 1.0,
            base_usd_to_dzd: 2.0,
            custom: Vec::new(),
        };
        save_rates(&mut storage, STORAGE_KEY, &snapshot).unwrap();
        assert_eq!(load_rates(&storage, STORAGE_KEY), snapshot);
    }

    #[test]
    fn test_file_storage_missing_dir_reads_as_absent() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("does-not-exist"));
        assert!(storage.get_item(STORAGE_KEY).unwrap().is_none());
        assert_eq!(load_rates(&storage, STORAGE_KEY), RatesSnapshot::default());
    }

    #[test]
    fn test_invalid_keys_are_rejected() {
        let storage = FileStorage::new("unused");
        assert!(matches!(storage.path_for("../x"), Err(StoreError::InvalidKey(_))));
        assert!(matches!(storage.path_for(""), Err(StoreError::InvalidKey(_))));
    }
}
