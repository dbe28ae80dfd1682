// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::{DZD, EUR};
use crate::store::STORAGE_KEY;
use crate::utils::DEFAULT_FRACTION_DIGITS;

pub const APP_NAME: &str = "dzd-converter";

/// Overrides `store_dir` when set
pub const STORE_ENV_VAR: &str = "DZD_CONVERTER_STORE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the stored snapshot
    pub store_dir: PathBuf,
    pub storage_key: String,
    pub max_fraction_digits: usize,
    pub default_from: String,
    pub default_to: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_dir: default_store_dir(),
            storage_key: STORAGE_KEY.to_string(),
            max_fraction_digits: DEFAULT_FRACTION_DIGITS,
            default_from: DZD.to_string(),
            default_to: EUR.to_string(),
        }
    }
}

fn default_store_dir() -> PathBuf {
    match env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".local").join("share").join(APP_NAME),
        None => PathBuf::from("data"),
    }
}

/// Read a TOML config file; missing fields keep their defaults
pub fn load_config_from(path: &Path) -> Result<Config> {
    let config_str = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: Config = toml::from_str(&config_str)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    Ok(config)
}

pub fn save_config_to(config: &Config, path: &Path) -> Result<()> {
    let config_str = toml::to_string_pretty(config)?;
    fs::write(path, config_str)
        .with_context(|| format!("Failed to write config file {}", path.display()))?;
    Ok(())
}

/// Resolve the configuration: an explicit file if given, the per-user confy
/// file otherwise, then environment overrides.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let mut config = match explicit {
        Some(path) => load_config_from(path)?,
        None => match confy::load::<Config>(APP_NAME, "config") {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Could not load user config, using defaults: {}", e);
                Config::default()
            }
        },
    };

    apply_env_overrides(&mut config, env::var(STORE_ENV_VAR).ok());
    log::debug!("Using config {:?}", config);
    Ok(config)
}

fn apply_env_overrides(config: &mut Config, store_dir: Option<String>) {
    if let Some(dir) = store_dir.filter(|d| !d.trim().is_empty()) {
        config.store_dir = PathBuf::from(dir);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_partial_config_keeps_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(&path, "store_dir = \"/tmp/rates\"\nmax_fraction_digits = 2\n")?;

        let config = load_config_from(&path)?;
        assert_eq!(config.store_dir, PathBuf::from("/tmp/rates"));
        assert_eq!(config.max_fraction_digits, 2);
        assert_eq!(config.storage_key, STORAGE_KEY);
        assert_eq!(config.default_from, "DZD");
        assert_eq!(config.default_to, "EUR");
        Ok(())
    }

    #[test]
    fn test_config_file_round_trip() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        let config = Config {
            store_dir: dir.path().join("store"),
            storage_key: "rates-test".to_string(),
            max_fraction_digits: 4,
            default_from: "EUR".to_string(),
            default_to: "USD".to_string(),
        };
        save_config_to(&config, &path)?;
        assert_eq!(load_config_from(&path)?, config);
        Ok(())
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "max_fraction_digits = \"six\"").unwrap();
        assert!(load_config_from(&path).is_err());
        assert!(load_config_from(&dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_env_override() {
        let mut config = Config::default();
        apply_env_overrides(&mut config, Some("   ".to_string()));
        assert_eq!(config.store_dir, Config::default().store_dir);

        apply_env_overrides(&mut config, Some("/srv/dzd".to_string()));
        assert_eq!(config.store_dir, PathBuf::from("/srv/dzd"));
    }
}
