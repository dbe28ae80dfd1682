// SPDX-FileCopyrightText: 2025 Joost van der Laan
// SPDX-License-Identifier: AGPL-3.0-only

use anyhow::{Context, Result};
use chrono::Local;
use csv::Writer;
use std::fs;
use std::path::{Path, PathBuf};

use crate::currencies::rate_table;
use crate::models::{RatesSnapshot, DZD, EUR, USD};

/// Timestamped file name under `output/`
pub fn default_export_path() -> PathBuf {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    PathBuf::from("output").join(format!("dzd_rates_{}.csv", timestamp))
}

/// Export the computed rate table to CSV
pub fn export_rates_csv(snapshot: &RatesSnapshot, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut writer = Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    // Write headers
    writer.write_record(["Code", "Anchor", "Per Anchor", "DZD (computed)"])?;

    for (currency, rate) in rate_table(snapshot) {
        let is_base = matches!(currency.code.as_str(), DZD | EUR | USD);
        // Base currencies have no anchor of their own
        let (anchor, per_anchor) = if is_base {
            (String::new(), String::new())
        } else {
            (currency.anchor.to_string(), currency.per_anchor.to_string())
        };
        writer.write_record([
            currency.code.as_str(),
            anchor.as_str(),
            per_anchor.as_str(),
            rate.to_string().as_str(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
