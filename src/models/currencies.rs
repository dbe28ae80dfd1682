// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Codes of the currencies that are always registered
pub const DZD: &str = "DZD";
pub const EUR: &str = "EUR";
pub const USD: &str = "USD";

/// Reference currency a custom currency's rate is expressed against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Anchor {
    #[serde(rename = "EUR")]
    Eur,
    #[serde(rename = "USD")]
    Usd,
}

impl Anchor {
    pub fn code(&self) -> &'static str {
        match self {
            Anchor::Eur => EUR,
            Anchor::Usd => USD,
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Anchor {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            EUR => Ok(Anchor::Eur),
            USD => Ok(Anchor::Usd),
            other => Err(anyhow!("Unknown anchor {}, expected EUR or USD", other)),
        }
    }
}

/// A currency defined as a multiple of an anchor currency.
///
/// One unit of `code` equals `per_anchor` units of `anchor`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyRate {
    pub code: String,
    pub anchor: Anchor,
    #[serde(rename = "perAnchor")]
    pub per_anchor: f64,
}

impl CurrencyRate {
    pub fn new(code: impl Into<String>, anchor: Anchor, per_anchor: f64) -> Self {
        Self {
            code: code.into(),
            anchor,
            per_anchor,
        }
    }
}
