// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use thiserror::Error;

use crate::models::{Anchor, CurrencyRate, RatesSnapshot};

/// Longest code a custom currency may carry
pub const MAX_CODE_LEN: usize = 6;

#[derive(Error, Debug, PartialEq)]
pub enum EditError {
    #[error("No custom currency at row {index} (there are {len})")]
    RowOutOfRange { index: usize, len: usize },
}

/// Partial update of a custom currency row
#[derive(Debug, Default, Clone)]
pub struct RowPatch {
    pub code: Option<String>,
    pub anchor: Option<Anchor>,
    pub per_anchor: Option<f64>,
}

/// Upper-cased and cut to `MAX_CODE_LEN` characters
pub fn normalize_code(code: &str) -> String {
    code.to_uppercase().chars().take(MAX_CODE_LEN).collect()
}

/// Non-finite numbers cannot be stored as JSON, they are kept as 0
fn finite_or_zero(n: f64) -> f64 {
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

/// Unsaved working copy of a snapshot
#[derive(Debug, Clone)]
pub struct RatesDraft {
    snapshot: RatesSnapshot,
}

impl RatesDraft {
    pub fn new(snapshot: RatesSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn snapshot(&self) -> &RatesSnapshot {
        &self.snapshot
    }

    pub fn into_snapshot(self) -> RatesSnapshot {
        self.snapshot
    }

    pub fn set_base(&mut self, eur_to_dzd: Option<f64>, usd_to_dzd: Option<f64>) {
        if let Some(eur) = eur_to_dzd {
            self.snapshot.base_eur_to_dzd = finite_or_zero(eur);
        }
        if let Some(usd) = usd_to_dzd {
            self.snapshot.base_usd_to_dzd = finite_or_zero(usd);
        }
    }

    /// Append a row, the placeholder `GBP / EUR / 0.85` when none is given.
    /// Returns the index of the new row.
    pub fn add_currency(&mut self, rate: Option<CurrencyRate>) -> usize {
        let mut rate = rate.unwrap_or_else(|| CurrencyRate::new("GBP", Anchor::Eur, 0.85));
        rate.code = normalize_code(&rate.code);
        rate.per_anchor = finite_or_zero(rate.per_anchor);
        self.snapshot.custom.push(rate);
        self.snapshot.custom.len() - 1
    }

    pub fn update_row(&mut self, index: usize, patch: RowPatch) -> Result<&CurrencyRate, EditError> {
        let len = self.snapshot.custom.len();
        let row = self
            .snapshot
            .custom
            .get_mut(index)
            .ok_or(EditError::RowOutOfRange { index, len })?;

        if let Some(code) = patch.code {
            row.code = normalize_code(&code);
        }
        if let Some(anchor) = patch.anchor {
            row.anchor = anchor;
        }
        if let Some(per_anchor) = patch.per_anchor {
            row.per_anchor = finite_or_zero(per_anchor);
        }
        Ok(&*row)
    }

    pub fn remove_row(&mut self, index: usize) -> Result<CurrencyRate, EditError> {
        let len = self.snapshot.custom.len();
        if index >= len {
            return Err(EditError::RowOutOfRange { index, len });
        }
        Ok(self.snapshot.custom.remove(index))
    }
}
