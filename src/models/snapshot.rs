// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use serde::{Deserialize, Serialize};

use super::currencies::{Anchor, CurrencyRate};

/// Full persisted state of the rates at one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatesSnapshot {
    /// 1 EUR -> DZD
    #[serde(rename = "baseEurToDzd")]
    pub base_eur_to_dzd: f64,
    /// 1 USD -> DZD
    #[serde(rename = "baseUsdToDzd")]
    pub base_usd_to_dzd: f64,
    pub custom: Vec<CurrencyRate>,
}

impl Default for RatesSnapshot {
    fn default() -> Self {
        Self {
            base_eur_to_dzd: 145.0,
            base_usd_to_dzd: 135.0,
            custom: vec![
                CurrencyRate::new("GBP", Anchor::Eur, 1.15),
                CurrencyRate::new("CAD", Anchor::Usd, 0.74),
                CurrencyRate::new("TRY", Anchor::Usd, 0.03),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_snapshot() {
        let snapshot = RatesSnapshot::default();
        assert_eq!(snapshot.base_eur_to_dzd, 145.0);
        assert_eq!(snapshot.base_usd_to_dzd, 135.0);
        let codes: Vec<&str> = snapshot.custom.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["GBP", "CAD", "TRY"]);
    }

    #[test]
    fn test_snapshot_field_names() {
        let json = serde_json::to_value(RatesSnapshot::default()).unwrap();
        assert_eq!(json["baseEurToDzd"], 145.0);
        assert_eq!(json["baseUsdToDzd"], 135.0);
        assert_eq!(json["custom"][1]["anchor"], "USD");
    }
}
