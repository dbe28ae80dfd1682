// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use std::collections::{HashMap, HashSet};

use crate::models::{Anchor, CurrencyRate, RatesSnapshot, DZD, EUR, USD};

/// Registry entries for the currencies that are always available.
/// Their anchor and `per_anchor` are never used, the rate comes from the code.
fn base_currencies() -> [CurrencyRate; 3] {
    [
        CurrencyRate::new(DZD, Anchor::Usd, 0.0),
        CurrencyRate::new(EUR, Anchor::Usd, 0.0),
        CurrencyRate::new(USD, Anchor::Eur, 0.0),
    ]
}

/// Value of one unit of `currency` in DZD
pub fn compute_rate_to_dzd(currency: &CurrencyRate, eur_to_dzd: f64, usd_to_dzd: f64) -> f64 {
    match currency.code.as_str() {
        DZD => 1.0,
        EUR => eur_to_dzd,
        USD => usd_to_dzd,
        _ => match currency.anchor {
            Anchor::Eur => currency.per_anchor * eur_to_dzd,
            Anchor::Usd => currency.per_anchor * usd_to_dzd,
        },
    }
}

/// Base currencies followed by `custom`, first occurrence of each code wins,
/// sorted by code
pub fn all_currencies(custom: &[CurrencyRate]) -> Vec<CurrencyRate> {
    let mut seen = HashSet::new();
    let mut list: Vec<CurrencyRate> = base_currencies()
        .into_iter()
        .chain(custom.iter().cloned())
        .filter(|c| seen.insert(c.code.clone()))
        .collect();

    list.sort_by(|a, b| a.code.cmp(&b.code));
    list
}

/// Registered code matching what the user typed: the exact code when it is
/// registered, otherwise the upper-cased one
pub fn resolve_code(typed: &str, custom: &[CurrencyRate]) -> String {
    let typed = typed.trim();
    let known = all_currencies(custom);
    if known.iter().any(|c| c.code == typed) {
        return typed.to_string();
    }
    typed.to_uppercase()
}

/// Convert an amount between two registered currencies using DZD as the pivot.
///
/// Unknown codes, or a target whose rate is zero, give 0.
pub fn convert_amount(
    amount: f64,
    from_code: &str,
    to_code: &str,
    eur_to_dzd: f64,
    usd_to_dzd: f64,
    custom: &[CurrencyRate],
) -> f64 {
    if from_code == to_code {
        return amount;
    }

    let mut lookup: HashMap<String, CurrencyRate> = all_currencies(custom)
        .into_iter()
        .map(|c| (c.code.clone(), c))
        .collect();
    for base in base_currencies() {
        lookup.insert(base.code.clone(), base);
    }

    let (Some(from), Some(to)) = (lookup.get(from_code), lookup.get(to_code)) else {
        log::debug!("No conversion from {} to {}: unknown currency", from_code, to_code);
        return 0.0;
    };

    let from_to_dzd = compute_rate_to_dzd(from, eur_to_dzd, usd_to_dzd);
    let to_to_dzd = compute_rate_to_dzd(to, eur_to_dzd, usd_to_dzd);
    if to_to_dzd == 0.0 {
        log::debug!("No conversion to {}: its DZD rate is zero", to_code);
        return 0.0;
    }

    amount * from_to_dzd / to_to_dzd
}

/// Convert with the rates of a snapshot
pub fn convert_with_snapshot(
    amount: f64,
    from_code: &str,
    to_code: &str,
    snapshot: &RatesSnapshot,
) -> f64 {
    convert_amount(
        amount,
        from_code,
        to_code,
        snapshot.base_eur_to_dzd,
        snapshot.base_usd_to_dzd,
        &snapshot.custom,
    )
}

/// Every registered currency with its computed DZD rate, sorted by code
pub fn rate_table(snapshot: &RatesSnapshot) -> Vec<(CurrencyRate, f64)> {
    all_currencies(&snapshot.custom)
        .into_iter()
        .map(|c| {
            let rate = compute_rate_to_dzd(&c, snapshot.base_eur_to_dzd, snapshot.base_usd_to_dzd);
            (c, rate)
        })
        .collect()
}
