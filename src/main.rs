// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

mod config;
mod currencies;
mod editor;
mod exchange_rates;
mod keypad;
mod models;
mod store;
mod utils;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use env_logger::Env;
use std::io;
use std::path::PathBuf;

use crate::config::Config;
use crate::currencies::{all_currencies, compute_rate_to_dzd, convert_with_snapshot, resolve_code};
use crate::editor::{RatesDraft, RowPatch};
use crate::keypad::ConvertScreen;
use crate::models::{Anchor, CurrencyRate, RatesSnapshot};
use crate::store::{load_rates, save_rates, FileStorage};
use crate::utils::format_number;

#[derive(Parser)]
#[command(name = "dzd-converter", version, about = "Offline DZD currency calculator")]
struct Cli {
    /// TOML config file, instead of the per-user one
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the stored rates
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an amount between two currencies
    Convert {
        #[arg(allow_negative_numbers = true)]
        amount: String,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },
    /// Interactive keypad reading keys from stdin
    Keypad {
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },
    /// List the registered currency codes
    Currencies,
    /// Print the resolved configuration as TOML
    Config {
        /// Also write it to this file
        #[arg(long)]
        write: Option<PathBuf>,
    },
    /// Show or edit the stored rates
    Rates {
        #[command(subcommand)]
        action: Option<RatesCommand>,
    },
}

#[derive(Subcommand)]
enum RatesCommand {
    /// Show base rates and custom currencies
    Show,
    /// Set the EUR and/or USD rate in DZD
    SetBase {
        #[arg(long)]
        eur: Option<f64>,
        #[arg(long)]
        usd: Option<f64>,
    },
    /// Add a custom currency (GBP / EUR / 0.85 when nothing is given)
    Add {
        #[arg(long)]
        code: Option<String>,
        #[arg(long, value_parser = parse_anchor)]
        anchor: Option<Anchor>,
        #[arg(long, allow_negative_numbers = true)]
        per_anchor: Option<f64>,
    },
    /// Change a custom currency row
    Update {
        index: usize,
        #[arg(long)]
        code: Option<String>,
        #[arg(long, value_parser = parse_anchor)]
        anchor: Option<Anchor>,
        #[arg(long, allow_negative_numbers = true)]
        per_anchor: Option<f64>,
    },
    /// Remove a custom currency row
    Remove { index: usize },
    /// Restore the default rates
    Reset,
    /// Export the computed rates to CSV
    Export { path: Option<PathBuf> },
}

fn parse_anchor(s: &str) -> Result<Anchor, String> {
    s.parse::<Anchor>().map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = config::load_config(cli.config.as_deref())?;
    if let Some(store) = cli.store {
        config.store_dir = store;
    }
    let mut storage = FileStorage::new(&config.store_dir);
    log::debug!("Reading rates from {}", storage.dir().display());

    match cli.command {
        Commands::Convert { amount, from, to } => {
            let snapshot = load_rates(&storage, &config.storage_key);
            let from = code_or(from, &config.default_from, &snapshot);
            let to = code_or(to, &config.default_to, &snapshot);
            let result = match parse_amount(&amount) {
                Some(amount) => convert_with_snapshot(amount, &from, &to, &snapshot),
                None => {
                    log::warn!("Amount {:?} is not a number", amount);
                    0.0
                }
            };
            println!("{} {}", format_number(result, config.max_fraction_digits), to);
        }
        Commands::Keypad { from, to } => {
            let snapshot = load_rates(&storage, &config.storage_key);
            let mut screen = ConvertScreen::new(
                code_or(from, &config.default_from, &snapshot),
                code_or(to, &config.default_to, &snapshot),
                config.max_fraction_digits,
            );
            let stdin = io::stdin();
            keypad::run_keypad(stdin.lock(), &mut io::stdout(), &mut screen, &snapshot)?;
        }
        Commands::Currencies => {
            let snapshot = load_rates(&storage, &config.storage_key);
            for currency in all_currencies(&snapshot.custom) {
                println!("{}", currency.code);
            }
        }
        Commands::Config { write } => {
            print!("{}", toml::to_string_pretty(&config)?);
            if let Some(path) = write {
                config::save_config_to(&config, &path)?;
                println!("✅ Config written to {}", path.display());
            }
        }
        Commands::Rates { action } => {
            let snapshot = load_rates(&storage, &config.storage_key);
            match rates_action(action) {
                RatesCommand::Show => print_rates(&snapshot, &config),
                RatesCommand::Export { path } => {
                    let path = path.unwrap_or_else(exchange_rates::default_export_path);
                    exchange_rates::export_rates_csv(&snapshot, &path)?;
                    println!("✅ Rates written to {}", path.display());
                }
                RatesCommand::Reset => {
                    let snapshot = RatesSnapshot::default();
                    save_rates(&mut storage, &config.storage_key, &snapshot)
                        .context("Failed to save rates")?;
                    println!("✅ Rates reset to defaults");
                    print_rates(&snapshot, &config);
                }
                edit => {
                    let mut draft = RatesDraft::new(snapshot);
                    apply_edit(&mut draft, edit)?;
                    let snapshot = draft.into_snapshot();
                    save_rates(&mut storage, &config.storage_key, &snapshot)
                        .context("Failed to save rates")?;
                    println!("✅ Rates saved locally");
                    print_rates(&snapshot, &config);
                }
            }
        }
    }

    Ok(())
}

fn code_or(code: Option<String>, default: &str, snapshot: &RatesSnapshot) -> String {
    code.map(|c| resolve_code(&c, &snapshot.custom))
        .unwrap_or_else(|| default.to_string())
}

/// Finite amount typed on the command line
fn parse_amount(amount: &str) -> Option<f64> {
    amount.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn rates_action(action: Option<RatesCommand>) -> RatesCommand {
    action.unwrap_or(RatesCommand::Show)
}

fn apply_edit(draft: &mut RatesDraft, edit: RatesCommand) -> Result<()> {
    match edit {
        RatesCommand::SetBase { eur, usd } => draft.set_base(eur, usd),
        RatesCommand::Add { code, anchor, per_anchor } => {
            let rate = if code.is_none() && anchor.is_none() && per_anchor.is_none() {
                None
            } else {
                Some(CurrencyRate::new(
                    code.unwrap_or_else(|| "GBP".to_string()),
                    anchor.unwrap_or(Anchor::Eur),
                    per_anchor.unwrap_or(0.85),
                ))
            };
            let index = draft.add_currency(rate);
            log::debug!("Added {} at row {}", draft.snapshot().custom[index].code, index);
        }
        RatesCommand::Update { index, code, anchor, per_anchor } => {
            draft.update_row(index, RowPatch { code, anchor, per_anchor })?;
        }
        RatesCommand::Remove { index } => {
            let removed = draft.remove_row(index)?;
            log::debug!("Removed custom currency {}", removed.code);
        }
        RatesCommand::Show | RatesCommand::Reset | RatesCommand::Export { .. } => {}
    }
    Ok(())
}

fn print_rates(snapshot: &RatesSnapshot, config: &Config) {
    let digits = config.max_fraction_digits;
    let eur = snapshot.base_eur_to_dzd;
    let usd = snapshot.base_usd_to_dzd;

    println!("Base Rates");
    println!("  1 EUR = {} DZD", format_number(eur, digits));
    println!("  1 USD = {} DZD", format_number(usd, digits));
    println!();
    println!("Custom Currencies");
    println!("  {:>3}  {:<6}  {:<6}  {:>14}  {:>16}", "#", "Code", "Anchor", "1 unit = ?", "DZD (computed)");
    for (i, currency) in snapshot.custom.iter().enumerate() {
        println!(
            "  {:>3}  {:<6}  {:<6}  {:>14}  {:>16}",
            i,
            currency.code,
            currency.anchor.code(),
            format_number(currency.per_anchor, digits),
            format_number(compute_rate_to_dzd(currency, eur, usd), digits),
        );
    }
}
