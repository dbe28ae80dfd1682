// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use anyhow::Result;
use std::io::{BufRead, Write};

use crate::currencies::{all_currencies, convert_with_snapshot, resolve_code};
use crate::models::{RatesSnapshot, DZD, EUR};
use crate::utils::format_number;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Digit(char),
    Dot,
    Backspace,
}

/// Amount typed on the keypad, kept as text exactly as displayed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountInput {
    text: String,
}

impl Default for AmountInput {
    fn default() -> Self {
        Self { text: "0".to_string() }
    }
}

impl AmountInput {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn press(&mut self, key: Key) {
        match key {
            Key::Digit(d) => {
                if self.text == "0" {
                    self.text = d.to_string();
                } else {
                    self.text.push(d);
                }
            }
            Key::Dot => {
                if !self.text.contains('.') {
                    self.text.push('.');
                }
            }
            Key::Backspace => {
                if self.text.chars().count() <= 1 {
                    self.text = "0".to_string();
                } else {
                    self.text.pop();
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.text = "0".to_string();
    }

    pub fn value(&self) -> Option<f64> {
        self.text.parse().ok()
    }
}

/// State of the convert screen
#[derive(Debug, Clone)]
pub struct ConvertScreen {
    pub input: AmountInput,
    pub from: String,
    pub to: String,
    pub fraction_digits: usize,
}

impl ConvertScreen {
    pub fn new(from: impl Into<String>, to: impl Into<String>, fraction_digits: usize) -> Self {
        Self {
            input: AmountInput::default(),
            from: from.into(),
            to: to.into(),
            fraction_digits,
        }
    }

    pub fn swap(&mut self) {
        std::mem::swap(&mut self.from, &mut self.to);
    }

    /// Converted amount as displayed, `0` when the input does not parse
    pub fn result(&self, snapshot: &RatesSnapshot) -> String {
        match self.input.value() {
            Some(amount) => format_number(
                convert_with_snapshot(amount, &self.from, &self.to, snapshot),
                self.fraction_digits,
            ),
            None => "0".to_string(),
        }
    }

    pub fn render(&self, snapshot: &RatesSnapshot) -> String {
        format!(
            "{} {}\n{} {}\nEUR→DZD: {} · USD→DZD: {}",
            self.input.as_str(),
            self.from,
            self.result(snapshot),
            self.to,
            format_number(snapshot.base_eur_to_dzd, self.fraction_digits),
            format_number(snapshot.base_usd_to_dzd, self.fraction_digits),
        )
    }
}

impl Default for ConvertScreen {
    fn default() -> Self {
        Self::new(DZD, EUR, crate::utils::DEFAULT_FRACTION_DIGITS)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Keys(Vec<Key>),
    Clear,
    Swap,
    From(String),
    To(String),
    Quit,
    Unknown(String),
}

fn parse_command(line: &str) -> Command {
    let line = line.trim();
    let mut words = line.split_whitespace();
    match (words.next(), words.next()) {
        (Some("q" | "quit"), None) => Command::Quit,
        (Some("c" | "clear"), None) => Command::Clear,
        (Some("s" | "swap"), None) => Command::Swap,
        (Some("from"), Some(code)) => Command::From(code.to_string()),
        (Some("to"), Some(code)) => Command::To(code.to_string()),
        _ => {
            let keys: Option<Vec<Key>> = line
                .chars()
                .filter(|c| !c.is_whitespace())
                .map(|c| match c {
                    '0'..='9' => Some(Key::Digit(c)),
                    '.' => Some(Key::Dot),
                    '<' => Some(Key::Backspace),
                    _ => None,
                })
                .collect();
            match keys {
                Some(keys) => Command::Keys(keys),
                None => Command::Unknown(line.to_string()),
            }
        }
    }
}

/// Drive the convert screen from line-based input until `q` or end of input
pub fn run_keypad<R: BufRead, W: Write>(
    input: R,
    output: &mut W,
    screen: &mut ConvertScreen,
    snapshot: &RatesSnapshot,
) -> Result<()> {
    let known: Vec<String> = all_currencies(&snapshot.custom)
        .into_iter()
        .map(|c| c.code)
        .collect();

    writeln!(output, "Keys: 0-9 . < (backspace) | c clear | s swap | from CODE | to CODE | q quit")?;
    writeln!(output, "{}", screen.render(snapshot))?;

    for line in input.lines() {
        let line = line?;
        let command = match parse_command(&line) {
            Command::From(code) => Command::From(resolve_code(&code, &snapshot.custom)),
            Command::To(code) => Command::To(resolve_code(&code, &snapshot.custom)),
            other => other,
        };
        match command {
            Command::Quit => break,
            Command::Keys(keys) => keys.into_iter().for_each(|k| screen.input.press(k)),
            Command::Clear => screen.input.clear(),
            Command::Swap => screen.swap(),
            Command::From(code) | Command::To(code) if !known.contains(&code) => {
                writeln!(output, "⚠️  Unknown currency {}, known: {}", code, known.join(", "))?;
                continue;
            }
            Command::From(code) => screen.from = code,
            Command::To(code) => screen.to = code,
            Command::Unknown(text) => {
                if !text.is_empty() {
                    writeln!(output, "⚠️  Unknown input: {}", text)?;
                }
                continue;
            }
        }
        writeln!(output, "{}", screen.render(snapshot))?;
    }

    Ok(())
}
