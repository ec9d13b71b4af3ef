//! Built-in key tables for common keypad layouts.
//!
//! ## Layouts
//!
//! - **Phone keypad**: ITU E.161 letter groups on the digit keys `2`..`9`,
//!   each followed by the digit itself. `1` carries common punctuation and
//!   `0` a space. `*` and `#` stay unmapped so hosts can use them for
//!   shift/symbol modes.
//!
//! - **Numeric keypad**: the same rows bound to the keypad keys `KP_0`..`KP_9`,
//!   for desktop keyboards with a number block.
//!
//! - **System**: whatever the system key file at
//!   `libmultipress_core::default_key_file_path()` contains.

use libmultipress_core::keyfile::join_string_list;
use libmultipress_core::{Config, KeyCandidateTable, Keyval, TableBuilder, KEYS_GROUP};
use serde::{Deserialize, Serialize};

/// Candidate rows in key order: (digit, candidates).
const PHONE_ROWS: [(char, &[&str]); 10] = [
    ('1', &[".", ",", "?", "!", "'", "-", "1"]),
    ('2', &["a", "b", "c", "2"]),
    ('3', &["d", "e", "f", "3"]),
    ('4', &["g", "h", "i", "4"]),
    ('5', &["j", "k", "l", "5"]),
    ('6', &["m", "n", "o", "6"]),
    ('7', &["p", "q", "r", "s", "7"]),
    ('8', &["t", "u", "v", "8"]),
    ('9', &["w", "x", "y", "z", "9"]),
    ('0', &[" ", "0"]),
];

/// Which key table an engine starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    /// Digit keys `0`..`9`
    #[default]
    PhoneKeypad,
    /// Keypad keys `KP_0`..`KP_9`
    NumericKeypad,
    /// The system key file
    System,
}

/// Key name used for a digit row in the given layout.
fn key_name(layout: Layout, digit: char) -> String {
    match layout {
        Layout::NumericKeypad => format!("KP_{}", digit),
        Layout::PhoneKeypad | Layout::System => digit.to_string(),
    }
}

/// (key name, candidates) for a built-in layout; empty for `System`.
pub fn preset_rows(layout: Layout) -> Vec<(String, &'static [&'static str])> {
    if layout == Layout::System {
        return Vec::new();
    }
    PHONE_ROWS
        .iter()
        .map(|(digit, candidates)| (key_name(layout, *digit), *candidates))
        .collect()
}

/// Table for a built-in layout.
///
/// `System` is loaded from disk and falls back to an empty table when the
/// file is missing or unreadable.
pub fn preset_table(layout: Layout, config: &Config) -> KeyCandidateTable {
    if layout == Layout::System {
        return KeyCandidateTable::load_or_empty(libmultipress_core::default_key_file_path(), config);
    }

    let mut builder = TableBuilder::new().normalize(config.normalize_candidates);
    for (name, candidates) in preset_rows(layout) {
        if let Some(key) = Keyval::from_name(&name) {
            builder = builder.with(key, candidates.iter().copied());
        }
    }
    builder.build()
}

/// ITU E.161 phone keypad on the digit keys.
pub fn phone_keypad() -> KeyCandidateTable {
    preset_table(Layout::PhoneKeypad, &Config::default())
}

/// Phone keypad rows on the numeric keypad keys.
pub fn numeric_keypad() -> KeyCandidateTable {
    preset_table(Layout::NumericKeypad, &Config::default())
}

/// Render a built-in layout as key-file text.
pub fn preset_key_file(layout: Layout, separator: char) -> String {
    let mut out = String::from("# Multipress key table\n");
    out.push_str(&format!("[{}]\n", KEYS_GROUP));
    for (name, candidates) in preset_rows(layout) {
        out.push_str(&format!("{}={}\n", name, join_string_list(candidates, separator)));
    }
    out
}
