//! Engine factories.
//!
//! Each factory builds a `MultipressEngine` around a host-supplied
//! `Scheduler`, choosing the key table from a config, a preset or a file.

use crate::config::MultipressConfig;
use crate::presets::{self, Layout};
use libmultipress_core::{Config, ConfigError, KeyCandidateTable, MultipressEngine, Scheduler};
use std::path::Path;
use tracing::info;

/// Build an engine from a full configuration.
///
/// A configured key file wins over the layout. A key file that cannot be
/// read or parsed leaves the engine with an empty table: it keeps running
/// and only passes printable keys through.
pub fn create_engine<S: Scheduler>(config: &MultipressConfig, scheduler: S) -> MultipressEngine<S> {
    let table = match &config.key_file {
        Some(path) => KeyCandidateTable::load_or_empty(path, config.base()),
        None => presets::preset_table(config.layout, config.base()),
    };
    info!(entries = table.len(), "multipress engine ready");
    MultipressEngine::new(table, scheduler, config.base())
}

/// Engine with the ITU E.161 phone keypad and default settings.
pub fn create_engine_phone_keypad<S: Scheduler>(scheduler: S) -> MultipressEngine<S> {
    let config = Config::default();
    MultipressEngine::new(
        presets::preset_table(Layout::PhoneKeypad, &config),
        scheduler,
        &config,
    )
}

/// Engine with the phone keypad rows on the numeric keypad keys.
pub fn create_engine_numeric_keypad<S: Scheduler>(scheduler: S) -> MultipressEngine<S> {
    let config = Config::default();
    MultipressEngine::new(
        presets::preset_table(Layout::NumericKeypad, &config),
        scheduler,
        &config,
    )
}

/// Engine loaded from a key file, failing if the file itself is unusable.
///
/// Individual bad entries are still skipped (and logged) rather than
/// failing the load.
pub fn create_engine_from_file<P: AsRef<Path>, S: Scheduler>(
    path: P,
    scheduler: S,
) -> Result<MultipressEngine<S>, ConfigError> {
    let config = Config::default();
    let report = KeyCandidateTable::load(path, &config)?;
    Ok(MultipressEngine::new(report.table, scheduler, &config))
}
