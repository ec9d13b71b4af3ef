//! Key → candidate table.
//!
//! Each key that takes part in multipress composition maps to an ordered,
//! non-empty list of candidate strings. The table is built once from a key
//! file (or programmatically) and never changes afterwards.

use crate::error::ConfigError;
use crate::keyfile::KeyFile;
use crate::keyval::Keyval;
use crate::Config;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};
use unicode_normalization::UnicodeNormalization;

/// Key-file group holding the key → candidates entries.
pub const KEYS_GROUP: &str = "keys";

type KeyMap = HashMap<Keyval, Vec<String>, ahash::RandomState>;

/// Immutable mapping from key to its candidate cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyCandidateTable {
    map: KeyMap,
}

/// Result of loading a table: the usable entries plus the ones left out.
#[derive(Debug)]
pub struct LoadReport {
    pub table: KeyCandidateTable,
    /// Entry-level problems, in file order.
    pub skipped: Vec<ConfigError>,
}

impl KeyCandidateTable {
    /// Table with no entries; every key press is treated as ordinary input.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builder() -> TableBuilder {
        TableBuilder::new()
    }

    /// Candidates for a key, in cycle order.
    pub fn candidates(&self, key: Keyval) -> Option<&[String]> {
        self.map.get(&key).map(Vec::as_slice)
    }

    pub fn contains(&self, key: Keyval) -> bool {
        self.map.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// All keys, sorted by keyval.
    pub fn keys(&self) -> Vec<Keyval> {
        let mut keys: Vec<_> = self.map.keys().copied().collect();
        keys.sort();
        keys
    }

    /// Build a table from the `[keys]` group of a parsed key file.
    ///
    /// Entries whose name does not resolve to a key, or whose candidate list
    /// is empty, are skipped and reported. A missing `[keys]` group fails
    /// the whole load.
    pub fn from_key_file(file: &KeyFile, config: &Config) -> Result<LoadReport, ConfigError> {
        let mut builder = TableBuilder::new().normalize(config.normalize_candidates);
        let mut skipped = Vec::new();

        for name in file.keys(KEYS_GROUP)? {
            let Some(key) = Keyval::from_name(name) else {
                warn!(key = name, "invalid key name in multipress configuration, skipping");
                skipped.push(ConfigError::InvalidKeyName(name.to_string()));
                continue;
            };

            let candidates = file
                .get_string_list(KEYS_GROUP, name, config.list_separator)
                .unwrap_or_default();

            if let Err(e) = builder.insert_named(key, name, candidates) {
                warn!(key = name, "{}, skipping", e);
                skipped.push(e);
            }
        }

        let table = builder.build();
        debug!(
            entries = table.len(),
            skipped = skipped.len(),
            "loaded multipress key table"
        );
        Ok(LoadReport { table, skipped })
    }

    /// Parse key-file text and build a table from it.
    pub fn from_key_file_str(content: &str, config: &Config) -> Result<LoadReport, ConfigError> {
        let file = KeyFile::parse(content)?;
        Self::from_key_file(&file, config)
    }

    /// Load a table from a key file on disk.
    pub fn load<P: AsRef<Path>>(path: P, config: &Config) -> Result<LoadReport, ConfigError> {
        let file = KeyFile::load(path)?;
        Self::from_key_file(&file, config)
    }

    /// Load a table, falling back to an empty one if the file is unusable.
    ///
    /// The failure is logged once; the engine then only passes printable
    /// keys straight through.
    pub fn load_or_empty<P: AsRef<Path>>(path: P, config: &Config) -> Self {
        let path = path.as_ref();
        match Self::load(path, config) {
            Ok(report) => report.table,
            Err(e) => {
                warn!(
                    path = %path.display(),
                    "error while reading the multipress configuration file: {}",
                    e
                );
                Self::empty()
            }
        }
    }
}

/// Incremental construction of a `KeyCandidateTable`.
#[derive(Debug, Default)]
pub struct TableBuilder {
    map: KeyMap,
    normalize: bool,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// NFC-normalize candidates on insert.
    pub fn normalize(mut self, enabled: bool) -> Self {
        self.normalize = enabled;
        self
    }

    /// Add or replace the candidates of a key.
    ///
    /// Empty strings are dropped, so a key-file list such as `a,,b` yields
    /// two candidates rather than a blank step in the cycle. This differs
    /// from plain key-file string lists, which keep empty elements. If
    /// nothing remains the entry is rejected.
    pub fn insert<I, S>(&mut self, key: Keyval, candidates: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = key.to_string();
        self.insert_named(key, &name, candidates)
    }

    fn insert_named<I, S>(&mut self, key: Keyval, name: &str, candidates: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let candidates: Vec<String> = candidates
            .into_iter()
            .map(Into::into)
            .filter(|c| !c.is_empty())
            .map(|c| if self.normalize { c.nfc().collect() } else { c })
            .collect();

        if candidates.is_empty() {
            return Err(ConfigError::EmptyCandidates(name.to_string()));
        }

        self.map.insert(key, candidates);
        Ok(())
    }

    /// Chainable insert for statically known tables; invalid entries are dropped.
    pub fn with<I, S>(mut self, key: Keyval, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Err(e) = self.insert(key, candidates) {
            warn!("{}, skipping", e);
        }
        self
    }

    pub fn build(self) -> KeyCandidateTable {
        KeyCandidateTable { map: self.map }
    }
}
