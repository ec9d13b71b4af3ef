//! libmultipress-core
//!
//! Multipress (multi-tap) character composition: repeated presses of one key
//! cycle through a fixed list of candidates, as on a phone keypad, and the
//! chosen candidate is committed when another key is pressed or after an idle
//! timeout.
//!
//! Public API:
//! - `Keyval` - Platform key identifier and key-name resolution
//! - `KeyFile` - Key-group configuration file parser
//! - `KeyCandidateTable` - Immutable key → candidate list mapping
//! - `MultipressEngine` - The compose/commit state machine
//! - `SharedEngine` - Engine handle whose signal handlers may re-enter it
//! - `Scheduler` / `TimerQueue` - Host timer seam for the auto-commit timeout
//! - `SignalHub` - `preedit-start`, `preedit-changed`, `preedit-end`, `commit`
//! - `Config` - Engine configuration
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub mod error;
pub use error::ConfigError;

pub mod keyval;
pub use keyval::Keyval;

pub mod keyfile;
pub use keyfile::KeyFile;

pub mod table;
pub use table::{KeyCandidateTable, LoadReport, TableBuilder, KEYS_GROUP};

pub mod timer;
pub use timer::{Scheduler, SharedTimerQueue, TimerId, TimerQueue};

pub mod signal;
pub use signal::{HandlerId, Signal, SignalHub, SignalKind, SignalLog};

pub mod composition;
pub use composition::{PreeditAttribute, PreeditDisplay, UnderlineStyle};

pub mod ime_engine;
pub use ime_engine::{KeyEvent, KeyEventKind, KeyResult, MultipressEngine};

pub mod shared;
pub use shared::{SharedEngine, WeakEngine};

/// File name of the key table inside the configuration directory.
pub const CONFIGURATION_FILENAME: &str = "im-multipress.conf";

/// Directory searched when `MULTIPRESS_CONFDIR` is not set.
pub const DEFAULT_CONFDIR: &str = "/etc/multipress";

/// Generic engine configuration.
///
/// Layout-specific options (which key file, which preset) belong in
/// `MultipressConfig` in the `libmultipress` crate.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Idle time after the last press before the tentative match is committed
    pub compose_timeout_ms: u64,

    /// Separator between candidates in key-file lists
    pub list_separator: char,

    /// NFC-normalize candidate strings when loading
    pub normalize_candidates: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            compose_timeout_ms: 1000,
            list_separator: ',',
            normalize_candidates: true,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn compose_timeout(&self) -> Duration {
        Duration::from_millis(self.compose_timeout_ms)
    }

    pub fn set_compose_timeout(&mut self, timeout: Duration) {
        self.compose_timeout_ms = timeout.as_millis() as u64;
    }
}

/// Location of the system key table.
///
/// `$MULTIPRESS_CONFDIR/im-multipress.conf`, or under `DEFAULT_CONFDIR`
/// when the variable is unset.
pub fn default_key_file_path() -> PathBuf {
    let dir = std::env::var_os("MULTIPRESS_CONFDIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFDIR));
    dir.join(CONFIGURATION_FILENAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.compose_timeout(), Duration::from_secs(1));
        assert_eq!(config.list_separator, ',');
        assert!(config.normalize_candidates);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml_str("compose_timeout_ms = 750\n").unwrap();
        assert_eq!(config.compose_timeout(), Duration::from_millis(750));
        assert_eq!(config.list_separator, ',');
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = Config::default();
        config.list_separator = ';';
        config.set_compose_timeout(Duration::from_millis(1500));
        let text = config.to_toml_string().unwrap();
        assert_eq!(Config::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_default_key_file_name() {
        assert!(default_key_file_path().ends_with(CONFIGURATION_FILENAME));
    }
}
