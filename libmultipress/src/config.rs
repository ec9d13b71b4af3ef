//! Layout and key-file selection on top of the core engine settings.

use crate::presets::Layout;
use libmultipress_core::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Multipress-specific configuration that extends the base `Config` from core.
///
/// This configuration includes:
/// - All generic options from `libmultipress_core::Config` (flattened via serde)
/// - The key file to load, if any
/// - The built-in layout used when no key file is given
///
/// # Example
///
/// ```rust
/// use libmultipress::MultipressConfig;
///
/// let config = MultipressConfig::from_toml_str(
///     "compose_timeout_ms = 800\nlayout = \"numeric-keypad\"\n",
/// ).unwrap();
/// assert_eq!(config.base().compose_timeout_ms, 800);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MultipressConfig {
    /// Base configuration fields (timeout, list separator, normalization)
    #[serde(flatten)]
    pub base: libmultipress_core::Config,

    /// Key file with a `[keys]` group; overrides `layout` when set
    pub key_file: Option<PathBuf>,

    /// Built-in layout used when `key_file` is unset
    pub layout: Layout,
}

impl MultipressConfig {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Convert this config into the base config for use with `MultipressEngine::new()`
    pub fn into_base(self) -> libmultipress_core::Config {
        self.base
    }

    /// Get a reference to the base config
    pub fn base(&self) -> &libmultipress_core::Config {
        &self.base
    }

    /// Get a mutable reference to the base config
    pub fn base_mut(&mut self) -> &mut libmultipress_core::Config {
        &mut self.base
    }
}
