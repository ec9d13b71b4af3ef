//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading key files and engine configuration.
///
/// `Io`, `Syntax` and `MissingGroup` make a whole file unusable.
/// `InvalidKeyName` and `EmptyCandidates` concern a single entry; loaders
/// skip that entry and keep going.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("missing group [{0}]")]
    MissingGroup(String),

    #[error("invalid key name \"{0}\"")]
    InvalidKeyName(String),

    #[error("key \"{0}\" has no candidates")]
    EmptyCandidates(String),

    #[error("toml: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("toml: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl ConfigError {
    /// True when the error only affects one entry of a key file.
    pub fn is_entry_error(&self) -> bool {
        matches!(
            self,
            ConfigError::InvalidKeyName(_) | ConfigError::EmptyCandidates(_)
        )
    }
}
