//! Repo-level build defaults.
//!
//! An optional `.cinder/build.toml` supplies defaults for the enumerated
//! options and the application name, so a checkout can pin its usual board
//! or benchmark. Explicit command-line values always win over the file, and
//! the file wins over built-in defaults.

use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::options::{Bench, Board, PfFreq};

/// Default location of the repo config file.
pub const DEFAULT_CONFIG_PATH: &str = ".cinder/build.toml";

/// Errors loading the repo config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or carries unknown keys or values.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Defaults accepted from the repo config file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepoConfig {
    /// Default target board.
    #[serde(default)]
    pub board: Option<Board>,

    /// Default benchmark selection.
    #[serde(default)]
    pub bench: Option<Bench>,

    /// Default power failure injection frequency.
    #[serde(default)]
    pub pf_freq: Option<PfFreq>,

    /// Default user application name.
    #[serde(default)]
    pub app: Option<String>,
}

impl RepoConfig {
    /// Load and parse a config file, logging its digest for provenance.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let bytes = fs::read(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let digest = hex::encode(Sha256::digest(&bytes));
        tracing::debug!(path = %path.display(), %digest, "loaded repo config");

        let contents = String::from_utf8_lossy(&bytes);
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Load the file at `path` if it exists; a missing file means no
    /// defaults, not an error.
    pub fn load_optional(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(path = %path.display(), "no repo config file");
            Ok(Self::default())
        }
    }
}
