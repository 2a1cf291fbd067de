//! Client configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/ledgerdb/client.toml)
//! 3. Environment variables (LEDGERDB_* prefix)
//!
//! Environment variables take precedence over config file values.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::index::IndexOverrides;
use crate::transport::DEFAULT_MAX_OUTPUT_BYTES;

/// Environment variable prefix
const ENV_PREFIX: &str = "LEDGERDB";

/// Environment variable selecting an alternate engine executable
pub const BINARY_ENV_VAR: &str = "LEDGERDB_BIN";

/// Engine executable name on this platform
#[cfg(windows)]
pub const BINARY_NAME: &str = "ledgerdb.exe";
#[cfg(not(windows))]
pub const BINARY_NAME: &str = "ledgerdb";

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    /// Path to the ledger repository (required)
    #[serde(default)]
    pub repo_path: PathBuf,

    /// Engine executable; resolved from the environment when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary_path: Option<PathBuf>,

    /// Whether writes let the engine sync with its remote
    #[serde(default = "default_auto_sync")]
    pub auto_sync: bool,

    /// Cap for each captured output stream
    #[serde(default = "default_max_output_bytes")]
    pub max_output_bytes: usize,

    /// Variables layered over the inherited environment for every call
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,

    /// Session-level index settings
    #[serde(default, skip_serializing_if = "IndexOverrides::is_empty")]
    pub index: IndexOverrides,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            repo_path: PathBuf::new(),
            binary_path: None,
            auto_sync: default_auto_sync(),
            max_output_bytes: default_max_output_bytes(),
            env: BTreeMap::new(),
            index: IndexOverrides::default(),
        }
    }
}

impl ClientConfig {
    /// Configuration for a repository with everything else defaulted
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
            ..Self::default()
        }
    }

    pub fn with_binary_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.binary_path = Some(path.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_auto_sync(mut self, auto_sync: bool) -> Self {
        self.auto_sync = auto_sync;
        self
    }

    pub fn with_index(mut self, index: IndexOverrides) -> Self {
        self.index = index;
        self
    }

    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (LEDGERDB_REPO, LEDGERDB_BIN, LEDGERDB_AUTO_SYNC)
    /// 2. Config file (~/.config/ledgerdb/client.toml or LEDGERDB_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = Self::load_file(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load only what the config file says, without environment overrides
    ///
    /// Use this before editing and saving the file, so values that came
    /// from the environment are never persisted.
    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: ClientConfig =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // LEDGERDB_REPO
        if let Ok(val) = std::env::var(format!("{}_REPO", ENV_PREFIX)) {
            if !val.trim().is_empty() {
                self.repo_path = PathBuf::from(val);
            }
        }

        // LEDGERDB_BIN
        if let Ok(val) = std::env::var(BINARY_ENV_VAR) {
            if !val.trim().is_empty() {
                self.binary_path = Some(PathBuf::from(val));
            }
        }

        // LEDGERDB_AUTO_SYNC
        if let Ok(val) = std::env::var(format!("{}_AUTO_SYNC", ENV_PREFIX)) {
            self.auto_sync = val.eq_ignore_ascii_case("true") || val == "1";
        }
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with LEDGERDB_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ledgerdb")
            .join("client.toml")
    }
}

fn default_auto_sync() -> bool {
    true
}

fn default_max_output_bytes() -> usize {
    DEFAULT_MAX_OUTPUT_BYTES
}

/// Locate the engine executable when none is configured
///
/// `LEDGERDB_BIN` wins when set and non-blank. Otherwise a `ledgerdb`
/// shipped next to the current executable is used, falling back to a
/// `PATH` lookup by name.
pub fn resolve_binary_path() -> PathBuf {
    if let Ok(path) = std::env::var(BINARY_ENV_VAR) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(BINARY_NAME)))
        .filter(|candidate| candidate.is_file())
        .unwrap_or_else(|| PathBuf::from(BINARY_NAME))
}
